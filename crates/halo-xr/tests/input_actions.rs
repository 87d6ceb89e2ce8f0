mod support;

use halo_xr::input::HAPTIC_AMPLITUDE;
use halo_xr::{ActionState, Hand, Options, XrError};
use support::{program, running_program, MockRuntime};

fn grab(value: f32, active: bool) -> ActionState<f32> {
    ActionState {
        current_state: value,
        is_active: active,
        ..ActionState::default()
    }
}

fn quit(pressed: bool, changed: bool) -> ActionState<bool> {
    ActionState {
        current_state: pressed,
        changed_since_last_sync: changed,
        is_active: true,
        ..ActionState::default()
    }
}

#[test]
fn test_all_profiles_are_suggested() {
    let runtime = MockRuntime::new();
    let _program = running_program(&runtime, Options::default());
    runtime.with(|s| {
        assert_eq!(s.suggested_profiles.len(), 5);
        assert_eq!(
            s.suggested_profiles[0],
            "/interaction_profiles/khr/simple_controller"
        );
        assert_eq!(s.count("xrAttachSessionActionSets"), 1);
        assert_eq!(s.count("xrCreateActionSpace"), 2);
    });
}

#[test]
fn test_rejected_profile_does_not_block_others() {
    let runtime = MockRuntime::new();
    runtime.with(|s| {
        s.rejected_profiles
            .insert("/interaction_profiles/oculus/touch_controller".to_string());
    });
    let _program = running_program(&runtime, Options::default());
    runtime.with(|s| {
        assert_eq!(s.count("xrSuggestInteractionProfileBindings"), 5);
        assert_eq!(s.suggested_profiles.len(), 4);
        assert!(!s
            .suggested_profiles
            .iter()
            .any(|p| p.contains("oculus")));
    });
}

#[test]
fn test_every_profile_rejected_fails_session_setup() {
    let runtime = MockRuntime::new();
    runtime.with(|s| {
        s.failing_calls.insert("xrSuggestInteractionProfileBindings");
    });
    let mut program = program(&runtime, Options::default());
    program.create_instance().unwrap();
    program.initialize_system().unwrap();
    assert!(matches!(
        program.initialize_session(),
        Err(XrError::Runtime { .. })
    ));
}

#[test]
fn test_hard_grab_scales_hand_and_vibrates() {
    let runtime = MockRuntime::new();
    let mut program = running_program(&runtime, Options::default());
    runtime.with(|s| s.grab[Hand::Left] = grab(0.95, true));

    let poll = program.poll_actions().unwrap();
    assert!(poll.haptic_pulses[Hand::Left]);
    assert!(!poll.haptic_pulses[Hand::Right]);

    let input = program.input().unwrap();
    assert!((input.hand_scale(Hand::Left) - 0.525).abs() < 1e-6);
    assert_eq!(input.hand_scale(Hand::Right), 1.0);
    runtime.with(|s| {
        assert_eq!(
            s.haptics,
            vec![("/user/hand/left".to_string(), HAPTIC_AMPLITUDE)]
        );
    });
}

#[test]
fn test_grab_at_threshold_does_not_vibrate() {
    let runtime = MockRuntime::new();
    let mut program = running_program(&runtime, Options::default());
    runtime.with(|s| s.grab[Hand::Right] = grab(0.9, true));

    let poll = program.poll_actions().unwrap();
    assert!(!poll.haptic_pulses[Hand::Right]);
    runtime.with(|s| assert!(s.haptics.is_empty()));
}

#[test]
fn test_inactive_grab_keeps_previous_scale() {
    let runtime = MockRuntime::new();
    let mut program = running_program(&runtime, Options::default());

    runtime.with(|s| s.grab[Hand::Right] = grab(1.0, false));
    program.poll_actions().unwrap();
    assert_eq!(program.input().unwrap().hand_scale(Hand::Right), 1.0);

    runtime.with(|s| s.grab[Hand::Right] = grab(0.5, true));
    program.poll_actions().unwrap();
    assert_eq!(program.input().unwrap().hand_scale(Hand::Right), 0.75);

    runtime.with(|s| s.grab[Hand::Right] = grab(0.0, false));
    program.poll_actions().unwrap();
    assert_eq!(program.input().unwrap().hand_scale(Hand::Right), 0.75);
    runtime.with(|s| assert!(s.haptics.is_empty()));
}

#[test]
fn test_hand_cube_follows_grab_scale() {
    let runtime = MockRuntime::new();
    let mut program = running_program(&runtime, Options::default());
    runtime.with(|s| s.grab[Hand::Right] = grab(1.0, true));
    program.poll_actions().unwrap();
    program.render_frame().unwrap();

    let cubes = &program.graphics().renders[0].cubes;
    let right = cubes.last().unwrap();
    assert!((right.scale.x - 0.05).abs() < 1e-6);
}

#[test]
fn test_quit_is_edge_triggered() {
    let runtime = MockRuntime::new();
    let mut program = running_program(&runtime, Options::default());

    runtime.with(|s| s.quit = quit(true, true));
    assert!(program.poll_actions().unwrap().exit_requested);

    // Held without a new edge.
    runtime.with(|s| s.quit = quit(true, false));
    for _ in 0..3 {
        assert!(!program.poll_actions().unwrap().exit_requested);
    }

    // Released.
    runtime.with(|s| s.quit = quit(false, true));
    assert!(!program.poll_actions().unwrap().exit_requested);

    runtime.with(|s| assert_eq!(s.exit_requests, 1));
}

#[test]
fn test_pose_activity_is_tracked_per_hand() {
    let runtime = MockRuntime::new();
    let mut program = running_program(&runtime, Options::default());
    runtime.with(|s| s.pose_active[Hand::Left] = false);

    program.poll_actions().unwrap();
    let input = program.input().unwrap();
    assert!(!input.hand_active(Hand::Left));
    assert!(input.hand_active(Hand::Right));
}
