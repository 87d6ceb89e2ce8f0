//! Input actions: declaration, binding suggestion and per-frame polling.

use tracing::{debug, info, warn};

use crate::runtime::XrRuntime;
use crate::types::{ActionState, ActionType, Hand, HapticPulse, PerHand};
use crate::{XrError, XrResult};

/// Grab value above which a haptic pulse fires on that hand.
pub const GRAB_HAPTIC_THRESHOLD: f32 = 0.9;
pub const HAPTIC_AMPLITUDE: f32 = 0.5;

const ACTION_SET_NAME: &str = "gameplay";
const ACTION_SET_LOCALIZED_NAME: &str = "Gameplay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    Grab,
    Pose,
    Vibrate,
    Quit,
}

impl ActionId {
    pub const ALL: [ActionId; 4] = [ActionId::Grab, ActionId::Pose, ActionId::Vibrate, ActionId::Quit];

    pub fn name(self) -> &'static str {
        match self {
            ActionId::Grab => "grab_object",
            ActionId::Pose => "hand_pose",
            ActionId::Vibrate => "vibrate_hand",
            ActionId::Quit => "quit_session",
        }
    }

    pub fn localized_name(self) -> &'static str {
        match self {
            ActionId::Grab => "Grab Object",
            ActionId::Pose => "Hand Pose",
            ActionId::Vibrate => "Vibrate Hand",
            ActionId::Quit => "Quit Session",
        }
    }

    /// Short label used in binding diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ActionId::Grab => "Grab",
            ActionId::Pose => "Pose",
            ActionId::Vibrate => "Vibrate",
            ActionId::Quit => "Quit",
        }
    }

    pub fn action_type(self) -> ActionType {
        match self {
            ActionId::Grab => ActionType::FloatInput,
            ActionId::Pose => ActionType::PoseInput,
            ActionId::Vibrate => ActionType::VibrationOutput,
            ActionId::Quit => ActionType::BooleanInput,
        }
    }

    /// Quit does not care which hand pressed it, so it has no subaction paths.
    pub fn is_per_hand(self) -> bool {
        !matches!(self, ActionId::Quit)
    }
}

/// Suggested bindings for one controller family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionProfile {
    pub path: &'static str,
    pub bindings: Vec<(ActionId, &'static str)>,
}

impl InteractionProfile {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, action: ActionId, path: &'static str) -> Self {
        self.bindings.push((action, path));
        self
    }

    /// Bind `action` to `component` under both hands' user paths.
    pub fn bind_both(self, action: ActionId, left: &'static str, right: &'static str) -> Self {
        self.bind(action, left).bind(action, right)
    }
}

/// The controller families bindings are suggested for.
///
/// The runtime picks the active profile; entries are independent of each other.
pub fn default_interaction_profiles() -> Vec<InteractionProfile> {
    const GRIP_POSE: (&str, &str) = (
        "/user/hand/left/input/grip/pose",
        "/user/hand/right/input/grip/pose",
    );
    const HAPTIC: (&str, &str) = (
        "/user/hand/left/output/haptic",
        "/user/hand/right/output/haptic",
    );
    const MENU_CLICK: (&str, &str) = (
        "/user/hand/left/input/menu/click",
        "/user/hand/right/input/menu/click",
    );

    vec![
        InteractionProfile::new("/interaction_profiles/khr/simple_controller")
            // Fall back to a click input for the grab action.
            .bind_both(
                ActionId::Grab,
                "/user/hand/left/input/select/click",
                "/user/hand/right/input/select/click",
            )
            .bind_both(ActionId::Pose, GRIP_POSE.0, GRIP_POSE.1)
            .bind_both(ActionId::Quit, MENU_CLICK.0, MENU_CLICK.1)
            .bind_both(ActionId::Vibrate, HAPTIC.0, HAPTIC.1),
        InteractionProfile::new("/interaction_profiles/oculus/touch_controller")
            .bind_both(
                ActionId::Grab,
                "/user/hand/left/input/squeeze/value",
                "/user/hand/right/input/squeeze/value",
            )
            .bind_both(ActionId::Pose, GRIP_POSE.0, GRIP_POSE.1)
            // Only the left touch controller has a menu button.
            .bind(ActionId::Quit, MENU_CLICK.0)
            .bind_both(ActionId::Vibrate, HAPTIC.0, HAPTIC.1),
        InteractionProfile::new("/interaction_profiles/htc/vive_controller")
            .bind_both(
                ActionId::Grab,
                "/user/hand/left/input/trigger/value",
                "/user/hand/right/input/trigger/value",
            )
            .bind_both(ActionId::Pose, GRIP_POSE.0, GRIP_POSE.1)
            .bind_both(ActionId::Quit, MENU_CLICK.0, MENU_CLICK.1)
            .bind_both(ActionId::Vibrate, HAPTIC.0, HAPTIC.1),
        InteractionProfile::new("/interaction_profiles/valve/index_controller")
            .bind_both(
                ActionId::Grab,
                "/user/hand/left/input/squeeze/force",
                "/user/hand/right/input/squeeze/force",
            )
            .bind_both(ActionId::Pose, GRIP_POSE.0, GRIP_POSE.1)
            .bind_both(
                ActionId::Quit,
                "/user/hand/left/input/b/click",
                "/user/hand/right/input/b/click",
            )
            .bind_both(ActionId::Vibrate, HAPTIC.0, HAPTIC.1),
        InteractionProfile::new("/interaction_profiles/microsoft/motion_controller")
            .bind_both(
                ActionId::Grab,
                "/user/hand/left/input/squeeze/click",
                "/user/hand/right/input/squeeze/click",
            )
            .bind_both(ActionId::Pose, GRIP_POSE.0, GRIP_POSE.1)
            .bind_both(ActionId::Quit, MENU_CLICK.0, MENU_CLICK.1)
            .bind_both(ActionId::Vibrate, HAPTIC.0, HAPTIC.1),
    ]
}

/// Rendered hand scale: 1.0 when open, 0.5 when fully squeezed.
pub fn hand_scale(grab_value: f32) -> f32 {
    1.0 - 0.5 * grab_value
}

pub fn should_vibrate(grab: &ActionState<f32>) -> bool {
    grab.is_active && grab.current_state > GRAB_HAPTIC_THRESHOLD
}

/// Quit is edge-triggered: only the sync in which the button went down counts.
pub fn quit_requested(quit: &ActionState<bool>) -> bool {
    quit.is_active && quit.changed_since_last_sync && quit.current_state
}

/// Outcome of one [`InputState::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionPoll {
    pub haptic_pulses: PerHand<bool>,
    pub exit_requested: bool,
}

pub struct InputState<R: XrRuntime> {
    // Field order is drop order: spaces and actions before their action set.
    hand_space: PerHand<R::Space>,
    grab: R::Action,
    pose: R::Action,
    vibrate: R::Action,
    quit: R::Action,
    action_set: R::ActionSet,
    hand_subaction_path: PerHand<R::Path>,
    hand_scale: PerHand<f32>,
    hand_active: PerHand<bool>,
}

impl<R: XrRuntime> InputState<R> {
    /// Declare the action set, suggest bindings, create the hand spaces and
    /// attach the set to `session`.
    pub fn new(
        runtime: &R,
        instance: &R::Instance,
        session: &R::Session,
        profiles: &[InteractionProfile],
    ) -> XrResult<Self> {
        let action_set = runtime.create_action_set(
            instance,
            ACTION_SET_NAME,
            ACTION_SET_LOCALIZED_NAME,
            0,
        )?;

        let hand_subaction_path =
            PerHand::try_from_fn(|hand| runtime.string_to_path(instance, hand.user_path()))?;
        let create = |id: ActionId| {
            let subaction_paths: &[R::Path] = if id.is_per_hand() {
                &hand_subaction_path.0
            } else {
                &[]
            };
            runtime.create_action(
                &action_set,
                id.name(),
                id.localized_name(),
                id.action_type(),
                subaction_paths,
            )
        };
        let grab = create(ActionId::Grab)?;
        let pose = create(ActionId::Pose)?;
        let vibrate = create(ActionId::Vibrate)?;
        let quit = create(ActionId::Quit)?;

        let mut accepted = 0usize;
        for profile in profiles {
            let action = |id: ActionId| match id {
                ActionId::Grab => &grab,
                ActionId::Pose => &pose,
                ActionId::Vibrate => &vibrate,
                ActionId::Quit => &quit,
            };
            match suggest_profile(runtime, instance, profile, action) {
                Ok(()) => {
                    debug!("suggested {} bindings for {}", profile.bindings.len(), profile.path);
                    accepted += 1;
                }
                Err(err) => warn!("binding suggestion rejected for {}: {err}", profile.path),
            }
        }
        if accepted == 0 && !profiles.is_empty() {
            return Err(XrError::runtime(
                "xrSuggestInteractionProfileBindings",
                "no interaction profile accepted",
            ));
        }

        let hand_space = PerHand::try_from_fn(|hand| {
            runtime.create_action_space(session, &pose, hand_subaction_path[hand])
        })?;

        runtime.attach_action_sets(session, &[&action_set])?;

        Ok(Self {
            hand_space,
            grab,
            pose,
            vibrate,
            quit,
            action_set,
            hand_subaction_path,
            hand_scale: PerHand::splat(1.0),
            hand_active: PerHand::splat(false),
        })
    }

    pub fn hand_space(&self, hand: Hand) -> &R::Space {
        &self.hand_space[hand]
    }

    pub fn hand_scale(&self, hand: Hand) -> f32 {
        self.hand_scale[hand]
    }

    /// Whether the hand's pose action was active at the last poll.
    pub fn hand_active(&self, hand: Hand) -> bool {
        self.hand_active[hand]
    }

    fn action(&self, id: ActionId) -> &R::Action {
        match id {
            ActionId::Grab => &self.grab,
            ActionId::Pose => &self.pose,
            ActionId::Vibrate => &self.vibrate,
            ActionId::Quit => &self.quit,
        }
    }

    /// Sync the action set and update per-hand scale, activity and haptics.
    pub fn poll(&mut self, runtime: &R, session: &R::Session) -> XrResult<ActionPoll> {
        self.hand_active = PerHand::splat(false);
        let mut report = ActionPoll::default();

        runtime.sync_actions(session, &self.action_set)?;

        for hand in Hand::ALL {
            let subaction = self.hand_subaction_path[hand];
            let grab = runtime.action_state_float(session, &self.grab, Some(subaction))?;
            if grab.is_active {
                self.hand_scale[hand] = hand_scale(grab.current_state);
                if should_vibrate(&grab) {
                    let pulse = HapticPulse {
                        amplitude: HAPTIC_AMPLITUDE,
                    };
                    match runtime.apply_haptic_feedback(session, &self.vibrate, subaction, pulse) {
                        Ok(()) => report.haptic_pulses[hand] = true,
                        Err(err) => warn!("haptic pulse on {hand} hand failed: {err}"),
                    }
                }
            }

            self.hand_active[hand] = runtime.action_pose_active(session, &self.pose, subaction)?;
        }

        let quit = runtime.action_state_boolean(session, &self.quit, None)?;
        if quit_requested(&quit) {
            info!("quit action pressed, requesting session exit");
            runtime.request_exit_session(session)?;
            report.exit_requested = true;
        }

        Ok(report)
    }

    /// Log which physical inputs each action ended up bound to.
    pub fn log_bound_sources(&self, runtime: &R, session: &R::Session) {
        for id in [ActionId::Grab, ActionId::Quit, ActionId::Pose, ActionId::Vibrate] {
            match describe_bound_sources(runtime, session, self.action(id)) {
                Ok(sources) if sources.is_empty() => {
                    info!("{} action is bound to nothing", id.label());
                }
                Ok(sources) => info!("{} action is bound to {}", id.label(), sources),
                Err(err) => warn!("unable to resolve {} action sources: {err}", id.label()),
            }
        }
    }
}

fn suggest_profile<'a, R: XrRuntime>(
    runtime: &R,
    instance: &R::Instance,
    profile: &InteractionProfile,
    action: impl Fn(ActionId) -> &'a R::Action,
) -> XrResult<()>
where
    R::Action: 'a,
{
    let profile_path = runtime.string_to_path(instance, profile.path)?;
    let mut bindings = Vec::with_capacity(profile.bindings.len());
    for (id, binding_path) in &profile.bindings {
        let path = runtime.string_to_path(instance, binding_path)?;
        bindings.push((action(*id), path));
    }
    runtime.suggest_interaction_profile_bindings(instance, profile_path, &bindings)
}

/// `'A' and 'B'` for every bound source with a non-empty localized name.
fn describe_bound_sources<R: XrRuntime>(
    runtime: &R,
    session: &R::Session,
    action: &R::Action,
) -> XrResult<String> {
    let mut names = Vec::new();
    for source in runtime.enumerate_bound_sources(session, action)? {
        let name = runtime.input_source_localized_name(session, source)?;
        if !name.is_empty() {
            names.push(format!("'{name}'"));
        }
    }
    Ok(names.join(" and "))
}
