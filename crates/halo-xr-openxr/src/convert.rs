//! Conversions between `openxr` values and the runtime-neutral halo types.

use glam::{Quat, Vec3};
use openxr as xr;
use openxr::sys::Handle;

use halo_xr::{
    ActionState, EnvironmentBlendMode, FormFactor, Fov, Pose, RawHandle, ReferenceSpaceType,
    RuntimeEvent, SessionState, SpaceLocationFlags, SwapchainUsageFlags, SystemId, Time, Version,
    View, ViewConfigurationType, ViewConfigurationView, ViewStateFlags,
};

pub fn pose_to_xr(pose: Pose) -> xr::Posef {
    xr::Posef {
        orientation: xr::Quaternionf {
            x: pose.orientation.x,
            y: pose.orientation.y,
            z: pose.orientation.z,
            w: pose.orientation.w,
        },
        position: xr::Vector3f {
            x: pose.position.x,
            y: pose.position.y,
            z: pose.position.z,
        },
    }
}

pub fn pose_from_xr(pose: xr::Posef) -> Pose {
    Pose {
        orientation: Quat::from_xyzw(
            pose.orientation.x,
            pose.orientation.y,
            pose.orientation.z,
            pose.orientation.w,
        ),
        position: Vec3::new(pose.position.x, pose.position.y, pose.position.z),
    }
}

pub fn fov_to_xr(fov: Fov) -> xr::Fovf {
    xr::Fovf {
        angle_left: fov.angle_left,
        angle_right: fov.angle_right,
        angle_up: fov.angle_up,
        angle_down: fov.angle_down,
    }
}

pub fn fov_from_xr(fov: xr::Fovf) -> Fov {
    Fov {
        angle_left: fov.angle_left,
        angle_right: fov.angle_right,
        angle_up: fov.angle_up,
        angle_down: fov.angle_down,
    }
}

pub fn view_from_xr(view: &xr::View) -> View {
    View {
        pose: pose_from_xr(view.pose),
        fov: fov_from_xr(view.fov),
    }
}

pub fn time_to_xr(time: Time) -> xr::Time {
    xr::Time::from_nanos(time.as_nanos())
}

pub fn time_from_xr(time: xr::Time) -> Time {
    Time::from_nanos(time.as_nanos())
}

pub fn version_from_xr(version: xr::Version) -> Version {
    Version::new(version.major(), version.minor(), version.patch())
}

pub fn system_to_xr(system: SystemId) -> xr::SystemId {
    xr::SystemId::from_raw(system.0)
}

pub fn system_from_xr(system: xr::SystemId) -> SystemId {
    SystemId(system.into_raw())
}

pub fn session_handle(session: xr::sys::Session) -> RawHandle {
    RawHandle(session.into_raw())
}

pub fn form_factor_to_xr(form_factor: FormFactor) -> xr::FormFactor {
    match form_factor {
        FormFactor::HeadMountedDisplay => xr::FormFactor::HEAD_MOUNTED_DISPLAY,
        FormFactor::HandheldDisplay => xr::FormFactor::HANDHELD_DISPLAY,
    }
}

pub fn view_configuration_to_xr(ty: ViewConfigurationType) -> xr::ViewConfigurationType {
    match ty {
        ViewConfigurationType::PrimaryMono => xr::ViewConfigurationType::PRIMARY_MONO,
        ViewConfigurationType::PrimaryStereo => xr::ViewConfigurationType::PRIMARY_STEREO,
        ViewConfigurationType::Other(raw) => xr::ViewConfigurationType::from_raw(raw),
    }
}

pub fn view_configuration_from_xr(ty: xr::ViewConfigurationType) -> ViewConfigurationType {
    match ty {
        xr::ViewConfigurationType::PRIMARY_MONO => ViewConfigurationType::PrimaryMono,
        xr::ViewConfigurationType::PRIMARY_STEREO => ViewConfigurationType::PrimaryStereo,
        other => ViewConfigurationType::Other(other.into_raw()),
    }
}

pub fn blend_mode_to_xr(mode: EnvironmentBlendMode) -> xr::EnvironmentBlendMode {
    match mode {
        EnvironmentBlendMode::Opaque => xr::EnvironmentBlendMode::OPAQUE,
        EnvironmentBlendMode::Additive => xr::EnvironmentBlendMode::ADDITIVE,
        EnvironmentBlendMode::AlphaBlend => xr::EnvironmentBlendMode::ALPHA_BLEND,
        EnvironmentBlendMode::Other(raw) => xr::EnvironmentBlendMode::from_raw(raw),
    }
}

pub fn blend_mode_from_xr(mode: xr::EnvironmentBlendMode) -> EnvironmentBlendMode {
    match mode {
        xr::EnvironmentBlendMode::OPAQUE => EnvironmentBlendMode::Opaque,
        xr::EnvironmentBlendMode::ADDITIVE => EnvironmentBlendMode::Additive,
        xr::EnvironmentBlendMode::ALPHA_BLEND => EnvironmentBlendMode::AlphaBlend,
        other => EnvironmentBlendMode::Other(other.into_raw()),
    }
}

pub fn reference_space_to_xr(ty: ReferenceSpaceType) -> xr::ReferenceSpaceType {
    match ty {
        ReferenceSpaceType::View => xr::ReferenceSpaceType::VIEW,
        ReferenceSpaceType::Local => xr::ReferenceSpaceType::LOCAL,
        ReferenceSpaceType::Stage => xr::ReferenceSpaceType::STAGE,
        ReferenceSpaceType::Other(raw) => xr::ReferenceSpaceType::from_raw(raw),
    }
}

pub fn reference_space_from_xr(ty: xr::ReferenceSpaceType) -> ReferenceSpaceType {
    match ty {
        xr::ReferenceSpaceType::VIEW => ReferenceSpaceType::View,
        xr::ReferenceSpaceType::LOCAL => ReferenceSpaceType::Local,
        xr::ReferenceSpaceType::STAGE => ReferenceSpaceType::Stage,
        other => ReferenceSpaceType::Other(other.into_raw()),
    }
}

pub fn session_state_from_xr(state: xr::SessionState) -> SessionState {
    match state {
        xr::SessionState::IDLE => SessionState::Idle,
        xr::SessionState::READY => SessionState::Ready,
        xr::SessionState::SYNCHRONIZED => SessionState::Synchronized,
        xr::SessionState::VISIBLE => SessionState::Visible,
        xr::SessionState::FOCUSED => SessionState::Focused,
        xr::SessionState::STOPPING => SessionState::Stopping,
        xr::SessionState::LOSS_PENDING => SessionState::LossPending,
        xr::SessionState::EXITING => SessionState::Exiting,
        _ => SessionState::Unknown,
    }
}

pub fn space_location_flags_from_xr(flags: xr::SpaceLocationFlags) -> SpaceLocationFlags {
    let mut out = SpaceLocationFlags::empty();
    out.set(
        SpaceLocationFlags::ORIENTATION_VALID,
        flags.contains(xr::SpaceLocationFlags::ORIENTATION_VALID),
    );
    out.set(
        SpaceLocationFlags::POSITION_VALID,
        flags.contains(xr::SpaceLocationFlags::POSITION_VALID),
    );
    out.set(
        SpaceLocationFlags::ORIENTATION_TRACKED,
        flags.contains(xr::SpaceLocationFlags::ORIENTATION_TRACKED),
    );
    out.set(
        SpaceLocationFlags::POSITION_TRACKED,
        flags.contains(xr::SpaceLocationFlags::POSITION_TRACKED),
    );
    out
}

pub fn view_state_flags_from_xr(flags: xr::ViewStateFlags) -> ViewStateFlags {
    let mut out = ViewStateFlags::empty();
    out.set(
        ViewStateFlags::ORIENTATION_VALID,
        flags.contains(xr::ViewStateFlags::ORIENTATION_VALID),
    );
    out.set(
        ViewStateFlags::POSITION_VALID,
        flags.contains(xr::ViewStateFlags::POSITION_VALID),
    );
    out.set(
        ViewStateFlags::ORIENTATION_TRACKED,
        flags.contains(xr::ViewStateFlags::ORIENTATION_TRACKED),
    );
    out.set(
        ViewStateFlags::POSITION_TRACKED,
        flags.contains(xr::ViewStateFlags::POSITION_TRACKED),
    );
    out
}

pub fn swapchain_usage_to_xr(usage: SwapchainUsageFlags) -> xr::SwapchainUsageFlags {
    let pairs = [
        (
            SwapchainUsageFlags::COLOR_ATTACHMENT,
            xr::SwapchainUsageFlags::COLOR_ATTACHMENT,
        ),
        (
            SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            xr::SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT,
        ),
        (
            SwapchainUsageFlags::UNORDERED_ACCESS,
            xr::SwapchainUsageFlags::UNORDERED_ACCESS,
        ),
        (
            SwapchainUsageFlags::TRANSFER_SRC,
            xr::SwapchainUsageFlags::TRANSFER_SRC,
        ),
        (
            SwapchainUsageFlags::TRANSFER_DST,
            xr::SwapchainUsageFlags::TRANSFER_DST,
        ),
        (SwapchainUsageFlags::SAMPLED, xr::SwapchainUsageFlags::SAMPLED),
    ];
    pairs
        .into_iter()
        .filter(|(ours, _)| usage.contains(*ours))
        .fold(xr::SwapchainUsageFlags::EMPTY, |acc, (_, theirs)| acc | theirs)
}

pub fn view_configuration_view_from_xr(view: &xr::ViewConfigurationView) -> ViewConfigurationView {
    ViewConfigurationView {
        recommended_image_rect_width: view.recommended_image_rect_width,
        max_image_rect_width: view.max_image_rect_width,
        recommended_image_rect_height: view.recommended_image_rect_height,
        max_image_rect_height: view.max_image_rect_height,
        recommended_swapchain_sample_count: view.recommended_swapchain_sample_count,
        max_swapchain_sample_count: view.max_swapchain_sample_count,
    }
}

pub fn action_state_from_xr<T>(state: &xr::ActionState<T>) -> ActionState<T>
where
    T: xr::ActionInput + Copy,
{
    ActionState {
        current_state: state.current_state,
        changed_since_last_sync: state.changed_since_last_sync,
        last_change_time: time_from_xr(state.last_change_time),
        is_active: state.is_active,
    }
}

pub fn event_from_xr(event: xr::Event<'_>) -> RuntimeEvent {
    match event {
        xr::Event::EventsLost(e) => RuntimeEvent::EventsLost {
            lost_event_count: e.lost_event_count(),
        },
        xr::Event::InstanceLossPending(e) => RuntimeEvent::InstanceLossPending {
            loss_time: time_from_xr(e.loss_time()),
        },
        xr::Event::SessionStateChanged(e) => RuntimeEvent::SessionStateChanged {
            session: session_handle(e.session()),
            state: session_state_from_xr(e.state()),
            time: time_from_xr(e.time()),
        },
        xr::Event::InteractionProfileChanged(e) => RuntimeEvent::InteractionProfileChanged {
            session: session_handle(e.session()),
        },
        xr::Event::ReferenceSpaceChangePending(e) => RuntimeEvent::ReferenceSpaceChangePending {
            session: session_handle(e.session()),
            reference_space_type: reference_space_from_xr(e.reference_space_type()),
        },
        // The decoded event does not expose its structure type; report XR_TYPE_UNKNOWN.
        _ => RuntimeEvent::Other {
            structure_type: xr::StructureType::UNKNOWN.into_raw(),
        },
    }
}
