#![forbid(unsafe_code)]

pub mod capabilities;
pub mod events;
pub mod frame;
pub mod input;
pub mod options;
pub mod plugin;
pub mod program;
pub mod runtime;
pub mod session_state;
pub mod swapchain;
pub mod types;

pub use events::RuntimeEvent;
pub use options::{Options, ReferenceSpaceKind, SystemSelection};
pub use plugin::{GraphicsPlugin, PlatformPlugin};
pub use frame::FrameReport;
pub use program::{PollOutcome, XrProgram};
pub use runtime::{ProjectionLayer, ProjectionLayerView, XrRuntime};
pub use session_state::{SessionCommand, SessionLifecycle, SessionState, Transition};
pub use types::{
    ActionState, ActionType, ApiLayerProperties, ApplicationInfo, Cube, EnvironmentBlendMode,
    Extent2Di, FormFactor, FrameState, Fov, Hand, HapticPulse, InstanceProperties, PerHand,
    Pose, ProjectionView, RawHandle, ReferenceSpaceType, SpaceLocation, SpaceLocationFlags,
    SwapchainCreateInfo, SwapchainUsageFlags, SystemId, SystemProperties, Time, Version, View,
    ViewConfigurationProperties, ViewConfigurationType, ViewConfigurationView, ViewStateFlags,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XrError {
    /// Unrecognised or unsupported configuration; fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),
    /// A runtime call on a mandatory path failed.
    #[error("runtime call {call} failed: {reason}")]
    Runtime { call: &'static str, reason: String },
    #[error("runtime unavailable: {0}")]
    Unavailable(String),
    /// An operation was invoked out of order.
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("graphics backend error: {0}")]
    Graphics(String),
}

impl XrError {
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }

    pub fn runtime(call: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Runtime {
            call,
            reason: reason.to_string(),
        }
    }

    pub fn protocol(msg: impl std::fmt::Display) -> Self {
        Self::Protocol(msg.to_string())
    }

    pub fn graphics(msg: impl std::fmt::Display) -> Self {
        Self::Graphics(msg.to_string())
    }
}

pub type XrResult<T> = Result<T, XrError>;
