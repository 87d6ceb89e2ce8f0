//! Session lifecycle state machine.
//!
//! The runtime drives the state through session-state-changed events. Only
//! four states carry side effects: `Ready` begins the session, `Stopping` ends
//! it, `Exiting` leaves the render loop for good and `LossPending` leaves it
//! asking the caller to reconnect.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Idle,
    Ready,
    Synchronized,
    Visible,
    Focused,
    Stopping,
    LossPending,
    Exiting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unknown => "XR_SESSION_STATE_UNKNOWN",
            SessionState::Idle => "XR_SESSION_STATE_IDLE",
            SessionState::Ready => "XR_SESSION_STATE_READY",
            SessionState::Synchronized => "XR_SESSION_STATE_SYNCHRONIZED",
            SessionState::Visible => "XR_SESSION_STATE_VISIBLE",
            SessionState::Focused => "XR_SESSION_STATE_FOCUSED",
            SessionState::Stopping => "XR_SESSION_STATE_STOPPING",
            SessionState::LossPending => "XR_SESSION_STATE_LOSS_PENDING",
            SessionState::Exiting => "XR_SESSION_STATE_EXITING",
        };
        f.write_str(name)
    }
}

/// Runtime call the owner of the session must issue after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Begin,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    pub command: Option<SessionCommand>,
    pub exit_render_loop: bool,
    pub request_restart: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionLifecycle {
    state: SessionState,
    running: bool,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_focused(&self) -> bool {
        self.state == SessionState::Focused
    }

    /// Record `new_state` and report what it requires of the caller.
    pub fn on_state_changed(&mut self, new_state: SessionState) -> Transition {
        self.state = new_state;
        match new_state {
            SessionState::Ready => {
                self.running = true;
                Transition {
                    command: Some(SessionCommand::Begin),
                    ..Transition::default()
                }
            }
            SessionState::Stopping => {
                self.running = false;
                Transition {
                    command: Some(SessionCommand::End),
                    ..Transition::default()
                }
            }
            SessionState::Exiting => Transition {
                command: None,
                exit_render_loop: true,
                request_restart: false,
            },
            SessionState::LossPending => Transition {
                command: None,
                exit_render_loop: true,
                request_restart: true,
            },
            SessionState::Unknown
            | SessionState::Idle
            | SessionState::Synchronized
            | SessionState::Visible
            | SessionState::Focused => Transition::default(),
        }
    }
}
