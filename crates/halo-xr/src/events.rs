use crate::session_state::SessionState;
use crate::types::{RawHandle, ReferenceSpaceType, Time};

/// One event read from the runtime's queue, decoded once per poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The queue overflowed and older events were dropped.
    EventsLost { lost_event_count: u32 },
    InstanceLossPending { loss_time: Time },
    SessionStateChanged {
        session: RawHandle,
        state: SessionState,
        time: Time,
    },
    InteractionProfileChanged { session: RawHandle },
    ReferenceSpaceChangePending {
        session: RawHandle,
        reference_space_type: ReferenceSpaceType,
    },
    /// Any event type this program does not act on, by raw structure type.
    Other { structure_type: i32 },
}
