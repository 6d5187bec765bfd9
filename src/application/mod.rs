//! Application layer - ticket session core.
//!
//! This layer orchestrates the ticket lifecycle and coordinates between ports:
//! the `CreationGuard` suppresses duplicate concurrent creation, and the
//! `SessionRouter` decides what each inbound event does.

mod creation_guard;
mod session_router;

pub use creation_guard::{CreationGuard, CreationPermit};
pub use session_router::{
    DropReason, InboundMessage, InboundOutcome, RouterSettings, SessionRouter, StaffMessage,
    StaffOutcome,
};
