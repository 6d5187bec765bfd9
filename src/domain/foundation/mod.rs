//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types and the state machine trait that
//! form the vocabulary of the ticket domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{ChannelId, UserId};
pub use state_machine::StateMachine;
