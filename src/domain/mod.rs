//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine trait)
//! - `ticket` - Ticket record, lifecycle state and staff commands

pub mod foundation;
pub mod ticket;
