//! Ticket domain module.
//!
//! A ticket is the live mapping between one user and the staff channel
//! opened for them. This module holds the record itself, its lifecycle
//! state machine, staff command parsing and the ticket error taxonomy.

mod command;
mod errors;
mod state;
mod record;

pub use command::{CommandParseError, StaffCommand};
pub use errors::{PolicyViolation, TicketError};
pub use state::TicketState;
pub use record::{channel_name_for, Ticket};
