//! Per-user ticket lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a user's ticket.
///
/// `NoTicket → Creating → Open → NoTicket`. Closing an open ticket returns
/// the user to `NoTicket`; a failed creation does too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    NoTicket,
    Creating,
    Open,
}

impl StateMachine for TicketState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TicketState::*;
        matches!(
            (self, target),
            (NoTicket, Creating) | (Creating, Open) | (Creating, NoTicket) | (Open, NoTicket)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TicketState::*;
        match self {
            NoTicket => vec![Creating],
            Creating => vec![Open, NoTicket],
            Open => vec![NoTicket],
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketState::NoTicket => "no_ticket",
            TicketState::Creating => "creating",
            TicketState::Open => "open",
        };
        write!(f, "{}", s)
    }
}
