//! Ticket-specific error types.

use thiserror::Error;

use crate::domain::foundation::{ChannelId, ErrorCode, UserId};
use crate::ports::{ProvisionError, StoreError};

use super::CommandParseError;

/// Why a staff command was refused before touching any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("author lacks the staff role")]
    MissingStaffRole,

    #[error("channel is outside the ticket category")]
    OutsideTicketCategory,
}

/// Terminal failure of a single routed event.
///
/// Every variant renders to one user- or staff-visible notice via
/// [`TicketError::notice`]; none of them stop the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("channel provisioning failed: {0}")]
    Provisioning(ProvisionError),

    #[error("delivery to user {user_id} failed: {source}")]
    Delivery {
        user_id: UserId,
        source: ProvisionError,
    },

    #[error("no ticket is mapped to channel {0}")]
    NotFound(ChannelId),

    #[error("command rejected: {0}")]
    Policy(#[from] PolicyViolation),

    #[error(transparent)]
    InvalidCommand(#[from] CommandParseError),
}

impl TicketError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TicketError::Store(e) => e.code(),
            TicketError::Provisioning(_) => ErrorCode::ProvisioningFailed,
            TicketError::Delivery { .. } => ErrorCode::DeliveryFailed,
            TicketError::NotFound(_) => ErrorCode::TicketNotFound,
            TicketError::Policy(_) => ErrorCode::Forbidden,
            TicketError::InvalidCommand(_) => ErrorCode::InvalidCommand,
        }
    }

    /// Text sent back to whoever triggered the event.
    pub fn notice(&self) -> String {
        match self {
            TicketError::Store(_) => {
                "❌ The ticket system is temporarily unavailable. Please try again shortly."
                    .to_string()
            }
            TicketError::Provisioning(_) => {
                "❌ Your message couldn't be delivered to staff right now. Please try again later."
                    .to_string()
            }
            TicketError::Delivery { user_id, .. } => format!(
                "❌ Could not deliver the message: user {} is not accepting direct messages.",
                user_id
            ),
            TicketError::NotFound(_) => {
                "❌ Error: Could not find the user associated with this ticket.".to_string()
            }
            TicketError::Policy(PolicyViolation::MissingStaffRole) => {
                "❌ You need the staff role to use ticket commands.".to_string()
            }
            TicketError::Policy(PolicyViolation::OutsideTicketCategory) => {
                "❌ This command can only be used in a ticket channel.".to_string()
            }
            TicketError::InvalidCommand(e) => format!("❌ {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert_and_keep_their_code() {
        let err: TicketError = StoreError::unavailable("timed out").into();
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
        assert!(err.notice().contains("temporarily unavailable"));
    }

    #[test]
    fn policy_violations_are_forbidden() {
        let err: TicketError = PolicyViolation::OutsideTicketCategory.into();
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(
            err.notice(),
            "❌ This command can only be used in a ticket channel."
        );
    }

    #[test]
    fn delivery_notice_names_the_user() {
        let user_id = UserId::new(77).unwrap();
        let err = TicketError::Delivery {
            user_id,
            source: ProvisionError::UserUnreachable(user_id),
        };
        assert_eq!(err.code(), ErrorCode::DeliveryFailed);
        assert!(err.notice().contains("77"));
    }

    #[test]
    fn usage_errors_render_the_usage_line() {
        let err: TicketError = CommandParseError::MissingReplyText {
            prefix: "!".to_string(),
        }
        .into();
        assert_eq!(err.notice(), "❌ usage: !reply <message>");
    }
}
