//! Channel provisioner port.
//!
//! The platform side of the relay: creates and deletes ticket channels and
//! delivers messages to channels and to users' direct messages.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ChannelId, ErrorCode, UserId};

/// Errors returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// The platform refused the request (permissions, limits, bad input).
    #[error("platform rejected request: {0}")]
    Rejected(String),

    /// The target channel does not exist any more.
    #[error("channel {0} not found")]
    ChannelNotFound(ChannelId),

    /// The user cannot be messaged (left the guild, blocked the bot, closed DMs).
    #[error("user {0} is unreachable")]
    UserUnreachable(UserId),

    /// Network or gateway failure.
    #[error("platform transport error: {0}")]
    Transport(String),
}

impl ProvisionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProvisionError::Rejected(_) | ProvisionError::Transport(_) => {
                ErrorCode::ProvisioningFailed
            }
            ProvisionError::ChannelNotFound(_) => ErrorCode::TicketNotFound,
            ProvisionError::UserUnreachable(_) => ErrorCode::DeliveryFailed,
        }
    }
}

/// Port for channel lifecycle and message delivery on the platform.
#[async_trait]
pub trait ChannelProvisioner: Send + Sync {
    /// Creates a ticket channel named `name` and returns its id.
    async fn create_channel(&self, name: &str) -> Result<ChannelId, ProvisionError>;

    /// Deletes a ticket channel.
    async fn delete_channel(&self, channel_id: ChannelId) -> Result<(), ProvisionError>;

    /// Posts `content` into a channel.
    async fn send_to_channel(&self, channel_id: ChannelId, content: &str)
        -> Result<(), ProvisionError>;

    /// Sends `content` to a user's direct messages.
    async fn send_to_user(&self, user_id: UserId, content: &str) -> Result<(), ProvisionError>;
}
