//! Mapping store port.
//!
//! Defines the contract for the durable user ↔ channel ticket mapping.
//! The store is the single source of truth: callers never assume a mapping
//! exists without asking it.
//!
//! # Guarantees
//!
//! - **Uniqueness**: `create` fails with `AlreadyExists` if the user already
//!   has a ticket, or `ChannelInUse` if the channel is already mapped.
//!   Enforced by the store itself.
//! - **Bidirectional**: both lookups resolve every open ticket.
//! - **Durable**: mappings outlive the process.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ChannelId, ErrorCode, UserId};
use crate::domain::ticket::Ticket;

/// Errors returned by mapping store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A ticket already exists for this user.
    #[error("ticket already exists for user {0}")]
    AlreadyExists(UserId),

    /// The channel is already mapped to another ticket.
    #[error("channel {0} is already mapped to a ticket")]
    ChannelInUse(ChannelId),

    /// No ticket exists for this user.
    #[error("no ticket for user {0}")]
    NotFound(UserId),

    /// The backing store could not be reached or timed out.
    #[error("mapping store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreError::Unavailable(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::AlreadyExists(_) | StoreError::ChannelInUse(_) => {
                ErrorCode::TicketAlreadyExists
            }
            StoreError::NotFound(_) => ErrorCode::TicketNotFound,
            StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
        }
    }
}

/// Repository port for ticket mappings.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Returns the open ticket channel for a user, if any.
    async fn find_channel_for_user(&self, user_id: UserId) -> Result<Option<ChannelId>, StoreError>;

    /// Returns the user a ticket channel belongs to, if any.
    async fn find_user_for_channel(&self, channel_id: ChannelId)
        -> Result<Option<UserId>, StoreError>;

    /// Records a new ticket.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the user already has a ticket
    /// - `ChannelInUse` if the channel is already mapped
    /// - `Unavailable` on persistence failure
    async fn create(&self, user_id: UserId, channel_id: ChannelId) -> Result<Ticket, StoreError>;

    /// Removes the user's ticket.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user has no ticket
    /// - `Unavailable` on persistence failure
    async fn delete(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Verifies the backing persistence is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn MappingStore) {}
    }

    #[test]
    fn store_errors_map_to_codes() {
        let user = UserId::new(1).unwrap();
        assert_eq!(StoreError::AlreadyExists(user).code(), ErrorCode::TicketAlreadyExists);
        assert_eq!(
            StoreError::ChannelInUse(ChannelId::new(2).unwrap()).code(),
            ErrorCode::TicketAlreadyExists
        );
        assert_eq!(StoreError::NotFound(user).code(), ErrorCode::TicketNotFound);
        assert_eq!(
            StoreError::unavailable("timeout").code(),
            ErrorCode::StoreUnavailable
        );
    }
}
