//! Ticket record - the persisted user ↔ channel mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChannelId, UserId};

/// A live mapping between one user and one dedicated ticket channel.
///
/// Immutable once created. A ticket is never updated in place; closing it
/// deletes the record and a later message opens a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    user_id: UserId,
    channel_id: ChannelId,
    opened_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a ticket opened now.
    pub fn new(user_id: UserId, channel_id: ChannelId) -> Self {
        Self::reconstitute(user_id, channel_id, Utc::now())
    }

    /// Rebuilds a ticket from persisted fields.
    pub fn reconstitute(user_id: UserId, channel_id: ChannelId, opened_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            channel_id,
            opened_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

/// Name of the channel provisioned for `user_id`.
pub fn channel_name_for(prefix: &str, user_id: UserId) -> String {
    format!("{}-{}", prefix, user_id)
}
