//! Discord implementation of ChannelProvisioner.
//!
//! Channels are created as text channels under the ticket category of the
//! configured guild. REST failures are classified from the HTTP status and
//! Discord's JSON error code.

use async_trait::async_trait;
use serenity::builder::{CreateChannel, CreateMessage};
use serenity::http::{Http, HttpError};
use serenity::model::channel::ChannelType;
use serenity::model::id::{
    ChannelId as DiscordChannelId, GuildId as DiscordGuildId, UserId as DiscordUserId,
};
use std::sync::Arc;

use crate::domain::foundation::{ChannelId, UserId};
use crate::ports::{ChannelProvisioner, ProvisionError};

/// Discord JSON error code for "Cannot send messages to this user".
const CANNOT_MESSAGE_USER: isize = 50007;

/// Discord REST implementation of ChannelProvisioner.
#[derive(Clone)]
pub struct DiscordProvisioner {
    http: Arc<Http>,
    guild_id: DiscordGuildId,
    category_id: DiscordChannelId,
}

impl DiscordProvisioner {
    pub fn new(http: Arc<Http>, guild_id: u64, category_id: u64) -> Self {
        Self {
            http,
            guild_id: DiscordGuildId::new(guild_id),
            category_id: DiscordChannelId::new(category_id),
        }
    }
}

#[async_trait]
impl ChannelProvisioner for DiscordProvisioner {
    async fn create_channel(&self, name: &str) -> Result<ChannelId, ProvisionError> {
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .category(self.category_id);

        let channel = self
            .guild_id
            .create_channel(&*self.http, builder)
            .await
            .map_err(|e| classify(e, Target::Guild))?;

        tracing::info!(channel_id = %channel.id, name, "Created ticket channel");
        ChannelId::new(channel.id.get()).map_err(|e| ProvisionError::Rejected(e.to_string()))
    }

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<(), ProvisionError> {
        self.http
            .delete_channel(DiscordChannelId::new(channel_id.get()), None)
            .await
            .map_err(|e| classify(e, Target::Channel(channel_id)))?;
        tracing::info!(channel_id = %channel_id, "Deleted ticket channel");
        Ok(())
    }

    async fn send_to_channel(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), ProvisionError> {
        DiscordChannelId::new(channel_id.get())
            .send_message(&*self.http, CreateMessage::new().content(content))
            .await
            .map_err(|e| classify(e, Target::Channel(channel_id)))?;
        Ok(())
    }

    async fn send_to_user(&self, user_id: UserId, content: &str) -> Result<(), ProvisionError> {
        DiscordUserId::new(user_id.get())
            .direct_message(&*self.http, CreateMessage::new().content(content))
            .await
            .map_err(|e| classify(e, Target::User(user_id)))?;
        Ok(())
    }
}

/// What a failed request was aimed at.
#[derive(Debug, Clone, Copy)]
enum Target {
    Guild,
    Channel(ChannelId),
    User(UserId),
}

fn classify(err: serenity::Error, target: Target) -> ProvisionError {
    match &err {
        serenity::Error::Http(http_err) => {
            let status = http_err.status_code().map(|s| s.as_u16());
            classify_response(status, discord_code(http_err), target, err.to_string())
        }
        _ => ProvisionError::Transport(err.to_string()),
    }
}

fn discord_code(err: &HttpError) -> Option<isize> {
    match err {
        HttpError::UnsuccessfulRequest(response) => Some(response.error.code),
        _ => None,
    }
}

fn classify_response(
    status: Option<u16>,
    code: Option<isize>,
    target: Target,
    detail: String,
) -> ProvisionError {
    match (status, target) {
        (_, Target::User(user_id)) if code == Some(CANNOT_MESSAGE_USER) => {
            ProvisionError::UserUnreachable(user_id)
        }
        (Some(403), Target::User(user_id)) => ProvisionError::UserUnreachable(user_id),
        (Some(404), Target::Channel(channel_id)) => ProvisionError::ChannelNotFound(channel_id),
        (Some(_), _) => ProvisionError::Rejected(detail),
        (None, _) => ProvisionError::Transport(detail),
    }
}
