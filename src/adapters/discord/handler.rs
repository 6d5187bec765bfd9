//! Gateway event handler.
//!
//! Translates serenity events into router calls. Direct messages become
//! [`InboundMessage`]s; messages in the configured guild that look like
//! staff commands become [`StaffMessage`]s. Bot authors are ignored.

use serenity::async_trait;
use serenity::gateway::ActivityData;
use serenity::model::channel::{Channel, Message};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId as DiscordChannelId, GuildId, RoleId};
use serenity::prelude::*;
use std::sync::Arc;

use crate::application::{InboundMessage, SessionRouter, StaffMessage};
use crate::domain::foundation::{ChannelId, UserId};

/// Serenity event handler driving the session router.
pub struct DiscordHandler {
    router: Arc<SessionRouter>,
    guild_id: GuildId,
    staff_role_id: RoleId,
    status_text: String,
}

impl DiscordHandler {
    pub fn new(
        router: Arc<SessionRouter>,
        guild_id: u64,
        staff_role_id: u64,
        status_text: impl Into<String>,
    ) -> Self {
        Self {
            router,
            guild_id: GuildId::new(guild_id),
            staff_role_id: RoleId::new(staff_role_id),
            status_text: status_text.into(),
        }
    }

    async fn on_direct_message(&self, msg: &Message) {
        let user_id = match UserId::new(msg.author.id.get()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring DM with invalid author id");
                return;
            }
        };

        let content = inbound_content(
            &msg.content,
            msg.attachments.iter().map(|a| a.url.as_str()),
        );
        if content.is_empty() {
            return;
        }

        tracing::info!(user_id = %user_id, author = %msg.author.name, "Received direct message");
        self.router
            .dispatch_user_message(InboundMessage {
                user_id,
                author_name: msg.author.name.clone(),
                content,
            })
            .await;
    }

    async fn on_guild_message(&self, ctx: &Context, msg: &Message) {
        if !msg
            .content
            .starts_with(self.router.settings().command_prefix.as_str())
        {
            return;
        }
        let Ok(channel_id) = ChannelId::new(msg.channel_id.get()) else {
            return;
        };

        let category_id = self.parent_category(ctx, msg.channel_id).await;
        let has_staff_role = self.has_staff_role(ctx, msg).await;

        self.router
            .dispatch_staff_message(StaffMessage {
                channel_id,
                category_id,
                author_name: msg.author.name.clone(),
                has_staff_role,
                content: msg.content.clone(),
            })
            .await;
    }

    async fn parent_category(
        &self,
        ctx: &Context,
        channel_id: DiscordChannelId,
    ) -> Option<ChannelId> {
        match channel_id.to_channel(ctx).await {
            Ok(Channel::Guild(channel)) => channel
                .parent_id
                .and_then(|parent| ChannelId::new(parent.get()).ok()),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(channel_id = %channel_id, error = %e, "Could not resolve channel");
                None
            }
        }
    }

    async fn has_staff_role(&self, ctx: &Context, msg: &Message) -> bool {
        if let Some(member) = &msg.member {
            return member.roles.contains(&self.staff_role_id);
        }
        match self.guild_id.member(ctx, msg.author.id).await {
            Ok(member) => member.roles.contains(&self.staff_role_id),
            Err(e) => {
                tracing::warn!(
                    user_id = %msg.author.id,
                    error = %e,
                    "Could not resolve member roles"
                );
                false
            }
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        match msg.guild_id {
            None => self.on_direct_message(&msg).await,
            Some(guild_id) if guild_id == self.guild_id => {
                self.on_guild_message(&ctx, &msg).await
            }
            Some(_) => {}
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to Discord gateway"
        );
        ctx.set_activity(Some(ActivityData::listening(self.status_text.as_str())));
    }
}

/// Message text plus one line per attachment URL.
fn inbound_content<'a>(text: &str, attachment_urls: impl Iterator<Item = &'a str>) -> String {
    let mut content = text.trim().to_string();
    for url in attachment_urls {
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(url);
    }
    content
}

/// Role mention pinged on every new ticket.
pub fn staff_mention(staff_role_id: u64) -> String {
    format!("<@&{}>", staff_role_id)
}
