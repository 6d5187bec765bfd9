//! SessionRouter - drives the ticket lifecycle for every inbound event.
//!
//! Two kinds of events reach the router:
//!
//! - a direct message from a user, which either opens a ticket or is
//!   forwarded into the user's existing ticket channel;
//! - a staff command typed inside a ticket channel (`reply`, `close`).
//!
//! The `dispatch_*` methods are the boundary towards the platform: every
//! failure is logged and turned into one notice for whoever triggered the
//! event, and nothing is returned to the event loop.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{ChannelId, StateMachine, UserId};
use crate::domain::ticket::{
    channel_name_for, CommandParseError, PolicyViolation, StaffCommand, TicketError, TicketState,
};
use crate::ports::{ChannelProvisioner, MappingStore, ProvisionError, StoreError};

use super::creation_guard::CreationGuard;

/// Static settings for routing.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Category that all ticket channels live under.
    pub ticket_category: ChannelId,
    /// Ticket channels are named `<channel_prefix>-<user id>`.
    pub channel_prefix: String,
    /// Prefix for staff commands.
    pub command_prefix: String,
    /// Rendered mention that pings staff on a new ticket.
    pub staff_mention: String,
    /// Delay between announcing a close and deleting the channel.
    pub close_grace: Duration,
}

/// A direct message from a user.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub user_id: UserId,
    pub author_name: String,
    pub content: String,
}

/// A message posted in the guild that may be a staff command.
#[derive(Debug, Clone)]
pub struct StaffMessage {
    pub channel_id: ChannelId,
    /// Parent category of the channel, if it has one.
    pub category_id: Option<ChannelId>,
    pub author_name: String,
    pub has_staff_role: bool,
    pub content: String,
}

/// What happened to a user's direct message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// A new ticket was opened and the message posted into it.
    Created(ChannelId),
    /// The message was forwarded into the existing ticket.
    Forwarded(ChannelId),
    /// The message was intentionally not delivered.
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Another message from the same user is already opening the ticket.
    CreationInFlight,
    /// The store maps the user to a channel that no longer exists.
    OrphanedMapping(ChannelId),
    /// The store already held a ticket for the user when ours was recorded.
    LostCreationRace,
}

/// What a staff command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffOutcome {
    Replied { user_id: UserId },
    Closed { user_id: UserId, channel_id: ChannelId },
}

/// The ticket state machine.
pub struct SessionRouter {
    store: Arc<dyn MappingStore>,
    provisioner: Arc<dyn ChannelProvisioner>,
    guard: CreationGuard,
    settings: RouterSettings,
}

impl SessionRouter {
    pub fn new(
        store: Arc<dyn MappingStore>,
        provisioner: Arc<dyn ChannelProvisioner>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            store,
            provisioner,
            guard: CreationGuard::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Current lifecycle state of a user's ticket.
    pub async fn state_of(&self, user_id: UserId) -> Result<TicketState, TicketError> {
        if self.guard.is_in_flight(user_id) {
            return Ok(TicketState::Creating);
        }
        match self.store.find_channel_for_user(user_id).await? {
            Some(_) => Ok(TicketState::Open),
            None => Ok(TicketState::NoTicket),
        }
    }

    // ========================================================================
    // Platform boundary
    // ========================================================================

    /// Routes a user's direct message, replying to the user on failure.
    pub async fn dispatch_user_message(&self, message: InboundMessage) {
        let user_id = message.user_id;
        match self.on_user_message(message).await {
            Ok(outcome) => {
                tracing::debug!(user_id = %user_id, ?outcome, "Routed user message");
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    error_code = %e.code(),
                    error = %e,
                    "Failed to route user message"
                );
                if let Err(notify_err) = self.provisioner.send_to_user(user_id, &e.notice()).await
                {
                    tracing::warn!(
                        user_id = %user_id,
                        error = %notify_err,
                        "Could not tell user their message failed"
                    );
                }
            }
        }
    }

    /// Parses and routes a guild message, answering in the channel.
    ///
    /// Messages that are not staff commands are ignored.
    pub async fn dispatch_staff_message(&self, message: StaffMessage) {
        let channel_id = message.channel_id;
        let Some(result) = self.on_staff_message(message).await else {
            return;
        };
        match result {
            Ok(outcome) => {
                tracing::debug!(channel_id = %channel_id, ?outcome, "Handled staff command");
            }
            Err(e) => {
                tracing::warn!(
                    channel_id = %channel_id,
                    error_code = %e.code(),
                    error = %e,
                    "Staff command failed"
                );
                self.post_to_channel(channel_id, &e.notice()).await;
            }
        }
    }

    // ========================================================================
    // User messages
    // ========================================================================

    /// Opens a ticket for the user or forwards into the existing one.
    pub async fn on_user_message(
        &self,
        message: InboundMessage,
    ) -> Result<InboundOutcome, TicketError> {
        if let Some(channel_id) = self.store.find_channel_for_user(message.user_id).await? {
            return self.forward(channel_id, &message).await;
        }

        let Some(permit) = self.guard.try_acquire(message.user_id) else {
            tracing::debug!(
                user_id = %message.user_id,
                "Ticket creation already in flight, dropping message"
            );
            return Ok(InboundOutcome::Dropped(DropReason::CreationInFlight));
        };

        // A creation may have completed between the lookup and the acquire.
        if let Some(channel_id) = self.store.find_channel_for_user(message.user_id).await? {
            drop(permit);
            return self.forward(channel_id, &message).await;
        }

        let result = self.open_ticket(&message).await;
        drop(permit);

        let next = match &result {
            Ok(InboundOutcome::Created(_)) => TicketState::Open,
            _ => TicketState::NoTicket,
        };
        debug_assert!(TicketState::Creating.can_transition_to(&next));
        tracing::debug!(
            user_id = %message.user_id,
            from = %TicketState::Creating,
            to = %next,
            "Ticket creation finished"
        );
        result
    }

    async fn open_ticket(&self, message: &InboundMessage) -> Result<InboundOutcome, TicketError> {
        let user_id = message.user_id;
        let name = channel_name_for(&self.settings.channel_prefix, user_id);

        let channel_id = self
            .provisioner
            .create_channel(&name)
            .await
            .map_err(TicketError::Provisioning)?;

        match self.store.create(user_id, channel_id).await {
            Ok(_) => {}
            Err(StoreError::AlreadyExists(_)) => {
                tracing::warn!(
                    user_id = %user_id,
                    channel_id = %channel_id,
                    "Ticket was recorded elsewhere first, removing our channel"
                );
                self.remove_channel(channel_id).await;
                return Ok(InboundOutcome::Dropped(DropReason::LostCreationRace));
            }
            Err(e @ StoreError::ChannelInUse(_)) => {
                tracing::error!(
                    user_id = %user_id,
                    channel_id = %channel_id,
                    "New channel id is already mapped to another ticket, removing our channel"
                );
                self.remove_channel(channel_id).await;
                return Err(e.into());
            }
            Err(e) => {
                // The insert may have committed; never leave a mapping that
                // points at a deleted channel.
                tracing::warn!(
                    user_id = %user_id,
                    channel_id = %channel_id,
                    error = %e,
                    "Could not confirm new ticket, keeping its channel"
                );
                return Err(e.into());
            }
        }

        tracing::info!(user_id = %user_id, channel_id = %channel_id, "Opened ticket");

        let announcement = format!(
            "{}, new request from **{}** (user id {}). Use `{}reply <message>` to answer or `{}close` to close.\n\n{}",
            self.settings.staff_mention,
            message.author_name,
            user_id,
            self.settings.command_prefix,
            self.settings.command_prefix,
            message.content,
        );
        if let Err(e) = self.provisioner.send_to_channel(channel_id, &announcement).await {
            tracing::warn!(
                channel_id = %channel_id,
                error = %e,
                "Ticket opened but first message could not be posted"
            );
        }

        Ok(InboundOutcome::Created(channel_id))
    }

    async fn forward(
        &self,
        channel_id: ChannelId,
        message: &InboundMessage,
    ) -> Result<InboundOutcome, TicketError> {
        let content = format!("**{}:** {}", message.author_name, message.content);
        match self.provisioner.send_to_channel(channel_id, &content).await {
            Ok(()) => Ok(InboundOutcome::Forwarded(channel_id)),
            Err(ProvisionError::ChannelNotFound(_)) => {
                tracing::warn!(
                    user_id = %message.user_id,
                    channel_id = %channel_id,
                    "Ticket channel is gone but mapping remains, dropping message"
                );
                Ok(InboundOutcome::Dropped(DropReason::OrphanedMapping(channel_id)))
            }
            Err(e) => Err(TicketError::Provisioning(e)),
        }
    }

    // ========================================================================
    // Staff commands
    // ========================================================================

    /// Handles a guild message. Returns `None` if it is not a staff command.
    ///
    /// Commands from non-staff members outside the ticket category are
    /// ignored without a reply.
    pub async fn on_staff_message(
        &self,
        message: StaffMessage,
    ) -> Option<Result<StaffOutcome, TicketError>> {
        let parsed = StaffCommand::parse(&message.content, &self.settings.command_prefix)?;
        if !self.in_ticket_category(&message) && !message.has_staff_role {
            tracing::debug!(
                channel_id = %message.channel_id,
                author = %message.author_name,
                "Ignoring command from non-staff member outside ticket category"
            );
            return None;
        }
        Some(self.run_staff_command(&message, parsed).await)
    }

    fn in_ticket_category(&self, message: &StaffMessage) -> bool {
        message.category_id == Some(self.settings.ticket_category)
    }

    async fn run_staff_command(
        &self,
        message: &StaffMessage,
        parsed: Result<StaffCommand, CommandParseError>,
    ) -> Result<StaffOutcome, TicketError> {
        if !self.in_ticket_category(message) {
            return Err(PolicyViolation::OutsideTicketCategory.into());
        }
        if !message.has_staff_role {
            return Err(PolicyViolation::MissingStaffRole.into());
        }
        let command = parsed?;
        tracing::debug!(
            channel_id = %message.channel_id,
            command = command.name(),
            staff = %message.author_name,
            "Running staff command"
        );

        match command {
            StaffCommand::Reply { text } => {
                self.reply(message.channel_id, &message.author_name, &text)
                    .await
            }
            StaffCommand::Close => self.close(message.channel_id).await,
        }
    }

    /// Delivers `text` to the user behind `channel_id`.
    pub async fn reply(
        &self,
        channel_id: ChannelId,
        staff_name: &str,
        text: &str,
    ) -> Result<StaffOutcome, TicketError> {
        let user_id = self
            .store
            .find_user_for_channel(channel_id)
            .await?
            .ok_or(TicketError::NotFound(channel_id))?;

        self.provisioner
            .send_to_user(user_id, text)
            .await
            .map_err(|source| TicketError::Delivery { user_id, source })?;

        self.post_to_channel(
            channel_id,
            &format!(
                "✅ Response sent to user {} (replied by {})",
                user_id, staff_name
            ),
        )
        .await;

        Ok(StaffOutcome::Replied { user_id })
    }

    /// Closes the ticket behind `channel_id` and deletes the channel after
    /// the grace delay.
    ///
    /// The record is deleted before the channel. A failure in between leaves
    /// a channel with no mapping, and the user's next message opens a fresh
    /// ticket.
    pub async fn close(&self, channel_id: ChannelId) -> Result<StaffOutcome, TicketError> {
        let user_id = self
            .store
            .find_user_for_channel(channel_id)
            .await?
            .ok_or(TicketError::NotFound(channel_id))?;

        match self.store.delete(user_id).await {
            Ok(()) => {}
            Err(StoreError::NotFound(_)) => return Err(TicketError::NotFound(channel_id)),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %user_id, channel_id = %channel_id, "Closed ticket");

        if let Err(e) = self
            .provisioner
            .send_to_user(
                user_id,
                "✅ Your ticket has been closed. Send another message to open a new one.",
            )
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Could not notify user about closure");
        }

        self.post_to_channel(
            channel_id,
            &format!(
                "🗑️ Ticket closing in {} seconds...",
                self.settings.close_grace.as_secs()
            ),
        )
        .await;
        tokio::time::sleep(self.settings.close_grace).await;
        self.remove_channel(channel_id).await;

        Ok(StaffOutcome::Closed {
            user_id,
            channel_id,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn post_to_channel(&self, channel_id: ChannelId, content: &str) {
        if let Err(e) = self.provisioner.send_to_channel(channel_id, content).await {
            tracing::warn!(channel_id = %channel_id, error = %e, "Could not post to channel");
        }
    }

    async fn remove_channel(&self, channel_id: ChannelId) {
        match self.provisioner.delete_channel(channel_id).await {
            Ok(()) | Err(ProvisionError::ChannelNotFound(_)) => {}
            Err(e) => {
                tracing::warn!(
                    channel_id = %channel_id,
                    error = %e,
                    "Could not delete ticket channel, it is now orphaned"
                );
            }
        }
    }
}
