//! In-memory channel provisioner for development and tests.
//!
//! Records every channel, channel message and direct message so tests can
//! assert on what the platform would have seen. Failures can be injected
//! per operation, and channel creation can be paused to hold a creation
//! in flight.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use crate::domain::foundation::{ChannelId, UserId};
use crate::ports::{ChannelProvisioner, ProvisionError};

const FIRST_CHANNEL_ID: u64 = 900_000_000_000_000_000;

#[derive(Debug, Default)]
struct PlatformState {
    /// Live channels and the messages posted in them.
    channels: HashMap<ChannelId, ChannelRecord>,
    /// Every channel ever created, in order.
    created: Vec<ChannelId>,
    deleted: Vec<ChannelId>,
    direct_messages: Vec<(UserId, String)>,
    unreachable_users: HashSet<UserId>,
}

/// A provisioned channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub name: String,
    pub messages: Vec<String>,
}

/// In-memory channel provisioner.
#[derive(Debug)]
pub struct InMemoryChannelProvisioner {
    state: Mutex<PlatformState>,
    next_id: AtomicU64,
    reject_creates: AtomicBool,
    creations_paused: watch::Sender<bool>,
}

impl InMemoryChannelProvisioner {
    pub fn new() -> Self {
        let (creations_paused, _) = watch::channel(false);
        Self {
            state: Mutex::new(PlatformState::default()),
            next_id: AtomicU64::new(FIRST_CHANNEL_ID),
            reject_creates: AtomicBool::new(false),
            creations_paused,
        }
    }

    // === Failure injection ===

    /// Makes `create_channel` fail with `Rejected` until reset.
    pub fn reject_creates(&self, reject: bool) {
        self.reject_creates.store(reject, Ordering::SeqCst);
    }

    /// Makes direct messages to `user_id` fail with `UserUnreachable`.
    pub fn mark_unreachable(&self, user_id: UserId) {
        self.lock().unreachable_users.insert(user_id);
    }

    /// Holds every `create_channel` call until [`resume_creations`] is called.
    ///
    /// [`resume_creations`]: Self::resume_creations
    pub fn pause_creations(&self) {
        self.creations_paused.send_replace(true);
    }

    pub fn resume_creations(&self) {
        self.creations_paused.send_replace(false);
    }

    /// Deletes a channel behind the router's back.
    pub fn delete_out_of_band(&self, channel_id: ChannelId) {
        self.lock().channels.remove(&channel_id);
    }

    // === Test Helpers ===

    /// Every channel ever created, in creation order.
    pub fn created_channels(&self) -> Vec<ChannelId> {
        self.lock().created.clone()
    }

    pub fn deleted_channels(&self) -> Vec<ChannelId> {
        self.lock().deleted.clone()
    }

    /// A live channel, if it exists.
    pub fn channel(&self, channel_id: ChannelId) -> Option<ChannelRecord> {
        self.lock().channels.get(&channel_id).cloned()
    }

    pub fn channel_exists(&self, channel_id: ChannelId) -> bool {
        self.lock().channels.contains_key(&channel_id)
    }

    /// Messages posted to a live channel.
    pub fn channel_messages(&self, channel_id: ChannelId) -> Vec<String> {
        self.channel(channel_id)
            .map(|c| c.messages)
            .unwrap_or_default()
    }

    /// Direct messages successfully delivered to `user_id`.
    pub fn messages_to(&self, user_id: UserId) -> Vec<String> {
        self.lock()
            .direct_messages
            .iter()
            .filter(|(to, _)| *to == user_id)
            .map(|(_, content)| content.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, PlatformState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryChannelProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelProvisioner for InMemoryChannelProvisioner {
    async fn create_channel(&self, name: &str) -> Result<ChannelId, ProvisionError> {
        let mut paused = self.creations_paused.subscribe();
        paused
            .wait_for(|is_paused| !*is_paused)
            .await
            .map_err(|e| ProvisionError::Transport(e.to_string()))?;

        if self.reject_creates.load(Ordering::SeqCst) {
            return Err(ProvisionError::Rejected("channel creation disabled".to_string()));
        }

        let raw = self.next_id.fetch_add(1, Ordering::SeqCst);
        let channel_id =
            ChannelId::new(raw).map_err(|e| ProvisionError::Rejected(e.to_string()))?;

        let mut state = self.lock();
        state.channels.insert(
            channel_id,
            ChannelRecord {
                name: name.to_string(),
                messages: Vec::new(),
            },
        );
        state.created.push(channel_id);
        Ok(channel_id)
    }

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<(), ProvisionError> {
        let mut state = self.lock();
        state
            .channels
            .remove(&channel_id)
            .ok_or(ProvisionError::ChannelNotFound(channel_id))?;
        state.deleted.push(channel_id);
        Ok(())
    }

    async fn send_to_channel(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), ProvisionError> {
        let mut state = self.lock();
        let channel = state
            .channels
            .get_mut(&channel_id)
            .ok_or(ProvisionError::ChannelNotFound(channel_id))?;
        channel.messages.push(content.to_string());
        Ok(())
    }

    async fn send_to_user(&self, user_id: UserId, content: &str) -> Result<(), ProvisionError> {
        let mut state = self.lock();
        if state.unreachable_users.contains(&user_id) {
            return Err(ProvisionError::UserUnreachable(user_id));
        }
        state.direct_messages.push((user_id, content.to_string()));
        Ok(())
    }
}
