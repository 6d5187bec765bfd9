//! In-memory mapping store for development and tests.
//!
//! Keeps both directions of the mapping in one lock so they can never
//! disagree, and enforces the same uniqueness rules as the Postgres schema.
//! Contents are lost with the process; share one instance behind an `Arc`
//! to simulate a restart of everything else.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{ChannelId, UserId};
use crate::domain::ticket::Ticket;
use crate::ports::{MappingStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    by_user: HashMap<UserId, Ticket>,
    by_channel: HashMap<ChannelId, UserId>,
}

/// In-memory mapping store.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryMappingStore::new());
/// store.create(user, channel).await?;
/// assert_eq!(store.find_user_for_channel(channel).await?, Some(user));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    create_calls: AtomicUsize,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of open tickets.
    pub fn len(&self) -> usize {
        self.read().map(|t| t.by_user.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `create` calls received, successful or not.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("in-memory store marked unavailable"));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::unavailable("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::unavailable("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn find_channel_for_user(&self, user_id: UserId) -> Result<Option<ChannelId>, StoreError> {
        self.check_available()?;
        Ok(self.read()?.by_user.get(&user_id).map(Ticket::channel_id))
    }

    async fn find_user_for_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<UserId>, StoreError> {
        self.check_available()?;
        Ok(self.read()?.by_channel.get(&channel_id).copied())
    }

    async fn create(&self, user_id: UserId, channel_id: ChannelId) -> Result<Ticket, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut tables = self.write()?;
        if tables.by_user.contains_key(&user_id) {
            return Err(StoreError::AlreadyExists(user_id));
        }
        if tables.by_channel.contains_key(&channel_id) {
            return Err(StoreError::ChannelInUse(channel_id));
        }
        let ticket = Ticket::new(user_id, channel_id);
        tables.by_user.insert(user_id, ticket.clone());
        tables.by_channel.insert(channel_id, user_id);
        Ok(ticket)
    }

    async fn delete(&self, user_id: UserId) -> Result<(), StoreError> {
        self.check_available()?;

        let mut tables = self.write()?;
        let ticket = tables
            .by_user
            .remove(&user_id)
            .ok_or(StoreError::NotFound(user_id))?;
        tables.by_channel.remove(&ticket.channel_id());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
