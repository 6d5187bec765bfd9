//! Timeout decorator for any [`MappingStore`].
//!
//! No store call may suspend the router indefinitely. Wrapping the real
//! store bounds every call; an expired call is reported as
//! `StoreError::Unavailable` and the underlying future is dropped.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::domain::foundation::{ChannelId, UserId};
use crate::domain::ticket::Ticket;
use crate::ports::{MappingStore, StoreError};

/// Bounds every call to the inner store by `timeout`.
#[derive(Debug, Clone)]
pub struct TimedMappingStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: MappingStore> TimedMappingStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T: Send>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Mapping store call timed out"
                );
                Err(StoreError::unavailable(format!(
                    "{} timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl<S: MappingStore> MappingStore for TimedMappingStore<S> {
    async fn find_channel_for_user(&self, user_id: UserId) -> Result<Option<ChannelId>, StoreError> {
        self.bounded(
            "find_channel_for_user",
            self.inner.find_channel_for_user(user_id),
        )
        .await
    }

    async fn find_user_for_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<UserId>, StoreError> {
        self.bounded(
            "find_user_for_channel",
            self.inner.find_user_for_channel(channel_id),
        )
        .await
    }

    async fn create(&self, user_id: UserId, channel_id: ChannelId) -> Result<Ticket, StoreError> {
        self.bounded("create", self.inner.create(user_id, channel_id))
            .await
    }

    async fn delete(&self, user_id: UserId) -> Result<(), StoreError> {
        self.bounded("delete", self.inner.delete(user_id)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", self.inner.ping()).await
    }
}
