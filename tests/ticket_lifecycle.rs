//! Integration tests for the ticket lifecycle.
//!
//! These tests drive the session router end to end:
//! 1. A user's first direct message opens a ticket channel
//! 2. Staff reply from the channel and the user receives the text
//! 3. Staff close the ticket and the channel is deleted
//! 4. The next message opens a fresh ticket
//!
//! Uses the in-memory store and provisioner so no database or Discord
//! connection is needed.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use modmail::adapters::{InMemoryChannelProvisioner, InMemoryMappingStore, TimedMappingStore};
use modmail::application::{
    DropReason, InboundMessage, InboundOutcome, RouterSettings, SessionRouter, StaffMessage,
    StaffOutcome,
};
use modmail::domain::foundation::{ChannelId, UserId};
use modmail::domain::ticket::{Ticket, TicketError, TicketState};
use modmail::ports::{MappingStore, StoreError};

// =============================================================================
// Test Infrastructure
// =============================================================================

const CATEGORY: u64 = 1_000;

fn settings() -> RouterSettings {
    RouterSettings {
        ticket_category: ChannelId::new(CATEGORY).unwrap(),
        channel_prefix: "consultation".to_string(),
        command_prefix: "!".to_string(),
        staff_mention: "<@&5>".to_string(),
        close_grace: Duration::ZERO,
    }
}

fn router_over(
    store: Arc<InMemoryMappingStore>,
    platform: Arc<InMemoryChannelProvisioner>,
) -> Arc<SessionRouter> {
    Arc::new(SessionRouter::new(store, platform, settings()))
}

fn user(id: u64) -> UserId {
    UserId::new(id).unwrap()
}

fn dm(id: u64, content: &str) -> InboundMessage {
    InboundMessage {
        user_id: user(id),
        author_name: "alice".to_string(),
        content: content.to_string(),
    }
}

fn command(channel_id: ChannelId, content: &str) -> StaffMessage {
    StaffMessage {
        channel_id,
        category_id: Some(ChannelId::new(CATEGORY).unwrap()),
        author_name: "mod".to_string(),
        has_staff_role: true,
        content: content.to_string(),
    }
}

/// Store whose inserts land but whose `create` reply never arrives in time.
struct SlowAckStore(Arc<InMemoryMappingStore>);

#[async_trait]
impl MappingStore for SlowAckStore {
    async fn find_channel_for_user(&self, user_id: UserId) -> Result<Option<ChannelId>, StoreError> {
        self.0.find_channel_for_user(user_id).await
    }

    async fn find_user_for_channel(
        &self,
        channel_id: ChannelId,
    ) -> Result<Option<UserId>, StoreError> {
        self.0.find_user_for_channel(channel_id).await
    }

    async fn create(&self, user_id: UserId, channel_id: ChannelId) -> Result<Ticket, StoreError> {
        self.0.create(user_id, channel_id).await?;
        Err(StoreError::unavailable("create timed out after 5s"))
    }

    async fn delete(&self, user_id: UserId) -> Result<(), StoreError> {
        self.0.delete(user_id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.0.ping().await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn full_ticket_round_trip() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = router_over(store.clone(), platform.clone());

    // Open
    let first = match router.on_user_message(dm(42, "I need help")).await.unwrap() {
        InboundOutcome::Created(id) => id,
        other => panic!("expected ticket creation, got {:?}", other),
    };
    assert_eq!(platform.channel(first).unwrap().name, "consultation-42");
    assert_eq!(store.find_user_for_channel(first).await.unwrap(), Some(user(42)));

    // Reply
    let replied = router
        .on_staff_message(command(first, "!reply Sure, what's up?"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replied, StaffOutcome::Replied { user_id: user(42) });
    assert_eq!(platform.messages_to(user(42)), vec!["Sure, what's up?".to_string()]);

    // Close
    router.dispatch_staff_message(command(first, "!close")).await;
    assert!(!platform.channel_exists(first));
    assert_eq!(store.find_channel_for_user(user(42)).await.unwrap(), None);
    assert_eq!(router.state_of(user(42)).await.unwrap(), TicketState::NoTicket);

    // Reopen
    let second = match router.on_user_message(dm(42, "one more thing")).await.unwrap() {
        InboundOutcome::Created(id) => id,
        other => panic!("expected a new ticket, got {:?}", other),
    };
    assert_ne!(first, second);
    assert_eq!(platform.created_channels(), vec![first, second]);
}

#[tokio::test]
async fn concurrent_first_messages_open_one_ticket() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = router_over(store.clone(), platform.clone());
    platform.pause_creations();

    let first = tokio::spawn({
        let router = router.clone();
        async move { router.on_user_message(dm(42, "hello")).await }
    });
    tokio::task::yield_now().await;
    assert_eq!(router.state_of(user(42)).await.unwrap(), TicketState::Creating);

    let second = router.on_user_message(dm(42, "hello?")).await.unwrap();
    assert_eq!(second, InboundOutcome::Dropped(DropReason::CreationInFlight));

    platform.resume_creations();
    let first = first.await.unwrap().unwrap();

    assert!(matches!(first, InboundOutcome::Created(_)));
    assert_eq!(store.create_calls(), 1);
    assert_eq!(platform.created_channels().len(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn different_users_open_independent_tickets() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = router_over(store.clone(), platform.clone());

    let outcomes = join_all((1..=8).map(|id| router.on_user_message(dm(id, "hi")))).await;

    assert!(outcomes
        .into_iter()
        .all(|o| matches!(o, Ok(InboundOutcome::Created(_)))));
    assert_eq!(store.len(), 8);
    for id in 1..=8 {
        let channel_id = store.find_channel_for_user(user(id)).await.unwrap().unwrap();
        assert_eq!(
            platform.channel(channel_id).unwrap().name,
            format!("consultation-{}", id)
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn burst_from_one_user_opens_one_ticket() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = router_over(store.clone(), platform.clone());
    platform.pause_creations();

    let tasks: Vec<_> = (0..5)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move { router.on_user_message(dm(42, &format!("msg {}", i))).await })
        })
        .collect();

    // Channel creation is held, so every message but one must hit the guard.
    tokio::time::timeout(Duration::from_secs(5), async {
        while tasks.iter().filter(|t| t.is_finished()).count() < 4 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("all but one message should return while creation is held");
    assert_eq!(router.state_of(user(42)).await.unwrap(), TicketState::Creating);

    platform.resume_creations();
    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let created = outcomes
        .iter()
        .filter(|o| matches!(o, InboundOutcome::Created(_)))
        .count();
    let in_flight = outcomes
        .iter()
        .filter(|o| **o == InboundOutcome::Dropped(DropReason::CreationInFlight))
        .count();
    assert_eq!((created, in_flight), (1, 4));
    assert_eq!(store.create_calls(), 1);
    assert_eq!(platform.created_channels().len(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn unconfirmed_ticket_keeps_its_channel() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = SessionRouter::new(
        Arc::new(SlowAckStore(store.clone())),
        platform.clone(),
        settings(),
    );

    router.dispatch_user_message(dm(42, "hello")).await;

    let notices = platform.messages_to(user(42));
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("temporarily unavailable"));

    let created = platform.created_channels();
    assert_eq!(created.len(), 1);
    let channel_id = created[0];
    assert!(platform.channel_exists(channel_id));
    assert!(platform.deleted_channels().is_empty());
    assert_eq!(store.find_user_for_channel(channel_id).await.unwrap(), Some(user(42)));

    // Guard released: the retry is forwarded instead of dropped as in flight.
    assert_eq!(
        router.on_user_message(dm(42, "hello again")).await.unwrap(),
        InboundOutcome::Forwarded(channel_id)
    );
    assert_eq!(
        router.reply(channel_id, "mod", "we got it").await.unwrap(),
        StaffOutcome::Replied { user_id: user(42) }
    );
    assert_eq!(platform.created_channels().len(), 1);
}

#[tokio::test]
async fn second_close_reports_missing_ticket() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = router_over(store, platform.clone());

    let channel_id = match router.on_user_message(dm(42, "hi")).await.unwrap() {
        InboundOutcome::Created(id) => id,
        other => panic!("expected ticket creation, got {:?}", other),
    };
    router.close(channel_id).await.unwrap();

    let err = router.close(channel_id).await.unwrap_err();
    assert!(matches!(err, TicketError::NotFound(id) if id == channel_id));
    assert_eq!(platform.deleted_channels(), vec![channel_id]);
}

#[tokio::test]
async fn reply_in_unmapped_channel_sends_nothing() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = router_over(store, platform.clone());
    let stray = ChannelId::new(31_337).unwrap();

    let err = router
        .on_staff_message(command(stray, "!reply hello"))
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, TicketError::NotFound(_)));
    assert_eq!(
        err.notice(),
        "❌ Error: Could not find the user associated with this ticket."
    );
    assert!(platform.messages_to(user(42)).is_empty());
}

#[tokio::test]
async fn tickets_survive_router_restart() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());

    let channel_id = {
        let router = router_over(store.clone(), platform.clone());
        match router.on_user_message(dm(42, "before restart")).await.unwrap() {
            InboundOutcome::Created(id) => id,
            other => panic!("expected ticket creation, got {:?}", other),
        }
    };

    let restarted = router_over(store.clone(), platform.clone());

    assert_eq!(
        restarted.on_user_message(dm(42, "after restart")).await.unwrap(),
        InboundOutcome::Forwarded(channel_id)
    );
    assert_eq!(
        restarted.reply(channel_id, "mod", "still here").await.unwrap(),
        StaffOutcome::Replied { user_id: user(42) }
    );
    assert_eq!(platform.created_channels().len(), 1);
}

#[tokio::test]
async fn failed_creation_allows_retry() {
    let store = Arc::new(InMemoryMappingStore::new());
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = router_over(store.clone(), platform.clone());

    platform.reject_creates(true);
    router.dispatch_user_message(dm(42, "first try")).await;
    assert_eq!(router.state_of(user(42)).await.unwrap(), TicketState::NoTicket);
    assert_eq!(platform.messages_to(user(42)).len(), 1);

    platform.reject_creates(false);
    assert!(matches!(
        router.on_user_message(dm(42, "second try")).await.unwrap(),
        InboundOutcome::Created(_)
    ));
}

#[tokio::test]
async fn timed_store_composes_with_router() {
    let inner = InMemoryMappingStore::new();
    let store = Arc::new(TimedMappingStore::new(inner, Duration::from_secs(1)));
    let platform = Arc::new(InMemoryChannelProvisioner::new());
    let router = SessionRouter::new(store.clone(), platform.clone(), settings());

    let outcome = router.on_user_message(dm(42, "hello")).await.unwrap();

    let InboundOutcome::Created(channel_id) = outcome else {
        panic!("expected ticket creation, got {:?}", outcome);
    };
    assert_eq!(store.find_user_for_channel(channel_id).await.unwrap(), Some(user(42)));
    assert_eq!(store.inner().len(), 1);
}
