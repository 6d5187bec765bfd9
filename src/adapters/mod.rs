//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the ticket core to external systems:
//! - `discord` - Gateway handler and REST channel provisioner
//! - `postgres` - Durable mapping store
//! - `in_memory` - Store and provisioner fakes for development and tests
//! - `timed_store` - Timeout decorator for any mapping store

pub mod discord;
pub mod in_memory;
pub mod postgres;
mod timed_store;

pub use discord::{DiscordHandler, DiscordProvisioner};
pub use in_memory::{InMemoryChannelProvisioner, InMemoryMappingStore};
pub use postgres::PostgresMappingStore;
pub use timed_store::TimedMappingStore;
