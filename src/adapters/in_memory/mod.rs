//! In-memory adapters for development and testing.
//!
//! Not suitable for production: nothing survives the process.

mod channel_provisioner;
mod mapping_store;

pub use channel_provisioner::{ChannelRecord, InMemoryChannelProvisioner};
pub use mapping_store::InMemoryMappingStore;
