//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the ticket core and the outside world. Adapters implement these ports.
//!
//! - `MappingStore` - Durable user ↔ channel ticket mapping
//! - `ChannelProvisioner` - Platform channel lifecycle and message delivery

mod channel_provisioner;
mod mapping_store;

pub use channel_provisioner::{ChannelProvisioner, ProvisionError};
pub use mapping_store::{MappingStore, StoreError};
