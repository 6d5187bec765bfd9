//! PostgreSQL adapters - durable ticket mapping.
//!
//! - `PostgresMappingStore` - `MappingStore` over the `tickets` table
//! - `create_pool` / `run_migrations` - connection setup

mod mapping_store;
mod pool;

pub use mapping_store::PostgresMappingStore;
pub use pool::{create_pool, run_migrations};
