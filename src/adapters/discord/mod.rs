//! Discord adapters - gateway handler and REST provisioner.

mod handler;
mod provisioner;

pub use handler::{staff_mention, DiscordHandler};
pub use provisioner::DiscordProvisioner;
