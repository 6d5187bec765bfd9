//! Modmail - Discord ticket relay
//!
//! Members open a private support ticket by messaging the bot directly.
//! Each open ticket is a staff-only channel in the guild; staff answer with
//! prefix commands and the bot relays between the two.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
