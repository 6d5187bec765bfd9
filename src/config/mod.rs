//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MODMAIL` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use modmail::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Serving guild {}", config.discord.guild_id);
//! ```

mod database;
mod discord;
mod error;
mod logging;
mod tickets;

pub use database::DatabaseConfig;
pub use discord::DiscordConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use tickets::TicketConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Discord configuration (token, guild, category, staff role)
    pub discord: DiscordConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Ticket lifecycle tuning
    #[serde(default)]
    pub tickets: TicketConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MODMAIL` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MODMAIL__DISCORD__TOKEN=...` -> `discord.token = ...`
    /// - `MODMAIL__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MODMAIL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.discord.validate()?;
        self.database.validate()?;
        self.tickets.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_minimal_env() {
        env::set_var("MODMAIL__DISCORD__TOKEN", "test-token");
        env::set_var("MODMAIL__DISCORD__GUILD_ID", "111111111111111111");
        env::set_var("MODMAIL__DISCORD__CATEGORY_ID", "222222222222222222");
        env::set_var("MODMAIL__DISCORD__STAFF_ROLE_ID", "333333333333333333");
        env::set_var("MODMAIL__DATABASE__URL", "postgresql://test@localhost/modmail");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for key in [
            "MODMAIL__DISCORD__TOKEN",
            "MODMAIL__DISCORD__GUILD_ID",
            "MODMAIL__DISCORD__CATEGORY_ID",
            "MODMAIL__DISCORD__STAFF_ROLE_ID",
            "MODMAIL__DISCORD__COMMAND_PREFIX",
            "MODMAIL__DATABASE__URL",
            "MODMAIL__TICKETS__CLOSE_GRACE_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.discord.guild_id, 111111111111111111);
        assert_eq!(config.discord.staff_role_id, 333333333333333333);
        assert_eq!(
            config.database.url.expose_secret(),
            "postgresql://test@localhost/modmail"
        );
        assert_eq!(config.database.pool_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_applied() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.discord.command_prefix, "!");
        assert_eq!(config.discord.channel_prefix, "consultation");
        assert_eq!(config.tickets.close_grace(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_applied() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("MODMAIL__DISCORD__COMMAND_PREFIX", "?");
        env::set_var("MODMAIL__TICKETS__CLOSE_GRACE_SECS", "10");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.discord.command_prefix, "?");
        assert_eq!(config.tickets.close_grace_secs, 10);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("MODMAIL__DISCORD__TOKEN");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
