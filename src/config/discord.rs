//! Discord platform configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Discord configuration (bot token, guild, ticket category, staff role)
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token
    pub token: SecretString,

    /// The single guild the bot serves
    pub guild_id: u64,

    /// Category that ticket channels are created under
    pub category_id: u64,

    /// Role allowed to run staff commands; mentioned on new tickets
    pub staff_role_id: u64,

    /// Prefix for staff commands
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Ticket channels are named `<channel_prefix>-<user id>`
    #[serde(default = "default_channel_prefix")]
    pub channel_prefix: String,

    /// Presence text shown as "Listening to ..."
    #[serde(default = "default_status_text")]
    pub status_text: String,
}

impl DiscordConfig {
    /// Validate Discord configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("DISCORD__TOKEN"));
        }
        if self.guild_id == 0 {
            return Err(ValidationError::InvalidSnowflake("DISCORD__GUILD_ID"));
        }
        if self.category_id == 0 {
            return Err(ValidationError::InvalidSnowflake("DISCORD__CATEGORY_ID"));
        }
        if self.staff_role_id == 0 {
            return Err(ValidationError::InvalidSnowflake("DISCORD__STAFF_ROLE_ID"));
        }
        if self.command_prefix.is_empty() || self.command_prefix.chars().any(char::is_whitespace)
        {
            return Err(ValidationError::InvalidCommandPrefix);
        }
        let prefix_ok = !self.channel_prefix.is_empty()
            && self.channel_prefix.len() <= 80
            && self
                .channel_prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !prefix_ok {
            return Err(ValidationError::InvalidChannelPrefix);
        }
        Ok(())
    }
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_channel_prefix() -> String {
    "consultation".to_string()
}

fn default_status_text() -> String {
    "your DMs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> DiscordConfig {
        DiscordConfig {
            token: SecretString::new("bot-token".to_string()),
            guild_id: 1,
            category_id: 2,
            staff_role_id: 3,
            command_prefix: default_command_prefix(),
            channel_prefix: default_channel_prefix(),
            status_text: default_status_text(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_token_rejected() {
        let config = DiscordConfig {
            token: SecretString::new("  ".to_string()),
            ..valid_config()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DISCORD__TOKEN"))
        );
    }

    #[test]
    fn test_zero_ids_rejected() {
        let config = DiscordConfig {
            category_id: 0,
            ..valid_config()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidSnowflake("DISCORD__CATEGORY_ID"))
        );
    }

    #[test]
    fn test_command_prefix_rules() {
        let config = DiscordConfig {
            command_prefix: "! ".to_string(),
            ..valid_config()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCommandPrefix));
    }

    #[test]
    fn test_channel_prefix_rules() {
        let config = DiscordConfig {
            channel_prefix: "Tickets!".to_string(),
            ..valid_config()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidChannelPrefix));
    }

    #[test]
    fn test_token_not_in_debug_output() {
        let rendered = format!("{:?}", valid_config());
        assert!(!rendered.contains("bot-token"));
    }
}
