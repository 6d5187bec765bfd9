//! modmail - Discord ticket relay bot.
//!
//! Configuration comes from `MODMAIL__*` environment variables (see
//! [`modmail::config`]). Startup fails fast on invalid configuration or an
//! unreachable database.

use anyhow::Context as _;
use secrecy::ExposeSecret;
use serenity::http::Http;
use serenity::prelude::*;
use std::sync::Arc;

use modmail::adapters::discord::staff_mention;
use modmail::adapters::postgres::{create_pool, run_migrations};
use modmail::adapters::{
    DiscordHandler, DiscordProvisioner, PostgresMappingStore, TimedMappingStore,
};
use modmail::application::{RouterSettings, SessionRouter};
use modmail::config::{AppConfig, LoggingConfig};
use modmail::domain::foundation::ChannelId;
use modmail::ports::MappingStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    init_tracing(&config.logging);
    tracing::info!(
        guild_id = config.discord.guild_id,
        category_id = config.discord.category_id,
        "Starting modmail"
    );

    let pool = create_pool(&config.database, config.tickets.store_timeout())
        .await
        .context("failed to connect to database")?;
    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let store = TimedMappingStore::new(
        PostgresMappingStore::new(pool),
        config.tickets.store_timeout(),
    );
    store.ping().await.context("mapping store unreachable")?;

    let token = config.discord.token.expose_secret();
    let http = Arc::new(Http::new(token));
    let provisioner = DiscordProvisioner::new(
        http,
        config.discord.guild_id,
        config.discord.category_id,
    );

    let settings = RouterSettings {
        ticket_category: ChannelId::new(config.discord.category_id)?,
        channel_prefix: config.discord.channel_prefix.clone(),
        command_prefix: config.discord.command_prefix.clone(),
        staff_mention: staff_mention(config.discord.staff_role_id),
        close_grace: config.tickets.close_grace(),
    };
    let router = Arc::new(SessionRouter::new(
        Arc::new(store),
        Arc::new(provisioner),
        settings,
    ));

    let handler = DiscordHandler::new(
        router,
        config.discord.guild_id,
        config.discord.staff_role_id,
        config.discord.status_text.clone(),
    );

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(handler)
        .await
        .context("failed to build Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received, closing gateway connection");
        shard_manager.shutdown_all().await;
    });

    client.start().await.context("Discord client stopped")?;
    tracing::info!("modmail stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(logging.env_filter())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(logging.env_filter())
            .init();
    }
}
