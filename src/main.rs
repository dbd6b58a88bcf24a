use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use hbr_relay::bot::Handler;
use hbr_relay::config::Settings;
use hbr_relay::thehax::{Session, Uploader};
use serenity::prelude::{Client, GatewayIntents};
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Local diagnostics file; full status codes and body snippets land here,
/// never in chat.
const DEBUG_LOG_FILE: &str = "debug.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("Starting hbr-relay...");

    let settings = init_settings();

    let session = Arc::new(Session::new(settings.credentials())?);
    if settings.credentials().is_some() {
        info!("TheHax login enabled.");
    } else {
        info!("No TheHax credentials configured; uploading as guest.");
    }
    let uploader = Uploader::new(session)?;
    let handler = Handler::new(uploader, settings.clone());

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&settings.discord_token, intents)
        .event_handler(handler)
        .await?;

    info!("Bot is running...");
    client.start().await?;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Append-only file sink in addition to stderr; losing it is non-fatal
    let file_layer = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(DEBUG_LOG_FILE)
    {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        ),
        Err(e) => {
            eprintln!("Cannot open {DEBUG_LOG_FILE}, logging to stderr only: {e}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Missing DISCORD_TOKEN? Add your bot token to .env before running.");
            std::process::exit(1);
        }
    }
}
