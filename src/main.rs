//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into services, run the bot.
//! No business logic here.

use dotenv::dotenv;
use overlay_bot::adapters::discord::{DiscordGateway, DiscordHandler};
use overlay_bot::adapters::inference::GradioClient;
use overlay_bot::adapters::storage::FsArtifactStore;
use overlay_bot::ports::{ArtifactStore, ChatGateway, CommandHandler, InferencePort};
use overlay_bot::shared::config::AppConfig;
use overlay_bot::usecases::{BotService, SessionTracker, UploadPipeline};
use serenity::all::Http;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    // Logging is configured from the config, so a load error is reported once it is up.
    let (cfg, config_error) = match AppConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let log_path = overlay_bot::shared::logging::init(cfg.log_dir().as_deref())?;
    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found (check CWD)"),
    }
    if let Some(e) = &config_error {
        warn!(error = %e, "failed to load config; using defaults");
    }
    if let Some(path) = &log_path {
        info!(path = %path.display(), "logging to file");
    }

    let Some(token) = cfg.discord_token() else {
        anyhow::bail!("Set DISCORD_TOKEN (env or .env). Get it from the Discord developer portal");
    };
    let Some(space) = cfg.space() else {
        anyhow::bail!("Set HUGGINGFACE_SPACE_NAME (Space id like owner/name, or app URL)");
    };
    let prefix = cfg.command_prefix_or_default();

    // --- Adapters ---
    let http = Arc::new(Http::new(&token));
    let gateway: Arc<dyn ChatGateway> =
        Arc::new(DiscordGateway::new(Arc::clone(&http)).with_remote_token(cfg.hf_token()));

    let temp_dir = cfg.temp_dir_or_default();
    info!(path = %temp_dir.display(), "temporary upload directory");
    let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(&temp_dir));

    let gradio = GradioClient::new(&space, &cfg.api_name_or_default(), cfg.hf_token());
    info!(
        root = %gradio.root(),
        api = %cfg.api_name_or_default(),
        timeout_secs = cfg.inference_timeout().as_secs(),
        "inference app configured"
    );
    let inference: Arc<dyn InferencePort> = Arc::new(gradio);

    // --- Services ---
    let pipeline = Arc::new(UploadPipeline::new(
        Arc::clone(&gateway),
        store,
        inference,
        cfg.inference_timeout(),
        prefix.clone(),
    ));
    let sessions = Arc::new(SessionTracker::new());
    let service: Arc<dyn CommandHandler> =
        Arc::new(BotService::new(pipeline, sessions, gateway, prefix.clone()));

    // --- Run ---
    let handler = DiscordHandler::new(service, prefix, cfg.application_id);
    let mut client = serenity::Client::builder(&token, DiscordHandler::intents())
        .event_handler(handler)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create Discord client: {}", e))?;

    if let Err(e) = client.start().await {
        error!(error = %e, "failed to start the bot");
        return Err(anyhow::anyhow!("failed to start the bot: {}", e));
    }

    Ok(())
}
