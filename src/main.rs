use anyhow::Context;
use seen_store::{JsonFileStore, SeenStore};
use telegram_client::{DryRunNotifier, Notifier, TelegramClient};
use xhs_client::{FetchSettings, XhsFetcher};
use xhswatch_core::{RunSummary, WatchConfig};

use renderer_client::BrowserlessRenderer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "xhswatch=info,watch_service=info,xhs_client=info,\
                     renderer_client=info,telegram_client=info,seen_store=info",
                )
            }),
        )
        .init();

    tracing::info!("Starting xhswatch - Xiaohongshu keyword watcher");

    // Best-effort monitoring job: the scheduler must never see a failure,
    // and the state file must exist after every invocation.
    match try_run().await {
        Ok(summary) => {
            tracing::info!(
                "Finished: {} new notifications ({} attempted, {} failed, sentinel: {})",
                summary.newly_sent(),
                summary.attempted,
                summary.failed,
                summary.sentinel_sent
            );
        }
        Err(error) => {
            tracing::error!("Run failed: {error:#}");
            ensure_state_file().await;
        }
    }
}

async fn try_run() -> anyhow::Result<RunSummary> {
    let config = WatchConfig::from_env().context("invalid environment configuration")?;
    tracing::info!(
        "Loaded {} keywords; headless: {}; cookie provided: {}",
        config.keywords.len(),
        config.headless,
        if config.cookie.is_some() { "yes" } else { "no" }
    );

    let renderer = BrowserlessRenderer::new(&config.render_url, config.render_token.as_deref());
    let fetcher = XhsFetcher::new(
        Box::new(renderer),
        FetchSettings {
            cookie: config.cookie.clone(),
            user_agent: config.user_agent.clone(),
            headless: config.headless,
        },
    );

    let notifier: Box<dyn Notifier> = match (config.effective_dry_run(), config.credentials()) {
        (false, Some((bot_token, chat_id))) => Box::new(TelegramClient::new(bot_token, chat_id)),
        (_, credentials) => {
            if credentials.is_none() {
                tracing::warn!("TG_BOT_TOKEN or TG_CHAT_ID missing; running dry");
            } else {
                tracing::info!("DRY_RUN set; deliveries suppressed");
            }
            Box::new(DryRunNotifier)
        }
    };

    let store = JsonFileStore::new(config.seen_file.clone());
    let summary = watch_service::run_once(&config, &fetcher, notifier.as_ref(), &store)
        .await
        .context("watch run failed")?;

    Ok(summary)
}

/// Post-condition of every invocation, even a failed one: the persisted
/// seen-set artifact exists. Configuration may itself be the failure, so
/// fall back to the default path.
async fn ensure_state_file() {
    let path = WatchConfig::from_env()
        .map(|config| config.seen_file)
        .unwrap_or_else(|_| xhswatch_core::config::DEFAULT_SEEN_FILE.into());

    let store = JsonFileStore::new(path);
    if let Err(error) = store.ensure_exists().await {
        tracing::error!("Could not guarantee state file exists: {error}");
    }
}
