use chrono::Utc;
use seen_store::SeenStore;
use telegram_client::Notifier;
use tracing::info;

use xhs_client::XhsFetcher;
use xhswatch_core::{CoreError, RunContext, RunSummary, WatchConfig};

use crate::dispatch::Dispatcher;
use crate::merge::{merge_batches, truncate_first_run};

/// One complete watch cycle: load state, fetch, merge, dispatch, persist.
/// The seen set is saved on every path that reaches it, including the
/// no-keywords case; only a failing save escapes as an error, and the
/// binary's top-level boundary maps that to a successful exit too.
pub async fn run_once(
    config: &WatchConfig,
    fetcher: &XhsFetcher,
    notifier: &dyn Notifier,
    store: &dyn SeenStore,
) -> Result<RunSummary, CoreError> {
    let snapshot = store.load().await;
    info!("Loaded {} seen ids", snapshot.len());

    if config.keywords.is_empty() {
        info!("No keywords configured; persisting state and finishing");
        store.save(&snapshot).await?;
        return Ok(RunSummary::default());
    }

    let ctx = RunContext::new(
        config.keywords.clone(),
        config.max_per_keyword,
        snapshot.is_empty(),
    );
    if ctx.first_run {
        info!(
            "First run detected (empty seen set); deliveries capped at {}",
            RunContext::FIRST_RUN_LIMIT
        );
    }

    let batches = fetcher.search_keywords(&ctx, Utc::now()).await;
    let fetched: usize = batches.iter().map(Vec::len).sum();

    let merged = merge_batches(batches);
    let merged_count = merged.len();
    let deliverable = truncate_first_run(merged, ctx.first_run, RunContext::FIRST_RUN_LIMIT);
    if deliverable.len() < merged_count {
        info!(
            "First run: truncated {} merged candidates to {}",
            merged_count,
            deliverable.len()
        );
    }

    let mut dispatcher = Dispatcher::new(notifier, &snapshot);
    let report = dispatcher.dispatch(&deliverable, &ctx.keywords).await;
    let updated = dispatcher.into_seen();

    store.save(&updated).await?;

    let summary = RunSummary {
        keywords: ctx.keywords.len(),
        fetched,
        merged: merged_count,
        attempted: report.attempted,
        sent: report.sent,
        sent_fallback: report.sent_fallback,
        failed: report.failed,
        sentinel_sent: report.sentinel_sent,
    };
    info!(
        "Run complete: {} fetched, {} merged, {} attempted, {} sent ({} via fallback), {} failed, sentinel: {}",
        summary.fetched,
        summary.merged,
        summary.attempted,
        summary.newly_sent(),
        summary.sent_fallback,
        summary.failed,
        summary.sentinel_sent
    );
    Ok(summary)
}
