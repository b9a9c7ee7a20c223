use std::time::Duration;

use chrono::{DateTime, Utc};
use renderer_client::{Anchor, PageRequest, RenderedPage, Renderer};
use tracing::{debug, info, warn};
use xhswatch_core::{Candidate, FetchError, RunContext};

use crate::cookies::parse_cookie_string;
use crate::payload::{parse_search_payload, NoteSummary};
use crate::{ANCHOR_SELECTOR, EXPLORE_PREFIX, SEARCH_NOTES_PATTERN, XHS_BASE_URL};

pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);
pub const INTERCEPT_TIMEOUT: Duration = Duration::from_secs(20);

/// Per-run fetch parameters that are not part of the run context.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub cookie: Option<String>,
    pub user_agent: String,
    pub headless: bool,
}

/// Drives the rendering service through keyword searches and normalizes the
/// captured payloads into candidates. All platform knowledge (URLs,
/// selectors, payload shape) lives here.
pub struct XhsFetcher {
    renderer: Box<dyn Renderer>,
    settings: FetchSettings,
}

impl XhsFetcher {
    pub fn new(renderer: Box<dyn Renderer>, settings: FetchSettings) -> Self {
        Self { renderer, settings }
    }

    /// Search URL for one keyword, percent-encoded into the query string.
    pub fn search_url(keyword: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
        format!("{XHS_BASE_URL}/search_result?keyword={encoded}")
    }

    /// Fetch every keyword sequentially. One batch per keyword, in keyword
    /// order; a failed keyword contributes an empty batch and never aborts
    /// the others.
    pub async fn search_keywords(
        &self,
        ctx: &RunContext,
        now: DateTime<Utc>,
    ) -> Vec<Vec<Candidate>> {
        let mut batches = Vec::with_capacity(ctx.keywords.len());
        let mut total = 0usize;

        for keyword in &ctx.keywords {
            if total >= ctx.max_total {
                info!(
                    "Global candidate cap {} reached; skipping keyword '{}'",
                    ctx.max_total, keyword
                );
                batches.push(Vec::new());
                continue;
            }

            let budget = ctx.max_per_keyword.min(ctx.max_total - total);
            match self.search_keyword(keyword, now, ctx, budget).await {
                Ok(candidates) => {
                    info!(
                        "Keyword '{}' yielded {} eligible candidates",
                        keyword,
                        candidates.len()
                    );
                    total += candidates.len();
                    batches.push(candidates);
                }
                Err(error) if error.is_timeout() => {
                    warn!("Timed out while fetching keyword '{}': {}", keyword, error);
                    batches.push(Vec::new());
                }
                Err(error) => {
                    warn!("Failed to fetch keyword '{}': {}", keyword, error);
                    batches.push(Vec::new());
                }
            }
        }

        batches
    }

    async fn search_keyword(
        &self,
        keyword: &str,
        now: DateTime<Utc>,
        ctx: &RunContext,
        budget: usize,
    ) -> Result<Vec<Candidate>, FetchError> {
        let url = Self::search_url(keyword);
        debug!("Fetching keyword '{}' via {}", keyword, url);

        let page: RenderedPage = self.renderer.render(&self.page_request(url)).await?;
        log_anchor_signal(keyword, &page.anchors);

        let Some(raw_payload) = page.payload else {
            info!(
                "No search payload captured for keyword '{}'; \
                 DOM anchors alone cannot be verified as recent",
                keyword
            );
            return Ok(Vec::new());
        };

        let notes = match parse_search_payload(&raw_payload) {
            Ok(notes) => notes,
            Err(error) => {
                warn!(
                    "Malformed search payload for keyword '{}': {}",
                    keyword, error
                );
                return Ok(Vec::new());
            }
        };

        let mut candidates = Vec::new();
        for note in notes {
            if candidates.len() >= budget {
                debug!("Candidate cap reached for keyword '{}'", keyword);
                break;
            }

            let Some(published_at) = note.published_at else {
                debug!(
                    "Dropping note {} for keyword '{}': no usable timestamp",
                    note.id, keyword
                );
                continue;
            };

            if now.signed_duration_since(published_at) > ctx.recency_window {
                debug!(
                    "Dropping note {} for keyword '{}': published {} is outside the recency window",
                    note.id, keyword, published_at
                );
                continue;
            }

            candidates.push(candidate_from(note, published_at));
        }

        Ok(candidates)
    }

    fn page_request(&self, url: String) -> PageRequest {
        PageRequest {
            url,
            wait_selector: Some(ANCHOR_SELECTOR.to_string()),
            anchor_selector: ANCHOR_SELECTOR.to_string(),
            intercept_pattern: SEARCH_NOTES_PATTERN.to_string(),
            navigation_timeout: NAVIGATION_TIMEOUT,
            intercept_timeout: INTERCEPT_TIMEOUT,
            cookies: self
                .settings
                .cookie
                .as_deref()
                .map(parse_cookie_string)
                .unwrap_or_default(),
            user_agent: Some(self.settings.user_agent.clone()),
            headless: self.settings.headless,
        }
    }
}

/// Note id from an item anchor: final path segment, query string stripped.
pub fn anchor_note_id(href: &str) -> Option<&str> {
    if !href.starts_with(EXPLORE_PREFIX) {
        return None;
    }
    let without_query = href.split('?').next()?;
    let id = without_query.rsplit('/').next()?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

// DOM anchors are an existence signal only. Their publication time cannot be
// verified, so they are logged and never enter the candidate set.
fn log_anchor_signal(keyword: &str, anchors: &[Anchor]) {
    let with_ids = anchors
        .iter()
        .filter(|anchor| anchor_note_id(&anchor.href).is_some())
        .count();
    debug!(
        "Found {} anchors ({} with note ids) for keyword '{}'",
        anchors.len(),
        with_ids,
        keyword
    );
}

fn candidate_from(note: NoteSummary, published_at: DateTime<Utc>) -> Candidate {
    let title = note
        .title
        .unwrap_or_else(|| Candidate::placeholder_title(&note.id));
    Candidate {
        url: format!("{XHS_BASE_URL}{EXPLORE_PREFIX}{}", note.id),
        title,
        description: note.description,
        cover_url: note.cover_url,
        author: note.author,
        published_at: Some(published_at),
        id: note.id,
    }
}
