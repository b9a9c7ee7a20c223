use chrono::{DateTime, Duration, Utc};

/// One discovered note, normalized from the platform's search payload.
/// `id` is the dedup key across the whole run and across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub author: Option<String>,
    /// Publication time. Candidates without one are never delivered:
    /// recency cannot be verified for them.
    pub published_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Display title for notes the platform returned without one.
    pub fn placeholder_title(id: &str) -> String {
        format!("XHS post {id}")
    }
}

/// Ephemeral per-run parameters. Everything here is rebuilt each run; only
/// the seen set survives across runs.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub keywords: Vec<String>,
    pub recency_window: Duration,
    pub max_per_keyword: usize,
    pub max_total: usize,
    /// True iff the loaded seen-set snapshot was empty.
    pub first_run: bool,
}

impl RunContext {
    pub const RECENCY_DAYS: i64 = 14;
    pub const FIRST_RUN_LIMIT: usize = 10;

    pub fn new(keywords: Vec<String>, max_per_keyword: usize, first_run: bool) -> Self {
        let max_total = max_per_keyword * keywords.len();
        Self {
            keywords,
            recency_window: Duration::days(Self::RECENCY_DAYS),
            max_per_keyword,
            max_total,
            first_run,
        }
    }
}

/// Per-run bookkeeping, logged once at the end of every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub keywords: usize,
    pub fetched: usize,
    pub merged: usize,
    pub attempted: usize,
    pub sent: usize,
    pub sent_fallback: usize,
    pub failed: usize,
    pub sentinel_sent: bool,
}

impl RunSummary {
    pub fn newly_sent(&self) -> usize {
        self.sent + self.sent_fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_title() {
        assert_eq!(Candidate::placeholder_title("abc123"), "XHS post abc123");
    }

    #[test]
    fn test_run_context_global_cap() {
        let ctx = RunContext::new(vec!["a".into(), "b".into(), "c".into()], 20, false);
        assert_eq!(ctx.max_total, 60);
        assert_eq!(ctx.recency_window, Duration::days(14));
    }

    #[test]
    fn test_run_summary_newly_sent_counts_both_paths() {
        let summary = RunSummary {
            sent: 2,
            sent_fallback: 1,
            ..Default::default()
        };
        assert_eq!(summary.newly_sent(), 3);
    }
}
