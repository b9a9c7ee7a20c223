use seen_store::SeenSet;
use telegram_client::Notifier;
use tracing::{debug, info, warn};

use xhswatch_core::{Candidate, NotifyError};

use crate::compose::{compose_message, sentinel_message};

/// Terminal state of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// First attempt succeeded (photo when a cover exists, text otherwise).
    Sent,
    /// Photo failed, text-only fallback succeeded.
    SentFallback,
    /// Every attempt failed; the candidate stays unseen for a future run.
    Failed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub attempted: usize,
    pub sent: usize,
    pub sent_fallback: usize,
    pub failed: usize,
    pub sentinel_sent: bool,
}

impl DispatchReport {
    pub fn newly_sent(&self) -> usize {
        self.sent + self.sent_fallback
    }
}

/// The one stateful pipeline component: owns the working seen-set copy and
/// moves ids into it only after a successful delivery.
pub struct Dispatcher<'a> {
    notifier: &'a dyn Notifier,
    seen: SeenSet,
}

impl<'a> Dispatcher<'a> {
    pub fn new(notifier: &'a dyn Notifier, snapshot: &SeenSet) -> Self {
        Self {
            notifier,
            seen: snapshot.clone(),
        }
    }

    /// Deliver every not-yet-seen candidate in merged order, then the
    /// sentinel when nothing new went out.
    pub async fn dispatch(
        &mut self,
        candidates: &[Candidate],
        keywords: &[String],
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for candidate in candidates {
            if self.seen.contains(&candidate.id) {
                debug!("Skipping already-notified post {}", candidate.id);
                continue;
            }

            report.attempted += 1;
            match self.deliver(candidate).await {
                DeliveryOutcome::Sent => {
                    report.sent += 1;
                    self.seen.insert(candidate.id.clone());
                }
                DeliveryOutcome::SentFallback => {
                    report.sent_fallback += 1;
                    self.seen.insert(candidate.id.clone());
                }
                DeliveryOutcome::Failed => {
                    report.failed += 1;
                }
            }
        }

        if report.newly_sent() == 0 {
            report.sentinel_sent = self.send_sentinel(keywords).await;
        }

        report
    }

    /// Working seen set after dispatch: snapshot ∪ newly delivered ids.
    pub fn into_seen(self) -> SeenSet {
        self.seen
    }

    async fn deliver(&self, candidate: &Candidate) -> DeliveryOutcome {
        let message = compose_message(candidate);
        info!("Attempting to send post {}: {}", candidate.id, candidate.url);

        if let Some(cover_url) = candidate.cover_url.as_deref() {
            match self.notifier.send_photo(cover_url, &message).await {
                Ok(()) => return DeliveryOutcome::Sent,
                Err(error) => {
                    log_send_failure("photo", &candidate.id, &error);
                }
            }

            // Exactly one retry: plain text, no image.
            return match self.notifier.send_text(&message).await {
                Ok(()) => DeliveryOutcome::SentFallback,
                Err(error) => {
                    log_send_failure("text fallback", &candidate.id, &error);
                    DeliveryOutcome::Failed
                }
            };
        }

        match self.notifier.send_text(&message).await {
            Ok(()) => DeliveryOutcome::Sent,
            Err(error) => {
                log_send_failure("text", &candidate.id, &error);
                DeliveryOutcome::Failed
            }
        }
    }

    async fn send_sentinel(&self, keywords: &[String]) -> bool {
        match self.notifier.send_text(&sentinel_message(keywords)).await {
            Ok(()) => {
                info!("Sentinel notification sent: nothing new this run");
                true
            }
            Err(error) if error.is_dry_run() => {
                info!("Dry-run: sentinel notification suppressed");
                false
            }
            Err(error) => {
                warn!("Failed to send sentinel notification: {error}");
                false
            }
        }
    }
}

fn log_send_failure(kind: &str, id: &str, error: &NotifyError) {
    if error.is_dry_run() {
        info!("Dry-run: {kind} delivery suppressed for post {id}");
    } else {
        warn!("Failed to send {kind} notification for post {id}: {error}");
    }
}
