use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use renderer_client::{PageRequest, RenderedPage, Renderer};
use telegram_client::Notifier;
use xhswatch_core::{Candidate, FetchError, NotifyError};

pub(crate) fn candidate(id: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: format!("title {id}"),
        url: format!("https://www.xiaohongshu.com/explore/{id}"),
        description: None,
        cover_url: None,
        author: None,
        published_at: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
    }
}

/// Notifier fake. Sends fail when the photo URL or message text contains a
/// configured marker; everything else is recorded as delivered.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub fail_photo_markers: Vec<String>,
    pub fail_text_markers: Vec<String>,
    pub texts: Mutex<Vec<String>>,
    pub photos: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn failing_photos(markers: &[&str]) -> Self {
        Self {
            fail_photo_markers: markers.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn sent_photos(&self) -> Vec<(String, String)> {
        self.photos.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        if self
            .fail_text_markers
            .iter()
            .any(|marker| text.contains(marker.as_str()))
        {
            return Err(NotifyError::Api {
                status: 500,
                body: "text send failed".to_string(),
            });
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<(), NotifyError> {
        if self
            .fail_photo_markers
            .iter()
            .any(|marker| photo_url.contains(marker.as_str()) || caption.contains(marker.as_str()))
        {
            return Err(NotifyError::Api {
                status: 500,
                body: "photo send failed".to_string(),
            });
        }
        self.photos
            .lock()
            .unwrap()
            .push((photo_url.to_string(), caption.to_string()));
        Ok(())
    }
}

pub(crate) struct FakeRenderer {
    responses: Mutex<VecDeque<Result<RenderedPage, FetchError>>>,
}

impl FakeRenderer {
    pub fn new(responses: Vec<Result<RenderedPage, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, _request: &PageRequest) -> Result<RenderedPage, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RenderedPage::default()))
    }
}

/// Search payload with one note per `(id, published_epoch_seconds)` pair.
pub(crate) fn notes_payload(notes: &[(&str, i64)]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = notes
        .iter()
        .map(|(id, epoch)| {
            serde_json::json!({
                "id": id,
                "model_type": "note",
                "note_card": {
                    "display_title": format!("title {id}"),
                    "time": epoch,
                },
            })
        })
        .collect();
    serde_json::json!({ "data": { "items": items } })
}

pub(crate) fn page_with(payload: serde_json::Value) -> RenderedPage {
    RenderedPage {
        anchors: Vec::new(),
        payload: Some(payload),
    }
}
