use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use xhswatch_core::PayloadError;

// Wire shape of the intercepted search-notes response. Every field is
// optional: the platform omits and reshuffles fields freely, and a missing
// field must become well-defined absence, not a parse failure.

#[derive(Debug, Clone, Deserialize)]
struct SearchNotesPayload {
    #[serde(default)]
    data: Option<SearchNotesData>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchNotesData {
    #[serde(default)]
    items: Vec<SearchNoteItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchNoteItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    note_card: Option<NoteCard>,
}

#[derive(Debug, Clone, Deserialize)]
struct NoteCard {
    #[serde(default)]
    display_title: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    time: Option<Value>,
    #[serde(default)]
    cover: Option<NoteCover>,
    #[serde(default)]
    user: Option<NoteUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct NoteCover {
    #[serde(default)]
    url_default: Option<String>,
    #[serde(default)]
    url_pre: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct NoteUser {
    #[serde(default)]
    nickname: Option<String>,
}

/// Validated view of one payload item, ready for normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Extract note summaries from a captured search payload. Non-note items
/// (query suggestions and the like) and items without a usable id are
/// skipped; a structurally alien payload is an error.
pub fn parse_search_payload(payload: &Value) -> Result<Vec<NoteSummary>, PayloadError> {
    let parsed: SearchNotesPayload = serde_json::from_value(payload.clone())?;
    let data = parsed.data.ok_or_else(|| PayloadError::MissingItems {
        detail: "payload has no data object".to_string(),
    })?;

    Ok(data.items.into_iter().filter_map(note_summary).collect())
}

fn note_summary(item: SearchNoteItem) -> Option<NoteSummary> {
    if let Some(model_type) = item.model_type.as_deref() {
        if model_type != "note" {
            return None;
        }
    }

    let id = item.id.filter(|id| !id.trim().is_empty())?;
    let card = item.note_card?;

    let cover_url = card
        .cover
        .and_then(|cover| cover.url_default.or(cover.url_pre))
        .filter(|url| !url.is_empty());

    Some(NoteSummary {
        id,
        title: card.display_title.filter(|t| !t.trim().is_empty()),
        description: card.desc.filter(|d| !d.trim().is_empty()),
        cover_url,
        author: card
            .user
            .and_then(|user| user.nickname)
            .filter(|n| !n.trim().is_empty()),
        published_at: card.time.as_ref().and_then(parse_timestamp),
    })
}

/// Best-effort timestamp extraction from the platform's raw `time` field.
/// Accepts a numeric epoch (milliseconds when the magnitude exceeds 1e12,
/// seconds otherwise), a numeric string, or an ISO-8601 string with offset
/// (a trailing `Z` means UTC). Anything else is "no timestamp".
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(number) => epoch_to_utc(number.as_f64()?),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            if let Ok(number) = text.parse::<f64>() {
                return epoch_to_utc(number);
            }
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn epoch_to_utc(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let seconds = if value.abs() > 1.0e12 {
        value / 1000.0
    } else {
        value
    };
    Utc.timestamp_opt(seconds as i64, 0).single()
}
