use xhswatch_core::{Candidate, RunContext};

/// Character budget for the description line.
pub const DESCRIPTION_LIMIT: usize = 220;

const FOOTER_HINT: &str = "在 Telegram 中打开链接即可跳转到小红书查看原帖";

/// Notification body for one candidate: non-empty lines in a fixed order,
/// with absent optional fields omitting their line entirely.
pub fn compose_message(candidate: &Candidate) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(6);

    lines.push(candidate.title.clone());

    if let Some(description) = candidate.description.as_deref() {
        let compacted = compact(description);
        if !compacted.is_empty() {
            lines.push(truncate(&compacted, DESCRIPTION_LIMIT));
        }
    }

    if let Some(author) = candidate.author.as_deref() {
        lines.push(format!("Author: {author}"));
    }

    if let Some(published_at) = candidate.published_at {
        lines.push(format!(
            "发布时间 (UTC): {}",
            published_at.format("%Y-%m-%d %H:%M")
        ));
    }

    lines.push(candidate.url.clone());
    lines.push(FOOTER_HINT.to_string());

    lines.join("\n")
}

/// The "nothing new" heartbeat sent when a run delivers no candidates.
pub fn sentinel_message(keywords: &[String]) -> String {
    if keywords.is_empty() {
        "XHS watch: no new posts matched the filters this run".to_string()
    } else {
        format!(
            "XHS watch: no new posts for [{}] in the last {} days",
            keywords.join(", "),
            RunContext::RECENCY_DAYS
        )
    }
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::candidate;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_full_candidate_renders_all_lines_in_order() {
        let mut full = candidate("abc");
        full.description = Some("  a   description\nwith   noise  ".to_string());
        full.author = Some("alice".to_string());
        full.published_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap());

        let message = compose_message(&full);
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(
            lines,
            vec![
                "title abc",
                "a description with noise",
                "Author: alice",
                "发布时间 (UTC): 2024-05-01 10:30",
                "https://www.xiaohongshu.com/explore/abc",
                "在 Telegram 中打开链接即可跳转到小红书查看原帖",
            ]
        );
    }

    #[test]
    fn test_absent_fields_omit_their_lines() {
        let mut minimal = candidate("abc");
        minimal.published_at = None;

        let message = compose_message(&minimal);
        let lines: Vec<&str> = message.lines().collect();
        assert_eq!(
            lines,
            vec![
                "title abc",
                "https://www.xiaohongshu.com/explore/abc",
                "在 Telegram 中打开链接即可跳转到小红书查看原帖",
            ]
        );
    }

    #[test]
    fn test_long_description_is_truncated_with_ellipsis() {
        let mut noisy = candidate("abc");
        noisy.description = Some("x".repeat(300));

        let message = compose_message(&noisy);
        let description_line = message.lines().nth(1).unwrap();
        assert_eq!(description_line.chars().count(), DESCRIPTION_LIMIT + 1);
        assert!(description_line.ends_with('…'));
    }

    #[test]
    fn test_truncation_is_char_boundary_safe() {
        let mut noisy = candidate("abc");
        noisy.description = Some("红".repeat(300));

        let message = compose_message(&noisy);
        let description_line = message.lines().nth(1).unwrap();
        assert_eq!(description_line.chars().count(), DESCRIPTION_LIMIT + 1);
    }

    #[test]
    fn test_description_at_limit_is_untouched() {
        let mut exact = candidate("abc");
        exact.description = Some("y".repeat(DESCRIPTION_LIMIT));

        let message = compose_message(&exact);
        let description_line = message.lines().nth(1).unwrap();
        assert_eq!(description_line.chars().count(), DESCRIPTION_LIMIT);
        assert!(!description_line.contains('…'));
    }

    #[test]
    fn test_whitespace_only_description_is_omitted() {
        let mut blank = candidate("abc");
        blank.description = Some(" \n\t ".to_string());
        blank.published_at = None;

        let message = compose_message(&blank);
        assert_eq!(message.lines().count(), 3);
    }

    #[test]
    fn test_sentinel_message_names_keywords_and_window() {
        let message = sentinel_message(&["rust".to_string(), "tokio".to_string()]);
        assert!(message.contains("[rust, tokio]"));
        assert!(message.contains("14 days"));
    }
}
