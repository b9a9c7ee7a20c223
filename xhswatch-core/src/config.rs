use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_SEEN_FILE: &str = "xhs_seen.json";
pub const DEFAULT_RENDER_URL: &str = "http://localhost:3000";
pub const DEFAULT_MAX_PER_KEYWORD: usize = 20;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Everything the watcher reads from the environment. Missing messaging
/// credentials do not fail configuration; they force dry-run delivery.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub keywords: Vec<String>,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub dry_run: bool,
    pub headless: bool,
    pub cookie: Option<String>,
    pub user_agent: String,
    pub render_url: String,
    pub render_token: Option<String>,
    pub seen_file: PathBuf,
    pub max_per_keyword: usize,
}

impl WatchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_per_keyword = match non_empty_var("MAX_POSTS_PER_KEYWORD") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    field: "MAX_POSTS_PER_KEYWORD".to_string(),
                    value: raw,
                })?,
            None => DEFAULT_MAX_PER_KEYWORD,
        };

        let render_url = non_empty_var("BROWSERLESS_URL")
            .unwrap_or_else(|| DEFAULT_RENDER_URL.to_string());
        validate_service_url("BROWSERLESS_URL", &render_url)?;

        Ok(Self {
            keywords: parse_keywords(&env::var("KEYWORDS").unwrap_or_default()),
            bot_token: non_empty_var("TG_BOT_TOKEN"),
            chat_id: non_empty_var("TG_CHAT_ID"),
            dry_run: flag_enabled(&env::var("DRY_RUN").unwrap_or_default()),
            headless: parse_toggle(&env::var("HEADLESS").unwrap_or_default()),
            cookie: non_empty_var("XHS_COOKIE"),
            user_agent: non_empty_var("USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            render_url,
            render_token: non_empty_var("BROWSERLESS_TOKEN"),
            seen_file: PathBuf::from(
                non_empty_var("SEEN_FILE").unwrap_or_else(|| DEFAULT_SEEN_FILE.to_string()),
            ),
            max_per_keyword,
        })
    }

    /// Both halves of the bot credentials, or None when either is missing.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat_id)) => Some((token, chat_id)),
            _ => None,
        }
    }

    /// Dry-run requested explicitly, or forced by missing credentials.
    pub fn effective_dry_run(&self) -> bool {
        self.dry_run || self.credentials().is_none()
    }
}

/// Comma or newline separated keyword list; blanks dropped, order preserved.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.replace('\n', ",")
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Opt-out toggle: only `0`, `false` and `no` disable; everything else
/// (including unset) leaves it on.
pub fn parse_toggle(raw: &str) -> bool {
    !matches!(
        raw.trim().to_lowercase().as_str(),
        "0" | "false" | "no"
    )
}

/// Opt-in flag: only `1`, `true` and `yes` enable.
pub fn flag_enabled(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

pub fn validate_service_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            detail: format!("expected http(s) URL, got '{value}'"),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
