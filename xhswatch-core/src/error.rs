use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Failures while driving the rendering service for one keyword. Every
/// variant is keyword-scoped: the run catches it, logs it, and the keyword
/// contributes zero candidates.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("navigation to {url} timed out after {seconds}s")]
    NavigationTimeout { url: String, seconds: u64 },

    #[error("navigation to {url} failed: {detail}")]
    Navigation { url: String, detail: String },

    #[error("render service error: status={status}, body={message}")]
    RenderService { status: u16, message: String },

    #[error("render service returned an unusable response: {detail}")]
    InvalidResponse { detail: String },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::NavigationTimeout { .. })
    }
}

/// A structured search payload was captured but does not match the expected
/// schema. The keyword falls back to DOM-only results, which the
/// missing-timestamp rule then drops.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("search payload does not match expected schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("search payload has no item list: {detail}")]
    MissingItems { detail: String },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("bot API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("bot API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dry-run: delivery suppressed")]
    DryRun,
}

impl NotifyError {
    /// Dry-run suppression is bookkept like a failure (the candidate stays
    /// unseen) but logged as a skip rather than an error.
    pub fn is_dry_run(&self) -> bool {
        matches!(self, NotifyError::DryRun)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to write state file {path}: {detail}")]
    Write { path: String, detail: String },

    #[error("failed to serialize seen set: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("invalid service URL for {field}: {detail}")]
    InvalidUrl { field: String, detail: String },
}
