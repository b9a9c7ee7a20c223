use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use xhswatch_core::StoreError;


/// Identifiers already notified in prior runs. A `BTreeSet` keeps the
/// serialized form canonically sorted, which makes repeated saves of the
/// same set byte-for-byte identical.
pub type SeenSet = BTreeSet<String>;

/// Persistence boundary for the seen set. Loading is always tolerant:
/// a missing or corrupt artifact is an empty set, never an error.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn load(&self) -> SeenSet;

    async fn save(&self, seen: &SeenSet) -> Result<(), StoreError>;

    /// Create the persisted artifact with an empty set when none exists.
    /// Called by the top-level boundary so the artifact exists after every
    /// invocation, including failed ones.
    async fn ensure_exists(&self) -> Result<(), StoreError>;
}

/// Seen set persisted as a pretty-printed, sorted JSON string array.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SeenStore for JsonFileStore {
    async fn load(&self) -> SeenSet {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) => {
                debug!(
                    "State file {} not readable ({}); starting from an empty seen set",
                    self.path.display(),
                    error
                );
                return SeenSet::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => {
                let seen: SeenSet = ids.into_iter().collect();
                debug!(
                    "Loaded {} seen ids from {}",
                    seen.len(),
                    self.path.display()
                );
                seen
            }
            Err(error) => {
                warn!(
                    "State file {} is corrupt ({}); starting from an empty seen set",
                    self.path.display(),
                    error
                );
                SeenSet::new()
            }
        }
    }

    async fn save(&self, seen: &SeenSet) -> Result<(), StoreError> {
        let serialized = serde_json::to_string_pretty(seen)?;
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|error| StoreError::Write {
                path: self.path.display().to_string(),
                detail: error.to_string(),
            })?;
        debug!("Saved {} seen ids to {}", seen.len(), self.path.display());
        Ok(())
    }

    async fn ensure_exists(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        self.save(&SeenSet::new()).await
    }
}

/// In-memory store for tests and ad-hoc dry runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: tokio::sync::Mutex<SeenSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seen(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            inner: tokio::sync::Mutex::new(ids.into_iter().collect()),
        }
    }

    pub async fn snapshot(&self) -> SeenSet {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn load(&self) -> SeenSet {
        self.inner.lock().await.clone()
    }

    async fn save(&self, seen: &SeenSet) -> Result<(), StoreError> {
        *self.inner.lock().await = seen.clone();
        Ok(())
    }

    async fn ensure_exists(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
