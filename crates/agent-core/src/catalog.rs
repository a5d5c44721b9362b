//! Time-bounded cache of the remote model catalog, with stale-on-error
//! fallback. Consulted once before a loop execution to validate the requested
//! model identifier.

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use std::{error::Error, fmt};

use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default cache lifetime for the fetched identifier list.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Boundary for the remote catalog lookup. Timeout policy lives in the
/// implementation, not here.
pub trait CatalogSource: Send + Sync {
    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<String>>> + Send + 'a>>;
}

/// Signals a catalog miss with no stale payload to fall back on.
///
/// Surfaced to the caller; retry policy is theirs. Discriminate with
/// `err.is::<CatalogUnavailable>()`.
#[derive(Debug)]
pub struct CatalogUnavailable;

impl fmt::Display for CatalogUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model catalog unavailable and no cached payload exists")
    }
}

impl Error for CatalogUnavailable {}

#[derive(Debug, Clone)]
struct CacheEntry {
    models: Vec<String>,
    refreshed_at: Instant,
}

/// TTL cache over a [`CatalogSource`].
///
/// The entry is guarded by one async mutex held across the refresh, so
/// concurrent refreshes serialize and the `(payload, timestamp)` pair is
/// always written whole.
#[derive(Debug)]
pub struct ModelCatalog {
    ttl: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ModelCatalog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// Process-wide instance with the default TTL, lazily initialized.
    pub fn global() -> &'static ModelCatalog {
        static GLOBAL: OnceLock<ModelCatalog> = OnceLock::new();
        GLOBAL.get_or_init(ModelCatalog::default)
    }

    /// Returns the available model identifiers, refreshing through `source`
    /// only when the cached payload is missing or older than the TTL.
    ///
    /// A failed refresh degrades to the stale payload when one exists; the
    /// only error out of here is a miss with nothing cached.
    pub async fn available_models(
        &self,
        source: &dyn CatalogSource,
    ) -> anyhow::Result<Vec<String>> {
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.as_ref() {
            if entry.refreshed_at.elapsed() < self.ttl {
                return Ok(entry.models.clone());
            }
        }

        match source.fetch().await {
            Ok(models) => {
                debug!(count = models.len(), "model catalog refreshed");
                *cache = Some(CacheEntry {
                    models: models.clone(),
                    refreshed_at: Instant::now(),
                });
                Ok(models)
            }
            Err(err) => {
                if let Some(entry) = cache.as_ref() {
                    warn!(
                        error = %format!("{err:#}"),
                        "catalog fetch failed, serving stale payload"
                    );
                    return Ok(entry.models.clone());
                }
                Err(err.context(CatalogUnavailable))
            }
        }
    }

    /// Whether `model` is in the available set. Pure membership check over
    /// [`ModelCatalog::available_models`]; triggers no refresh of its own.
    pub async fn verify_model(
        &self,
        source: &dyn CatalogSource,
        model: &str,
    ) -> anyhow::Result<bool> {
        let models = self.available_models(source).await?;
        Ok(models.iter().any(|m| m == model))
    }

    /// Drops the cached payload. Test isolation hook.
    pub async fn reset(&self) {
        *self.cache.lock().await = None;
    }
}
