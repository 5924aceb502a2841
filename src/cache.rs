//! Time-bounded in-memory copy of the track catalog.

use crate::client::{CatalogError, CatalogSource};
use crate::models::CatalogTrack;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::sync::{Arc, PoisonError, RwLock};

/// Source of the current time
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

struct CachedCatalog {
    tracks: Arc<Vec<CatalogTrack>>,
    loaded_at: DateTime<Utc>,
}

/// Catalog cache with a fixed time-to-live.
///
/// Readers share one `Arc` of the loaded catalog. A stale or missing entry is
/// reloaded on the next [`CatalogCache::get`]; concurrent cold reads may each
/// load, and the last one to finish wins.
pub struct CatalogCache {
    source: Box<dyn CatalogSource>,
    clock: Box<dyn Clock>,
    ttl: Duration,
    entry: RwLock<Option<CachedCatalog>>,
}

impl CatalogCache {
    pub fn new(source: Box<dyn CatalogSource>, ttl_secs: u64) -> Self {
        Self::with_clock(source, Box::new(SystemClock), ttl_secs)
    }

    pub fn with_clock(source: Box<dyn CatalogSource>, clock: Box<dyn Clock>, ttl_secs: u64) -> Self {
        CatalogCache {
            source,
            clock,
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
            entry: RwLock::new(None),
        }
    }

    fn fresh(&self, now: DateTime<Utc>) -> Option<Arc<Vec<CatalogTrack>>> {
        let guard = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|cached| now - cached.loaded_at < self.ttl)
            .map(|cached| Arc::clone(&cached.tracks))
    }

    /// Current catalog, loading it from the source when absent or expired
    pub fn get(&self) -> Result<Arc<Vec<CatalogTrack>>, CatalogError> {
        let now = self.clock.now();
        if let Some(tracks) = self.fresh(now) {
            debug!("Catalog cache hit ({} tracks)", tracks.len());
            return Ok(tracks);
        }

        info!("Loading catalog from {}", self.source.describe());
        let tracks = Arc::new(self.source.load()?);

        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(CachedCatalog {
            tracks: Arc::clone(&tracks),
            loaded_at: now,
        });
        Ok(tracks)
    }

    /// Drop the cached catalog so the next read reloads it
    pub fn invalidate(&self) {
        let mut guard = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockCatalogSource;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn track(title: &str) -> CatalogTrack {
        CatalogTrack {
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            ..Default::default()
        }
    }

    fn source_expecting(loads: usize) -> MockCatalogSource {
        let mut source = MockCatalogSource::new();
        source
            .expect_load()
            .times(loads)
            .returning(|| Ok(vec![track("One"), track("Two")]));
        source
            .expect_describe()
            .returning(|| "test catalog".to_string());
        source
    }

    /// Clock whose reading can be advanced from the test
    fn stepping_clock(times: Arc<Mutex<DateTime<Utc>>>) -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(move || *times.lock().unwrap());
        clock
    }

    #[test]
    fn test_second_read_within_ttl_is_served_from_cache() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let now = Arc::new(Mutex::new(start));
        let cache = CatalogCache::with_clock(
            Box::new(source_expecting(1)),
            Box::new(stepping_clock(Arc::clone(&now))),
            300,
        );

        let first = cache.get().unwrap();
        *now.lock().unwrap() = start + Duration::seconds(299);
        let second = cache.get().unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_expired_entry_is_reloaded() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let now = Arc::new(Mutex::new(start));
        let cache = CatalogCache::with_clock(
            Box::new(source_expecting(2)),
            Box::new(stepping_clock(Arc::clone(&now))),
            300,
        );

        let first = cache.get().unwrap();
        *now.lock().unwrap() = start + Duration::seconds(300);
        let second = cache.get().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_load_error_is_not_cached() {
        let mut source = MockCatalogSource::new();
        let mut calls = 0;
        source.expect_load().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Err(CatalogError::Http("connection refused".to_string()))
            } else {
                Ok(vec![track("Recovered")])
            }
        });
        source
            .expect_describe()
            .returning(|| "flaky catalog".to_string());

        let cache = CatalogCache::new(Box::new(source), 300);
        assert!(cache.get().is_err());
        assert_eq!(cache.get().unwrap()[0].title, "Recovered");
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let cache = CatalogCache::new(Box::new(source_expecting(2)), 300);
        cache.get().unwrap();
        cache.invalidate();
        cache.get().unwrap();
    }
}
