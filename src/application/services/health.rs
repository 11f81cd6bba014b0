use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::domain::{ports::DependencyProbe, HealthStatus};

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    entry: Option<(bool, Instant)>,
}

impl Slot {
    fn get(&self, ttl: Duration, now: Instant) -> Option<bool> {
        self.entry
            .filter(|(_, at)| now.saturating_duration_since(*at) < ttl)
            .map(|(value, _)| value)
    }
}

/// Last probe result per dependency, reused for `ttl`.
#[derive(Debug)]
pub struct HealthCache {
    ttl: Duration,
    db: Mutex<Slot>,
    llm: Mutex<Slot>,
}

impl HealthCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            db: Mutex::new(Slot::default()),
            llm: Mutex::new(Slot::default()),
        }
    }

    pub fn get_db(&self) -> Option<bool> {
        Self::read(&self.db, self.ttl)
    }

    pub fn set_db(&self, value: bool) {
        Self::write(&self.db, value);
    }

    pub fn get_llm(&self) -> Option<bool> {
        Self::read(&self.llm, self.ttl)
    }

    pub fn set_llm(&self, value: bool) {
        Self::write(&self.llm, value);
    }

    // A poisoned slot only ever held a plain bool, so its contents are still usable.
    fn read(slot: &Mutex<Slot>, ttl: Duration) -> Option<bool> {
        let slot = slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.get(ttl, Instant::now())
    }

    fn write(slot: &Mutex<Slot>, value: bool) {
        let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.entry = Some((value, Instant::now()));
    }
}

pub struct HealthService {
    db_probe: Arc<dyn DependencyProbe>,
    llm_probe: Arc<dyn DependencyProbe>,
    cache: HealthCache,
}

impl HealthService {
    pub fn new(
        db_probe: Arc<dyn DependencyProbe>,
        llm_probe: Arc<dyn DependencyProbe>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            db_probe,
            llm_probe,
            cache: HealthCache::new(cache_ttl),
        }
    }

    pub async fn check_db(&self) -> bool {
        if let Some(cached) = self.cache.get_db() {
            return cached;
        }
        let up = self.db_probe.ping().await;
        debug!(probe = self.db_probe.name(), up, "probe refreshed");
        self.cache.set_db(up);
        up
    }

    pub async fn check_llm(&self) -> bool {
        if let Some(cached) = self.cache.get_llm() {
            return cached;
        }
        let up = self.llm_probe.ping().await;
        debug!(probe = self.llm_probe.name(), up, "probe refreshed");
        self.cache.set_llm(up);
        up
    }

    /// Both probes run concurrently.
    pub async fn check(&self) -> HealthStatus {
        let (db, llm) = tokio::join!(self.check_db(), self.check_llm());
        HealthStatus { db, llm }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingProbe {
        up: AtomicBool,
        calls: AtomicUsize,
    }

    impl CountingProbe {
        fn new(up: bool) -> Arc<Self> {
            Arc::new(Self {
                up: AtomicBool::new(up),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DependencyProbe for CountingProbe {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn ping(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.up.load(Ordering::SeqCst)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_within_ttl_and_miss_after() {
        let cache = HealthCache::new(Duration::from_secs(5));
        assert_eq!(cache.get_db(), None);

        cache.set_db(true);
        assert_eq!(cache.get_db(), Some(true));
        assert_eq!(cache.get_llm(), None);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.get_db(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_reuses_cached_probe_results() {
        let db = CountingProbe::new(true);
        let llm = CountingProbe::new(false);
        let service = HealthService::new(db.clone(), llm.clone(), Duration::from_secs(5));

        let first = service.check().await;
        assert_eq!(first, HealthStatus { db: true, llm: false });

        llm.up.store(true, Ordering::SeqCst);
        let second = service.check().await;
        assert_eq!(second, first);
        assert_eq!(db.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        let third = service.check().await;
        assert!(third.all_up());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_probes() {
        let db = CountingProbe::new(false);
        let llm = CountingProbe::new(false);
        let service = HealthService::new(db.clone(), llm, Duration::ZERO);

        service.check_db().await;
        service.check_db().await;
        assert_eq!(db.calls.load(Ordering::SeqCst), 2);
    }
}
