//! Periodic refresh scheduler.
//!
//! One tokio task per job, each with its own interval timer and child
//! cancellation token. Jobs never share state beyond the cache, so a slow or
//! failing fetch cannot delay another job's tick. Within a tick a failed
//! fetch is retried with exponential backoff; once retries are exhausted the
//! job logs the failure and waits for its next tick, leaving whatever the
//! cache already holds untouched.

use cache::TtlCache;
use common::{Payload, Result};
use config::RefreshConfig;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Async fetch closure producing key/payload pairs to write on success.
pub type FetchFn =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<(String, Payload)>>> + Send + Sync>;

/// One periodic refresh job.
pub struct JobSpec {
    pub name: String,
    /// Tick interval; the first tick fires immediately on start
    pub interval: Duration,
    /// TTL applied to every cache entry the job writes
    pub ttl: Duration,
    pub fetch: FetchFn,
}

pub struct RefreshScheduler {
    cache: Arc<TtlCache<Payload>>,
    retry: RefreshConfig,
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(cache: Arc<TtlCache<Payload>>, retry: RefreshConfig) -> Self {
        Self {
            cache,
            retry,
            token: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    /// Spawn one independent task per job.
    pub fn start(&mut self, jobs: Vec<JobSpec>) {
        info!(jobs = jobs.len(), "starting refresh scheduler");
        for job in jobs {
            let cache = Arc::clone(&self.cache);
            let retry = self.retry.clone();
            let token = self.token.child_token();
            self.handles.push(tokio::spawn(run_job(job, cache, retry, token)));
        }
    }

    /// Cancel all jobs and await their handles. Dropping the scheduler after
    /// this releases the provider clients and their connections.
    pub async fn shutdown(mut self) {
        info!("stopping refresh scheduler");
        self.token.cancel();
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!("refresh job panicked during shutdown: {e}");
            }
        }
        info!("refresh scheduler stopped");
    }
}

async fn run_job(
    job: JobSpec,
    cache: Arc<TtlCache<Payload>>,
    retry: RefreshConfig,
    token: CancellationToken,
) {
    info!(job = %job.name, interval_secs = job.interval.as_secs(), "refresh job started");

    let mut ticker = tokio::time::interval(job.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!(job = %job.name, "refresh job cancelled");
                break;
            }
            _ = ticker.tick() => {
                run_tick(&job, &cache, &retry, &token).await;
            }
        }
    }
}

/// One tick: the initial attempt plus up to `max_retries` retries with
/// exponential backoff. Only retryable failures (provider down, rate limit)
/// enter the backoff loop; a non-retryable failure or one past the last
/// retry is final for this tick.
async fn run_tick(
    job: &JobSpec,
    cache: &TtlCache<Payload>,
    retry: &RefreshConfig,
    token: &CancellationToken,
) {
    for attempt in 0..=retry.max_retries {
        match (job.fetch)().await {
            Ok(pairs) => {
                for (key, payload) in &pairs {
                    debug!(job = %job.name, key, category = payload.category(), "cache write");
                }
                let count = pairs.len();
                for (key, payload) in pairs {
                    cache.set(key, payload, job.ttl);
                }
                debug!(job = %job.name, entries = count, "refresh succeeded");
                return;
            }
            Err(e) if !e.is_retryable() => {
                error!(
                    job = %job.name,
                    "refresh failed with non-retryable error, keeping stale cache until next tick: {e}"
                );
                return;
            }
            Err(e) if attempt < retry.max_retries => {
                let delay = retry.backoff_delay(attempt);
                warn!(
                    job = %job.name,
                    attempt = attempt + 1,
                    delay_secs = delay.as_secs(),
                    "refresh attempt failed, backing off: {e}"
                );
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => {
                error!(
                    job = %job.name,
                    attempts = retry.max_retries + 1,
                    "refresh failed, keeping stale cache until next tick: {e}"
                );
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::Quote;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn quote(price: f64) -> Payload {
        Payload::Quote(Quote {
            symbol: "NVDA".to_string(),
            price,
            previous_close: price - 1.0,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 2, 14, 30, 0).unwrap(),
        })
    }

    fn retry_config() -> RefreshConfig {
        RefreshConfig {
            max_retries: 3,
            backoff_base_secs: 1,
        }
    }

    fn always_ok(price: f64) -> FetchFn {
        Arc::new(move || {
            Box::pin(async move { Ok(vec![("price:NVDA".to_string(), quote(price))]) })
        })
    }

    fn always_err(calls: Arc<AtomicUsize>, times: Arc<Mutex<Vec<Instant>>>) -> FetchFn {
        Arc::new(move || {
            let calls = Arc::clone(&calls);
            let times = Arc::clone(&times);
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                times.lock().unwrap().push(Instant::now());
                Err(common::Error::source_unavailable("down"))
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_writes_to_cache() {
        let cache = Arc::new(TtlCache::new());
        let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), retry_config());
        scheduler.start(vec![JobSpec {
            name: "price".to_string(),
            interval: Duration::from_secs(5),
            ttl: Duration::from_secs(5),
            fetch: always_ok(141.0),
        }]);

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.get("price:NVDA").is_some());

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_are_1_2_4() {
        let cache = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));

        let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), retry_config());
        scheduler.start(vec![JobSpec {
            name: "price".to_string(),
            interval: Duration::from_secs(3600),
            ttl: Duration::from_secs(5),
            fetch: always_err(Arc::clone(&calls), Arc::clone(&times)),
        }]);

        // Initial attempt + 3 retries = 4 calls, spaced 1s, 2s, 4s apart.
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let times = times.lock().unwrap();
        let gap1 = times[1] - times[0];
        let gap2 = times[2] - times[1];
        let gap3 = times[3] - times[2];
        assert_eq!(gap1, Duration::from_secs(1));
        assert_eq!(gap2, Duration::from_secs(2));
        assert_eq!(gap3, Duration::from_secs(4));
        drop(times);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_skips_backoff() {
        let cache = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let fetch: FetchFn = Arc::new(move || {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(common::Error::empty_payload("no rows"))
            })
        });

        let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), retry_config());
        scheduler.start(vec![JobSpec {
            name: "price".to_string(),
            interval: Duration::from_secs(60),
            ttl: Duration::from_secs(5),
            fetch,
        }]);

        // An empty payload is not worth re-requesting: one attempt, no
        // backoff retries, and nothing more until the next tick.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_preserves_stale_cache() {
        let cache = Arc::new(TtlCache::new());
        cache.set("price:NVDA", quote(100.0), Duration::from_secs(3600));

        let calls = Arc::new(AtomicUsize::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), retry_config());
        scheduler.start(vec![JobSpec {
            name: "price".to_string(),
            interval: Duration::from_secs(3600),
            ttl: Duration::from_secs(5),
            fetch: always_err(calls, times),
        }]);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let cached = cache.get("price:NVDA").expect("stale entry must survive");
        match cached.value {
            Payload::Quote(q) => assert_eq!(q.price, 100.0),
            other => panic!("unexpected payload: {other:?}"),
        }

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_job_does_not_block_others() {
        let cache = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));

        let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), retry_config());
        scheduler.start(vec![
            JobSpec {
                name: "broken".to_string(),
                interval: Duration::from_secs(3600),
                ttl: Duration::from_secs(60),
                fetch: always_err(calls, times),
            },
            JobSpec {
                name: "price".to_string(),
                interval: Duration::from_secs(5),
                ttl: Duration::from_secs(3600),
                fetch: always_ok(141.0),
            },
        ]);

        // Healthy job must keep writing while the broken one is mid-backoff.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cache.get("price:NVDA").is_some());

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_stop_after_exhaustion_until_next_tick() {
        let cache = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));

        let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), retry_config());
        scheduler.start(vec![JobSpec {
            name: "price".to_string(),
            interval: Duration::from_secs(60),
            ttl: Duration::from_secs(5),
            fetch: always_err(Arc::clone(&calls), times),
        }]);

        // 4 attempts in the first tick; nothing more until the next tick.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        // Second tick at t=60s triggers a fresh round of 4.
        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 8);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_mid_backoff() {
        let cache = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let times = Arc::new(Mutex::new(Vec::new()));

        let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), retry_config());
        scheduler.start(vec![JobSpec {
            name: "price".to_string(),
            interval: Duration::from_secs(3600),
            ttl: Duration::from_secs(5),
            fetch: always_err(Arc::clone(&calls), times),
        }]);

        // One failed attempt, then cancel during the first backoff sleep.
        tokio::time::sleep(Duration::from_millis(500)).await;
        scheduler.shutdown().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
