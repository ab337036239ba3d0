use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Fixed-window import rate limiter keyed by client identity.
///
/// Shared between request handlers and the background sweeper; created once
/// at startup and injected through application state.
#[derive(Clone)]
pub struct ImportRateLimiter {
    state: Arc<RwLock<HashMap<String, WindowEntry>>>,
    max_per_window: u32,
    window_seconds: i64,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    /// Unix timestamp at which this window resets
    window_reset_at: i64,
}

impl ImportRateLimiter {
    pub fn new(max_per_window: u32, window_seconds: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            max_per_window,
            window_seconds: window_seconds as i64,
        }
    }

    /// Record one attempt for `key` and report whether it is allowed
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Utc::now().timestamp()).await
    }

    async fn check_at(&self, key: &str, now: i64) -> bool {
        let mut state = self.state.write().await;

        match state.get_mut(key) {
            Some(entry) if entry.window_reset_at > now => {
                if entry.count < self.max_per_window {
                    entry.count += 1;
                    true
                } else {
                    debug!("Rate limit denied for {}", key);
                    false
                }
            }
            _ => {
                // No entry yet, or the previous window has expired
                state.insert(
                    key.to_string(),
                    WindowEntry {
                        count: 1,
                        window_reset_at: now + self.window_seconds,
                    },
                );
                true
            }
        }
    }

    /// Remove entries whose window has expired, returning how many were pruned
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now().timestamp()).await
    }

    async fn sweep_at(&self, now: i64) -> usize {
        let mut state = self.state.write().await;
        let before = state.len();
        state.retain(|_, entry| entry.window_reset_at > now);
        before - state.len()
    }

    /// Start the background sweeper task
    pub fn start_sweeper(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("Rate limit sweeper started (interval: {:?})", interval);

            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = self.sweep().await;
                if removed > 0 {
                    debug!("Rate limit sweep removed {} expired entries", removed);
                }
            }
        })
    }

    #[cfg(test)]
    async fn entry_count(&self) -> usize {
        self.state.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_window_allows_then_denies() {
        let limiter = ImportRateLimiter::new(5, 60);
        let now = 1_000_000;

        for _ in 0..5 {
            assert!(limiter.check_at("10.1.2.3", now).await);
        }
        assert!(!limiter.check_at("10.1.2.3", now).await);

        // After the window elapses the counter resets
        assert!(limiter.check_at("10.1.2.3", now + 61).await);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = ImportRateLimiter::new(1, 60);
        let now = 1_000_000;

        assert!(limiter.check_at("a", now).await);
        assert!(!limiter.check_at("a", now).await);
        assert!(limiter.check_at("b", now).await);
    }

    #[tokio::test]
    async fn test_sweep_prunes_only_expired_windows() {
        let limiter = ImportRateLimiter::new(5, 60);
        let now = 1_000_000;

        limiter.check_at("old", now).await;
        limiter.check_at("fresh", now + 50).await;

        let removed = limiter.sweep_at(now + 70).await;
        assert_eq!(removed, 1);
        assert_eq!(limiter.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_reset_lazily() {
        let limiter = ImportRateLimiter::new(2, 60);
        let now = 1_000_000;

        limiter.check_at("k", now).await;
        limiter.check_at("k", now).await;
        assert!(!limiter.check_at("k", now).await);

        // A check after expiry resets in place without needing the sweeper
        assert!(limiter.check_at("k", now + 100).await);
        assert_eq!(limiter.entry_count().await, 1);
    }
}
