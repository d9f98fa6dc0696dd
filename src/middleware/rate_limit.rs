//! In-memory sliding-window rate limiter for the login endpoint.
//! Production deployments behind multiple replicas would move this to Redis.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_secs: u64) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Check if a request is allowed for the given identifier (IP, email).
    pub async fn check(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut requests = self.requests.write().await;

        // The identifier is attacker-controlled on the auth routes, so evict
        // whole entries whose history fell out of the window instead of
        // letting one-shot keys accumulate.
        requests.retain(|_, history| {
            history.retain(|&timestamp| now.duration_since(timestamp) < self.window);
            !history.is_empty()
        });

        let history = requests.entry(identifier.to_string()).or_default();
        if history.len() < self.max_requests {
            history.push(now);
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub async fn tracked_identifiers(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter() {
        let limiter = RateLimiter::new(3, 60); // 3 requests per 60 seconds

        // First 3 requests should pass
        assert!(limiter.check("test_ip").await);
        assert!(limiter.check("test_ip").await);
        assert!(limiter.check("test_ip").await);

        // 4th request should be blocked
        assert!(!limiter.check("test_ip").await);

        // Different IP should work
        assert!(limiter.check("other_ip").await);
    }

    #[tokio::test]
    async fn test_window_expiry() {
        let limiter = RateLimiter::new(1, 1); // 1 request per 1 second

        assert!(limiter.check("ip1").await);
        assert!(!limiter.check("ip1").await);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(limiter.check("ip1").await);
    }

    #[tokio::test]
    async fn test_expired_identifiers_are_evicted() {
        let limiter = RateLimiter::new(5, 1);

        for n in 0..100 {
            limiter.check(&format!("ghost_{n}@example.com")).await;
        }
        assert_eq!(limiter.tracked_identifiers().await, 100);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        // The next check sweeps out every identifier whose window lapsed.
        limiter.check("fresh@example.com").await;
        assert_eq!(limiter.tracked_identifiers().await, 1);
    }
}
