use governor::{
    clock::{Clock, DefaultClock},
    state::direct::NotKeyed,
    state::InMemoryState,
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::collections::HashMap;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::sync::RwLock;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter for login attempts, one bucket per normalised email.
///
/// Every attempt consumes a token; a successful login resets the bucket, so in practice
/// only consecutive failures count. Default: 5 attempts per 15 minutes.
#[derive(Clone)]
pub struct AuthRateLimiter {
    limiters: Arc<RwLock<HashMap<String, Arc<DirectLimiter>>>>,
    quota: Quota,
}

impl AuthRateLimiter {
    pub fn new() -> Self {
        Self::with_config(5, 15)
    }

    pub fn with_config(max_attempts: u32, window_minutes: u64) -> Self {
        let burst = NonZeroU32::new(max_attempts).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(Duration::from_secs(window_minutes.max(1) * 60))
            .unwrap_or_else(|| Quota::per_hour(burst))
            .allow_burst(burst);

        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            quota,
        }
    }

    /// Consume one attempt for `email`.
    ///
    /// `Err` carries how long the caller has to wait before the next attempt is allowed.
    pub async fn check(&self, email: &str) -> Result<(), Duration> {
        let email = email.to_lowercase();

        let limiter = {
            let mut limiters = self.limiters.write().await;
            limiters
                .entry(email)
                .or_insert_with(|| Arc::new(GovernorRateLimiter::direct(self.quota)))
                .clone()
        };

        limiter
            .check()
            .map_err(|negative| negative.wait_time_from(DefaultClock::default().now()))
    }

    pub async fn reset(&self, email: &str) {
        let email = email.to_lowercase();
        self.limiters.write().await.remove(&email);
    }
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
