use std::collections::HashMap;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

/// Attempts a client may make within one window.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Length of the sliding window (15 minutes).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Sliding-window limiter for register and login attempts, keyed by client
/// address.
///
/// Clones share the same attempt history. Refused attempts are not recorded,
/// so a client regains one attempt as soon as its oldest one leaves the window.
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Arc<Mutex<HashMap<IpAddr, VecDeque<Instant>>>>,
}

impl AuthRateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt from `client`.
    ///
    /// # Errors
    /// Time until the client may try again when its budget is spent
    pub fn try_acquire(&self, client: IpAddr) -> Result<(), Duration> {
        self.try_acquire_at(client, Instant::now())
    }

    fn try_acquire_at(&self, client: IpAddr, now: Instant) -> Result<(), Duration> {
        let mut attempts = self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Drop expired history for every client so idle entries do not pile up
        attempts.retain(|_, history| {
            while history
                .front()
                .is_some_and(|&at| now.saturating_duration_since(at) >= self.window)
            {
                history.pop_front();
            }
            !history.is_empty()
        });

        let history = attempts.entry(client).or_default();
        if history.len() >= self.max_attempts {
            let retry_after = history
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            return Err(retry_after);
        }

        history.push_back(now);
        Ok(())
    }
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
    const OTHER_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2));

    #[test]
    fn test_sixth_attempt_in_window_is_refused() {
        let limiter = AuthRateLimiter::default();
        let start = Instant::now();

        for i in 0..5 {
            assert_eq!(
                limiter.try_acquire_at(CLIENT, start + Duration::from_secs(i)),
                Ok(())
            );
        }

        assert_eq!(
            limiter.try_acquire_at(CLIENT, start + Duration::from_secs(60)),
            Err(Duration::from_secs(840))
        );
    }

    #[test]
    fn test_attempts_leave_the_window() {
        let limiter = AuthRateLimiter::default();
        let start = Instant::now();

        for _ in 0..5 {
            limiter.try_acquire_at(CLIENT, start).unwrap();
        }
        assert!(limiter
            .try_acquire_at(CLIENT, start + DEFAULT_WINDOW - Duration::from_secs(1))
            .is_err());

        assert_eq!(limiter.try_acquire_at(CLIENT, start + DEFAULT_WINDOW), Ok(()));
    }

    #[test]
    fn test_refused_attempts_are_not_recorded() {
        let limiter = AuthRateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();

        limiter.try_acquire_at(CLIENT, start).unwrap();
        for i in 1..10 {
            assert!(limiter
                .try_acquire_at(CLIENT, start + Duration::from_secs(i))
                .is_err());
        }

        assert_eq!(
            limiter.try_acquire_at(CLIENT, start + Duration::from_secs(10)),
            Ok(())
        );
    }

    #[test]
    fn test_clients_have_separate_budgets() {
        let limiter = AuthRateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        limiter.try_acquire_at(CLIENT, start).unwrap();

        assert!(limiter.try_acquire_at(CLIENT, start).is_err());
        assert_eq!(limiter.try_acquire_at(OTHER_CLIENT, start), Ok(()));
    }

    #[test]
    fn test_clones_share_history() {
        let limiter = AuthRateLimiter::new(1, Duration::from_secs(60));
        let clone = limiter.clone();

        limiter.try_acquire(CLIENT).unwrap();

        assert!(clone.try_acquire(CLIENT).is_err());
    }
}
