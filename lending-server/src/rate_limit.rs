use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Sliding-window counter for login attempts, keyed by normalized email.
#[derive(Debug)]
pub struct LoginLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl LoginLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(max_attempts: usize) -> Self {
        Self::new(max_attempts, Duration::from_secs(60))
    }

    /// Records an attempt and reports whether it is within the limit.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let key = key.trim().to_lowercase();
        // A panic elsewhere must not switch the limiter off.
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);

        let window = self.window;
        attempts.retain(|_, seen| {
            while seen
                .front()
                .is_some_and(|at| now.saturating_duration_since(*at) >= window)
            {
                seen.pop_front();
            }
            !seen.is_empty()
        });

        let seen = attempts.entry(key).or_default();
        if seen.len() >= self.max_attempts {
            return false;
        }
        seen.push_back(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit_until_window_passes() {
        let limiter = LoginLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("Sarah@withcaelo.ai", start));
        assert!(limiter.check_at("sarah@withcaelo.ai ", start));
        assert!(!limiter.check_at("sarah@withcaelo.ai", start + Duration::from_secs(1)));
        assert!(limiter.check_at("mike@cdfi.example.org", start));
        assert!(limiter.check_at("sarah@withcaelo.ai", start + Duration::from_secs(61)));
    }

    #[test]
    fn keeps_limiting_after_lock_poisoned() {
        let limiter = std::sync::Arc::new(LoginLimiter::new(1, Duration::from_secs(60)));
        let start = Instant::now();
        assert!(limiter.check_at("sarah@withcaelo.ai", start));

        let poisoner = std::sync::Arc::clone(&limiter);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.attempts.lock().expect("lock");
            panic!("worker died holding the limiter");
        })
        .join();
        assert!(joined.is_err());
        assert!(limiter.attempts.is_poisoned());

        assert!(!limiter.check_at("sarah@withcaelo.ai", start + Duration::from_secs(1)));
        assert!(limiter.check_at("mike@cdfi.example.org", start));
    }
}
