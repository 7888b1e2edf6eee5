//! Login-attempt throttling.
//!
//! An injected service keyed by user identifier with a configurable TTL,
//! replacing ad-hoc process globals. Entries self-expire after the TTL.
//! Process-local and best-effort: it resets on restart and does not
//! coordinate across server instances.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::AuthThrottleConfig;
use crate::services::error::DomainError;

#[derive(Debug)]
struct Entry {
    failures: u32,
    expires_at: Instant,
}

pub struct LoginThrottle {
    max_attempts: u32,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl LoginThrottle {
    #[must_use]
    pub fn new(config: &AuthThrottleConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            ttl: Duration::from_secs(config.ttl_seconds),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Rejects the attempt if the key has exhausted its failure budget within
    /// the TTL window.
    pub fn check(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::purge_expired(&mut entries);

        match entries.get(key) {
            Some(entry) if entry.failures >= self.max_attempts => Err(DomainError::Validation(
                "Too many failed attempts. Please try again later".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Records one failed attempt, refreshing the entry's expiry.
    pub fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::purge_expired(&mut entries);

        let expires_at = Instant::now() + self.ttl;
        entries
            .entry(key.to_string())
            .and_modify(|e| {
                e.failures += 1;
                e.expires_at = expires_at;
            })
            .or_insert(Entry {
                failures: 1,
                expires_at,
            });
    }

    /// Clears the failure record after a successful login.
    pub fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    fn purge_expired(entries: &mut HashMap<String, Entry>) {
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle(max_attempts: u32, ttl_seconds: u64) -> LoginThrottle {
        LoginThrottle::new(&AuthThrottleConfig {
            max_attempts,
            ttl_seconds,
        })
    }

    #[test]
    fn test_allows_until_budget_exhausted() {
        let throttle = throttle(3, 60);

        for _ in 0..2 {
            throttle.record_failure("user-1");
        }
        assert!(throttle.check("user-1").is_ok());

        throttle.record_failure("user-1");
        assert!(throttle.check("user-1").is_err());

        // Other keys are unaffected.
        assert!(throttle.check("user-2").is_ok());
    }

    #[test]
    fn test_clear_resets_budget() {
        let throttle = throttle(1, 60);
        throttle.record_failure("user-1");
        assert!(throttle.check("user-1").is_err());

        throttle.clear("user-1");
        assert!(throttle.check("user-1").is_ok());
    }

    #[test]
    fn test_entries_self_expire() {
        let throttle = throttle(1, 1);
        throttle.record_failure("user-1");
        assert!(throttle.check("user-1").is_err());

        std::thread::sleep(Duration::from_millis(1100));
        assert!(throttle.check("user-1").is_ok());
    }
}
