//! Rate Limit Gate: one shared cooldown window for all provider requests.
//!
//! The provider throttles per IP, not per account, so a single limit covers
//! every account. The window survives restarts through the key-value store.
//! All methods take the current time explicitly; production callers pass
//! [`now_ms`], tests pass fixed values.

use crate::store::{KvStore, StoreError};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// How long one rate limit window lasts.
pub const RATE_LIMIT_DURATION_MS: i64 = 5 * 60 * 1000;

/// Store key holding the window expiration as epoch millis.
pub const RATE_LIMIT_KEY: &str = "rate_limit_expiration";

/// Current wall clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub struct RateLimitGate {
    store: Arc<dyn KvStore>,
    expires_at: Option<i64>,
}

impl RateLimitGate {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            expires_at: None,
        }
    }

    /// Restore a persisted window, discarding it (memory and store) when it
    /// has already expired.
    pub fn init(&mut self, now: i64) -> Result<(), StoreError> {
        let persisted = self
            .store
            .get(RATE_LIMIT_KEY)?
            .and_then(|v| v.trim().parse::<i64>().ok());

        match persisted {
            Some(expires_at) if expires_at > now => {
                tracing::info!(
                    remaining_ms = expires_at - now,
                    "restored active rate limit window"
                );
                self.expires_at = Some(expires_at);
            }
            Some(_) => {
                self.store.remove(RATE_LIMIT_KEY)?;
                self.expires_at = None;
            }
            None => self.expires_at = None,
        }
        Ok(())
    }

    pub fn is_limited(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at > now)
    }

    /// Milliseconds until the window ends, 0 when not limited.
    pub fn remaining_ms(&self, now: i64) -> i64 {
        self.expires_at
            .map(|expires_at| (expires_at - now).max(0))
            .unwrap_or(0)
    }

    /// Open a new window starting at `now`.
    pub fn set_limit(&mut self, now: i64) -> Result<(), StoreError> {
        let expires_at = now + RATE_LIMIT_DURATION_MS;
        self.store.set(RATE_LIMIT_KEY, &expires_at.to_string())?;
        self.expires_at = Some(expires_at);
        tracing::warn!(expires_at, "rate limit window opened");
        Ok(())
    }

    /// Drop the window unconditionally.
    pub fn clear_limit(&mut self) -> Result<(), StoreError> {
        self.store.remove(RATE_LIMIT_KEY)?;
        self.expires_at = None;
        Ok(())
    }

    /// Drop the window only if it was opened before `request_started`.
    ///
    /// A successful response proves only that no limit was active when its
    /// request was issued; a window opened by a concurrent request after
    /// that point must survive.
    pub fn clear_limit_for_request(&mut self, request_started: i64) -> Result<(), StoreError> {
        match self.expires_at {
            Some(expires_at) if expires_at - RATE_LIMIT_DURATION_MS <= request_started => {
                self.clear_limit()
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn gate() -> RateLimitGate {
        RateLimitGate::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_window_boundaries() {
        let mut gate = gate();
        let t = 1_700_000_000_000;
        gate.set_limit(t).unwrap();

        assert!(gate.is_limited(t));
        assert!(gate.is_limited(t + RATE_LIMIT_DURATION_MS - 1));
        assert!(!gate.is_limited(t + RATE_LIMIT_DURATION_MS));
        assert!(!gate.is_limited(t + RATE_LIMIT_DURATION_MS + 1));
    }

    #[test]
    fn test_remaining_ms() {
        let mut gate = gate();
        let t = 1_000_000;
        gate.set_limit(t).unwrap();
        assert_eq!(gate.remaining_ms(t + 1_000), RATE_LIMIT_DURATION_MS - 1_000);
        assert_eq!(gate.remaining_ms(t + RATE_LIMIT_DURATION_MS + 5), 0);
    }

    #[test]
    fn test_init_restores_active_window() {
        let store = Arc::new(MemoryStore::new());
        let t = 2_000_000;

        let mut first = RateLimitGate::new(store.clone());
        first.set_limit(t).unwrap();

        let mut second = RateLimitGate::new(store);
        second.init(t + 1_000).unwrap();
        assert!(second.is_limited(t + 1_000));
    }

    #[test]
    fn test_init_clears_expired_window() {
        let store = Arc::new(MemoryStore::new());
        let t = 2_000_000;

        let mut first = RateLimitGate::new(store.clone());
        first.set_limit(t).unwrap();

        let mut second = RateLimitGate::new(store.clone());
        second.init(t + RATE_LIMIT_DURATION_MS + 1).unwrap();
        assert!(!second.is_limited(t + RATE_LIMIT_DURATION_MS + 1));
        assert_eq!(store.get(RATE_LIMIT_KEY).unwrap(), None);
    }

    #[test]
    fn test_guarded_clear_keeps_newer_limit() {
        let mut gate = gate();
        let request_started = 5_000_000;

        // Limit opened after the request went out must survive its success.
        gate.set_limit(request_started + 100).unwrap();
        gate.clear_limit_for_request(request_started).unwrap();
        assert!(gate.is_limited(request_started + 200));

        // Limit opened before the request clears normally.
        gate.clear_limit().unwrap();
        gate.set_limit(request_started - 100).unwrap();
        gate.clear_limit_for_request(request_started).unwrap();
        assert!(!gate.is_limited(request_started + 200));
    }
}
