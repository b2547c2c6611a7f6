//! Refresh orchestration: gate check, fetch, normalize, map, persist.

use crate::gate::RateLimitGate;
use crate::mapping::map_char_list;
use crate::services::fetch::{AccountFetcher, ResponseKind, classify_response};
use crate::store::{KvStore, load_accounts, save_accounts};
use crate::xml::normalize;
use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Error recorded when a response parses but carries no account record.
pub const NO_ACCOUNT_ERROR: &str = "response contained no account data";

/// How one refresh attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New snapshot mapped and persisted.
    Refreshed,
    /// Gate was limited; no request was issued.
    Refused,
    /// Another refresh of the same account is still running.
    AlreadyInFlight,
    /// Provider throttled us; gate opened, stale snapshot kept.
    RateLimited,
    /// Fetch or parse failed; error recorded, stale snapshot kept.
    Failed(String),
}

/// Drives one account refresh end to end.
///
/// Every attempt persists the account list, so a crash never loses a
/// recorded error or a fresh snapshot. Failures degrade to stale data:
/// the previous snapshot stays readable next to the error message.
pub struct RefreshService {
    fetcher: Arc<dyn AccountFetcher>,
    store: Arc<dyn KvStore>,
    gate: Mutex<RateLimitGate>,
    in_flight: Mutex<HashSet<String>>,
}

impl RefreshService {
    pub fn new(
        fetcher: Arc<dyn AccountFetcher>,
        store: Arc<dyn KvStore>,
        gate: RateLimitGate,
    ) -> Self {
        Self {
            fetcher,
            store,
            gate: Mutex::new(gate),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Whether the shared gate is limited at `now`.
    pub fn is_limited(&self, now: i64) -> bool {
        self.gate.lock().unwrap().is_limited(now)
    }

    /// Refresh one account by store id.
    ///
    /// `now` is the wall clock in epoch millis; it doubles as the request
    /// start time for the guarded gate clear.
    pub async fn refresh_account(&self, account_id: &str, now: i64) -> Result<RefreshOutcome> {
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            if !in_flight.insert(account_id.to_string()) {
                tracing::debug!(account_id, "refresh already in flight, skipping");
                return Ok(RefreshOutcome::AlreadyInFlight);
            }
        }

        let result = self.refresh_inner(account_id, now).await;
        self.in_flight.lock().unwrap().remove(account_id);
        result
    }

    async fn refresh_inner(&self, account_id: &str, now: i64) -> Result<RefreshOutcome> {
        if self.is_limited(now) {
            tracing::info!(account_id, "refresh refused, rate limit window active");
            return Ok(RefreshOutcome::Refused);
        }

        let mut accounts = load_accounts(self.store.as_ref())
            .context("Failed to load account list from store")?;
        let Some(account) = accounts.iter_mut().find(|a| a.id == account_id) else {
            bail!("Unknown account id: {account_id}");
        };

        let request_started = now;
        let response = self
            .fetcher
            .fetch_snapshot(&account.guid, &account.password)
            .await;

        let body = match response {
            Ok(body) => body,
            Err(e) => e.to_string(),
        };

        let outcome = match classify_response(&body) {
            ResponseKind::Snapshot => match normalize(&body) {
                Ok(doc) => {
                    let snapshot = map_char_list(&doc);
                    account.error = if snapshot.account.is_none() {
                        Some(NO_ACCOUNT_ERROR.to_string())
                    } else {
                        None
                    };
                    account.snapshot = Some(snapshot);
                    account.last_saved = timestamp(now);

                    self.gate
                        .lock()
                        .unwrap()
                        .clear_limit_for_request(request_started)
                        .context("Failed to clear rate limit window")?;

                    tracing::info!(account_id, "snapshot refreshed");
                    RefreshOutcome::Refreshed
                }
                Err(e) => {
                    let message = format!("snapshot parse failed: {e}");
                    tracing::warn!(account_id, %message);
                    account.error = Some(message.clone());
                    RefreshOutcome::Failed(message)
                }
            },
            ResponseKind::RateLimited => {
                self.gate
                    .lock()
                    .unwrap()
                    .set_limit(now)
                    .context("Failed to persist rate limit window")?;
                account.error = Some(body.trim().to_string());
                tracing::warn!(account_id, "provider rate limit hit");
                RefreshOutcome::RateLimited
            }
            ResponseKind::NetworkFailure(message) | ResponseKind::UnknownError(message) => {
                tracing::warn!(account_id, %message, "refresh failed");
                account.error = Some(message.clone());
                RefreshOutcome::Failed(message)
            }
        };

        save_accounts(self.store.as_ref(), &accounts)
            .context("Failed to persist account list")?;
        Ok(outcome)
    }
}

fn timestamp(now: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(now).map(|dt| dt.to_rfc3339())
}
