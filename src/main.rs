//! Realmstash - rate-limit-aware snapshot manager for Realm game accounts
//!
//! Scheduler entry point. It wires the library pieces together and drives
//! refresh rounds on a timer:
//!
//! 1. Initialize logging → logs/realmstash_<date>.log
//! 2. Load `Realmstash Config.yaml` from `Realmstash Data/`
//! 3. Open the JSON account store and restore any persisted rate limit
//! 4. Build the refresh queue from the stored active accounts
//! 5. Tick the queue on a tokio interval; each tick refreshes one account
//!
//! The loop exits when the round is finished (every entry terminal) or on
//! a fatal store error. Per-account refresh failures never abort the run;
//! they are recorded on the entry and the queue moves on.

use anyhow::{Context, Result};
use realmstash::gate::now_ms;
use realmstash::queue::{EntryStatus, QueueSeed, QueueState, RefreshQueue};
use realmstash::services::{CommandFetcher, RefreshOutcome, RefreshService};
use realmstash::store::{JsonFileStore, KvStore, load_accounts};
use realmstash::{APP_NAME, ConfigManager, RateLimitGate, VERSION};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let config_manager = ConfigManager::new("Realmstash Data")?;
    let config = config_manager.load_user_config()?;
    let settings = config.settings;

    // Guard must stay alive for the duration of the program
    let _guard = realmstash::logging::setup_logging(
        "logs",
        "realmstash",
        settings.debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let store: Arc<dyn KvStore> = Arc::new(
        JsonFileStore::open(&settings.data_file)
            .with_context(|| format!("Failed to open account store: {}", settings.data_file))?,
    );

    let mut gate = RateLimitGate::new(store.clone());
    gate.init(now_ms())
        .context("Failed to restore rate limit state")?;

    let fetcher = Arc::new(
        CommandFetcher::from_command_line(&settings.fetch_command)
            .context("No fetch command configured in Realmstash Config.yaml")?,
    );
    let service = RefreshService::new(fetcher, store.clone(), gate);

    let accounts = load_accounts(store.as_ref()).context("Failed to load account list")?;
    let seeds: Vec<QueueSeed> = accounts
        .iter()
        .filter(|a| a.active)
        .map(|a| QueueSeed {
            account_id: a.id.clone(),
            display_name: a.display_name().to_string(),
            skipped: a.skipped,
        })
        .collect();

    if seeds.is_empty() {
        tracing::warn!("No active accounts in store, nothing to refresh");
        return Ok(());
    }

    let mut queue = RefreshQueue::new();
    queue.initialize(&seeds, settings.queue_fetch_interval_ms, now_ms());
    queue.start();

    tracing::info!(
        accounts = seeds.len(),
        interval_ms = settings.queue_fetch_interval_ms,
        "refresh round starting"
    );

    let mut timer = tokio::time::interval(Duration::from_millis(settings.queue_fetch_interval_ms));
    loop {
        timer.tick().await;
        let now = now_ms();

        // A limited gate drops the tick entirely; nothing is dequeued.
        if service.is_limited(now) {
            tracing::info!("rate limit window active, tick dropped");
            continue;
        }

        let Some(account_id) = queue.tick() else {
            if queue.state() == QueueState::Stopped {
                break;
            }
            continue;
        };

        match service.refresh_account(&account_id, now).await {
            Ok(RefreshOutcome::Refreshed) => {
                queue.complete(&account_id, EntryStatus::Completed)?;
            }
            Ok(RefreshOutcome::RateLimited) => {
                queue.complete(&account_id, EntryStatus::Error)?;
            }
            Ok(RefreshOutcome::Failed(message)) => {
                tracing::warn!(%account_id, %message, "refresh failed");
                queue.complete(&account_id, EntryStatus::Error)?;
            }
            Ok(RefreshOutcome::Refused) | Ok(RefreshOutcome::AlreadyInFlight) => {
                // Nothing happened; the entry goes back to pending.
                queue.requeue(&account_id)?;
            }
            Err(e) => {
                tracing::error!(%account_id, error = %e, "refresh aborted");
                queue.complete(&account_id, EntryStatus::Error)?;
            }
        }
    }

    tracing::info!("Refresh round complete, shutting down");
    Ok(())
}
