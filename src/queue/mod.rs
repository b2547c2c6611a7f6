//! Refresh Queue Scheduler: sequential, pausable, skippable refresh rounds.
//!
//! The queue is a pure state machine; it owns no timer and issues no
//! fetches. A driver calls [`RefreshQueue::tick`] on its own cadence, runs
//! the refresh for the returned account id, and reports back through
//! [`RefreshQueue::complete`]. That keeps every transition testable with
//! plain assertions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("no queue entry for account: {0}")]
    UnknownAccount(String),

    #[error("cannot {action} entry in status {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: EntryStatus,
    },
}

/// Lifecycle of one queue entry. `Completed`, `Error` and `Skipped` are
/// terminal for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Skipped,
}

impl EntryStatus {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub account_id: String,
    pub display_name: String,
    pub status: EntryStatus,
    /// Estimated refresh time for display, epoch millis.
    pub next_refresh_ms: i64,
}

/// Input for building one round.
#[derive(Debug, Clone)]
pub struct QueueSeed {
    pub account_id: String,
    pub display_name: String,
    pub skipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Stopped,
    Running { paused: bool },
}

#[derive(Debug)]
pub struct RefreshQueue {
    entries: Vec<QueueEntry>,
    state: QueueState,
}

impl RefreshQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            state: QueueState::Stopped,
        }
    }

    /// Build a fresh round from the account list. Seeds flagged as skipped
    /// start (and stay) [`EntryStatus::Skipped`]; everyone else is pending
    /// with an estimated refresh time one interval apart.
    pub fn initialize(&mut self, seeds: &[QueueSeed], interval_ms: u64, now: i64) {
        let mut pending_position: i64 = 0;
        self.entries = seeds
            .iter()
            .map(|seed| {
                let status = if seed.skipped {
                    EntryStatus::Skipped
                } else {
                    EntryStatus::Pending
                };
                let next_refresh_ms = now + pending_position * interval_ms as i64;
                if !seed.skipped {
                    pending_position += 1;
                }
                QueueEntry {
                    account_id: seed.account_id.clone(),
                    display_name: seed.display_name.clone(),
                    status,
                    next_refresh_ms,
                }
            })
            .collect();
        self.state = QueueState::Stopped;
        tracing::debug!(entries = self.entries.len(), "queue initialized");
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Snapshot of all entries, for display.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn start(&mut self) {
        self.state = QueueState::Running { paused: false };
        tracing::info!("queue started");
    }

    /// Stop the round immediately; entry statuses stay as they are.
    pub fn stop(&mut self) {
        self.state = QueueState::Stopped;
        tracing::info!("queue stopped");
    }

    pub fn pause(&mut self) {
        if let QueueState::Running { .. } = self.state {
            self.state = QueueState::Running { paused: true };
        }
    }

    pub fn resume(&mut self) {
        if let QueueState::Running { .. } = self.state {
            self.state = QueueState::Running { paused: false };
        }
    }

    /// Exclude a pending entry from this round.
    pub fn skip(&mut self, account_id: &str) -> Result<(), QueueError> {
        let entry = self.entry_mut(account_id)?;
        match entry.status {
            EntryStatus::Pending => {
                entry.status = EntryStatus::Skipped;
                Ok(())
            }
            status => Err(QueueError::InvalidTransition {
                action: "skip",
                status,
            }),
        }
    }

    /// Put a skipped entry back into the round.
    pub fn unskip(&mut self, account_id: &str) -> Result<(), QueueError> {
        let entry = self.entry_mut(account_id)?;
        match entry.status {
            EntryStatus::Skipped => {
                entry.status = EntryStatus::Pending;
                Ok(())
            }
            status => Err(QueueError::InvalidTransition {
                action: "unskip",
                status,
            }),
        }
    }

    /// Advance one step: promote the first pending entry to processing and
    /// hand its account id to the driver.
    ///
    /// Returns `None` without touching anything when the queue is stopped
    /// or paused, when an entry is still processing (the previous refresh
    /// has not reported back), or when the round is finished. A finished
    /// round stops the queue.
    pub fn tick(&mut self) -> Option<String> {
        match self.state {
            QueueState::Running { paused: false } => {}
            _ => return None,
        }

        if self
            .entries
            .iter()
            .any(|e| e.status == EntryStatus::Processing)
        {
            return None;
        }

        match self
            .entries
            .iter_mut()
            .find(|e| e.status == EntryStatus::Pending)
        {
            Some(entry) => {
                entry.status = EntryStatus::Processing;
                tracing::debug!(account_id = %entry.account_id, "queue entry processing");
                Some(entry.account_id.clone())
            }
            None => {
                self.finish();
                None
            }
        }
    }

    /// Record the terminal status of the entry handed out by [`tick`].
    ///
    /// Finishes the round when nothing non-terminal remains.
    ///
    /// [`tick`]: Self::tick
    pub fn complete(&mut self, account_id: &str, status: EntryStatus) -> Result<(), QueueError> {
        debug_assert!(status.is_terminal());
        let entry = self.entry_mut(account_id)?;
        entry.status = status;

        if self.entries.iter().all(|e| e.status.is_terminal()) {
            self.finish();
        }
        Ok(())
    }

    /// Put a processing entry back to pending, for attempts that were
    /// refused before any work happened (gate limited, already in flight).
    pub fn requeue(&mut self, account_id: &str) -> Result<(), QueueError> {
        let entry = self.entry_mut(account_id)?;
        match entry.status {
            EntryStatus::Processing => {
                entry.status = EntryStatus::Pending;
                Ok(())
            }
            status => Err(QueueError::InvalidTransition {
                action: "requeue",
                status,
            }),
        }
    }

    /// End the round: stop the queue and close out stragglers. Skipped
    /// entries keep their status; anything else non-terminal becomes
    /// completed.
    fn finish(&mut self) {
        for entry in &mut self.entries {
            if !entry.status.is_terminal() {
                entry.status = EntryStatus::Completed;
            }
        }
        self.state = QueueState::Stopped;
        tracing::info!("queue round finished");
    }

    fn entry_mut(&mut self, account_id: &str) -> Result<&mut QueueEntry, QueueError> {
        self.entries
            .iter_mut()
            .find(|e| e.account_id == account_id)
            .ok_or_else(|| QueueError::UnknownAccount(account_id.to_string()))
    }
}

impl Default for RefreshQueue {
    fn default() -> Self {
        Self::new()
    }
}
