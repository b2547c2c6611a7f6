// Realmstash - rate-limit-aware snapshot manager for Realm game accounts
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) provides the scheduler entry point.

pub mod aggregate;
pub mod config;
pub mod gate;
pub mod logging;
pub mod mapping;
pub mod models;
pub mod queue;
pub mod services;
pub mod store;
pub mod xml;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use gate::RateLimitGate;
pub use models::{Account, AccountSnapshot, Character, StoredAccount, UserConfig};
pub use queue::{EntryStatus, QueueSeed, RefreshQueue};
pub use services::{RefreshOutcome, RefreshService};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
