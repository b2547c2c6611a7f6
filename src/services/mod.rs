//! Services module - business logic for account snapshot refreshing.
//!
//! The services are framework-agnostic: no timers, no UI, only explicit
//! inputs. The binary wires them to a tokio interval; tests drive them
//! directly with fixed clocks and scripted fetchers.
//!
//! # Components
//!
//! - [`AccountFetcher`]: boundary trait producing one raw snapshot body per
//!   credential pair. [`CommandFetcher`] shells out to an external helper;
//!   tests substitute scripted fakes.
//! - [`classify_response`]: sorts a raw body into snapshot, rate-limit
//!   sentinel, network failure or unknown provider error.
//! - [`RefreshService`]: the full refresh pipeline for one account. Checks
//!   the shared rate limit gate before fetching, normalizes and maps
//!   successful responses, and persists the account list after every
//!   attempt so stale data stays readable next to any recorded error.

pub mod fetch;
pub mod refresh;

pub use fetch::{
    AccountFetcher, CommandFetcher, FetchError, RATE_LIMIT_SENTINEL, ResponseKind,
    classify_response,
};
pub use refresh::{NO_ACCOUNT_ERROR, RefreshOutcome, RefreshService};
