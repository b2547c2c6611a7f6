//! Data models for realmstash.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`RawNode`]: generic normalized form of a provider XML document
//! - [`Account`], [`Character`], [`AccountSnapshot`]: the mapped domain model
//! - [`StoredAccount`]: the persisted account record (credentials + snapshot)
//! - [`UserConfig`]/[`Settings`]: YAML user configuration
//!
//! All domain structs derive `Serialize`/`Deserialize`; the store persists
//! them as JSON and the config layer as YAML.

pub mod account;
pub mod config;
pub mod raw;

pub use account::{
    Account, AccountSnapshot, Character, CharacterStats, ClassStat, EMPTY_SLOT, ExaltRecord, Item,
    PetAbility, PetInfo, StarInfo, StoredAccount,
};
pub use config::{Settings, UserConfig};
pub use raw::{RawNode, coerce_list};
