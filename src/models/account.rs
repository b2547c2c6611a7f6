//! Domain models for accounts, characters and their derived views.
//!
//! Everything here is plain data with serde derives; the mapping layer
//! builds these from [`crate::models::RawNode`] trees and the store
//! persists [`StoredAccount`] lists as JSON.

use serde::{Deserialize, Serialize};

/// Slot marker for "nothing equipped / stored here".
pub const EMPTY_SLOT: i64 = -1;

/// An item id paired with a stored amount.
///
/// Used both for quick slots (amount parsed from the wire) and for the
/// aggregated count views (amount = occurrence count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: i64,
    pub amount: u64,
}

/// Core combat stats of a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub max_hp: i64,
    pub hp: i64,
    pub max_mp: i64,
    pub mp: i64,
    pub attack: i64,
    pub defense: i64,
    pub speed: i64,
    pub dexterity: i64,
    pub vitality: i64,
    pub wisdom: i64,
}

/// One pet ability (up to three per pet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetAbility {
    pub ability_type: i64,
    pub power: i64,
    pub points: i64,
}

/// Pet attached to a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetInfo {
    pub instance_id: i64,
    pub pet_type: i64,
    pub skin_id: i64,
    pub shader_id: i64,
    pub rarity: i64,
    pub max_ability_power: i64,
    pub abilities: Vec<PetAbility>,
}

/// One character on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub class_id: i64,
    pub seasonal: bool,
    pub level: i64,
    pub exp: i64,
    pub fame: i64,
    /// Equipped item ids in slot order; [`EMPTY_SLOT`] marks empty slots.
    pub equipment: Vec<i64>,
    pub quick_slots: Vec<Item>,
    pub stats: CharacterStats,
    pub health_stack_count: i64,
    pub magic_stack_count: i64,
    pub backpack_slots: i64,
    pub dead: bool,
    pub pet: Option<PetInfo>,
}

/// Per-class best results reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStat {
    /// Provider-formatted class id, usually hex-like (`"0x0300"`).
    pub class_id: String,
    pub best_level: i64,
    pub best_base_fame: i64,
    pub best_total_fame: i64,
}

/// Star rating derived from per-class best base fame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarInfo {
    pub stars: u32,
    pub color: String,
}

/// Per-class exaltation progress: eight stat deltas in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExaltRecord {
    pub class_id: i64,
    pub deltas: Vec<i64>,
}

/// Account-level data mapped from one provider snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub credits: i64,
    pub fortune_tokens: i64,
    pub fame: i64,
    pub best_char_fame: i64,
    pub total_fame: i64,
    pub max_num_chars: i64,
    pub guild_name: String,
    pub guild_rank: i64,
    /// Raw vault slot ids in chest order, [`EMPTY_SLOT`] included.
    pub vault: Vec<i64>,
    pub material_storage: Vec<i64>,
    pub gifts: Vec<i64>,
    pub seasonal_spoils: Vec<i64>,
    pub potions: Vec<i64>,
    pub class_stats: Vec<ClassStat>,
    /// Every distinct item id seen anywhere on the account.
    pub unique_items: Vec<i64>,
    /// Stored item count across all sources, sentinel slots excluded.
    pub total_items: u64,
    pub star_info: StarInfo,
    pub total_alive_fame: i64,
    /// Compact count views (first-seen order) for display models.
    pub vault_counts: Vec<Item>,
    pub material_counts: Vec<Item>,
    pub gift_counts: Vec<Item>,
    pub seasonal_counts: Vec<Item>,
    pub potion_totals: Vec<Item>,
    pub consumables: Vec<Item>,
}

/// The full mapped result of one snapshot fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub account: Option<Account>,
    pub characters: Vec<Character>,
    pub exalts: Option<Vec<ExaltRecord>>,
    pub next_char_id: i64,
    pub max_num_chars: i64,
}

/// An account as kept in the persistent store.
///
/// `snapshot` holds the last successful fetch; a failed refresh sets
/// `error` but leaves the stale snapshot in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAccount {
    pub id: String,
    pub guid: String,
    /// Opaque credential, passed through to the fetcher unchanged.
    pub password: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub last_saved: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub snapshot: Option<AccountSnapshot>,
}

impl StoredAccount {
    pub fn display_name(&self) -> &str {
        match self.snapshot.as_ref().and_then(|s| s.account.as_ref()) {
            Some(account) if !account.name.is_empty() => &account.name,
            _ => &self.guid,
        }
    }
}
