//! Aggregation engine: pure functions deriving count views and summaries
//! from mapped accounts and characters.
//!
//! Everything here takes references and allocates fresh output; calling a
//! function twice with the same input yields identical results.

use crate::mapping::util::parse_class_id;
use crate::models::{Account, Character, ClassStat, EMPTY_SLOT, Item};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical consumable item ids, in display order.
pub const CONSUMABLE_IDS: [i64; 10] = [
    0x0a22, 0x0a23, 0x0a34, 0x0a35, 0x0ab3, 0x0ab4, 0x0c4b, 0x0c4c, 0x0c4d, 0x0c4e,
];

/// Per-class roll-up over the characters of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub class_id: i64,
    pub character_count: u64,
    pub highest_alive_fame: i64,
    pub total_alive_fame: i64,
    /// Average alive fame per character, rounded up.
    pub average_fame: i64,
    /// Best base fame recorded for the class, covering dead characters.
    pub highest_dead_fame: i64,
}

/// Multiset of item ids across every storage source of one account.
///
/// Vault, gifts, seasonal spoils, material storage, potions and character
/// equipment contribute one count per occurrence; quick slots contribute
/// their stored amount, except the [`EMPTY_SLOT`] sentinel which always
/// counts as one regardless of the amount attached to it.
pub fn item_totals(account: &Account, characters: &[Character]) -> BTreeMap<i64, u64> {
    let mut totals = BTreeMap::new();

    let plain_sources = [
        &account.vault,
        &account.gifts,
        &account.seasonal_spoils,
        &account.material_storage,
        &account.potions,
    ];
    for source in plain_sources {
        for &id in source.iter() {
            *totals.entry(id).or_insert(0) += 1;
        }
    }

    for character in characters {
        for &id in &character.equipment {
            *totals.entry(id).or_insert(0) += 1;
        }
        for slot in &character.quick_slots {
            let amount = if slot.item_id == EMPTY_SLOT {
                1
            } else {
                slot.amount
            };
            *totals.entry(slot.item_id).or_insert(0) += amount;
        }
    }

    totals
}

/// Sum of [`item_totals`] across several accounts.
pub fn cross_account_totals<'a, I>(accounts: I) -> BTreeMap<i64, u64>
where
    I: IntoIterator<Item = (&'a Account, &'a [Character])>,
{
    let mut combined = BTreeMap::new();
    for (account, characters) in accounts {
        for (id, count) in item_totals(account, characters) {
            *combined.entry(id).or_insert(0) += count;
        }
    }
    combined
}

/// Count the consumables among `items` and `quick_slots`, returning one
/// entry per consumable id actually present, in canonical id order.
///
/// Plain item occurrences count one each; quick slots contribute their
/// stored amounts.
pub fn consumables(items: &[i64], quick_slots: &[Item], consumable_ids: &[i64]) -> Vec<Item> {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();

    for &id in items {
        if consumable_ids.contains(&id) {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    for slot in quick_slots {
        if consumable_ids.contains(&slot.item_id) {
            *counts.entry(slot.item_id).or_insert(0) += slot.amount;
        }
    }

    consumable_ids
        .iter()
        .filter_map(|id| {
            counts.get(id).map(|&amount| Item {
                item_id: *id,
                amount,
            })
        })
        .collect()
}

/// Group potion ids into counts, sorted by item id descending.
///
/// Sentinel and zero ids are dropped; they mark empty slots, not potions.
pub fn potion_totals(potion_ids: &[i64]) -> Vec<Item> {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for &id in potion_ids {
        if id > 0 {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .rev()
        .map(|(item_id, amount)| Item { item_id, amount })
        .collect()
}

/// Compact a raw slot list into per-id counts in first-seen order,
/// dropping empty-slot sentinels and zero ids.
pub fn compact_counts(ids: &[i64]) -> Vec<Item> {
    let mut out: Vec<Item> = Vec::new();
    for &id in ids {
        if id == EMPTY_SLOT || id == 0 {
            continue;
        }
        match out.iter_mut().find(|item| item.item_id == id) {
            Some(item) => item.amount += 1,
            None => out.push(Item { item_id: id, amount: 1 }),
        }
    }
    out
}

/// Roll up characters by class, enriched with the per-class best fame from
/// the account's class stats.
///
/// Only classes with at least one character appear. The class-stat match
/// tolerates the provider's hex-like id format; an id that does not parse
/// simply never matches.
pub fn class_summary(characters: &[Character], class_stats: &[ClassStat]) -> Vec<ClassSummary> {
    let mut summaries: Vec<ClassSummary> = Vec::new();

    for character in characters {
        let summary = match summaries
            .iter_mut()
            .find(|s| s.class_id == character.class_id)
        {
            Some(existing) => existing,
            None => {
                summaries.push(ClassSummary {
                    class_id: character.class_id,
                    character_count: 0,
                    highest_alive_fame: 0,
                    total_alive_fame: 0,
                    average_fame: 0,
                    highest_dead_fame: 0,
                });
                summaries.last_mut().unwrap()
            }
        };

        summary.character_count += 1;
        if !character.dead {
            summary.total_alive_fame += character.fame;
            summary.highest_alive_fame = summary.highest_alive_fame.max(character.fame);
        }
    }

    for summary in &mut summaries {
        let n = summary.character_count as i64;
        summary.average_fame = (summary.total_alive_fame + n - 1) / n;
        summary.highest_dead_fame = class_stats
            .iter()
            .filter(|cs| parse_class_id(&cs.class_id) == Some(summary.class_id))
            .map(|cs| cs.best_base_fame)
            .max()
            .unwrap_or(0);
    }

    summaries
}

/// Total alive fame across all characters.
pub fn total_alive_fame(characters: &[Character]) -> i64 {
    characters
        .iter()
        .filter(|c| !c.dead)
        .map(|c| c.fame)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CharacterStats, StarInfo};

    fn empty_account() -> Account {
        Account {
            id: "a1".to_string(),
            name: "Tester".to_string(),
            credits: 0,
            fortune_tokens: 0,
            fame: 0,
            best_char_fame: 0,
            total_fame: 0,
            max_num_chars: 1,
            guild_name: String::new(),
            guild_rank: 0,
            vault: Vec::new(),
            material_storage: Vec::new(),
            gifts: Vec::new(),
            seasonal_spoils: Vec::new(),
            potions: Vec::new(),
            class_stats: Vec::new(),
            unique_items: Vec::new(),
            total_items: 0,
            star_info: StarInfo {
                stars: 0,
                color: "#8a98de".to_string(),
            },
            total_alive_fame: 0,
            vault_counts: Vec::new(),
            material_counts: Vec::new(),
            gift_counts: Vec::new(),
            seasonal_counts: Vec::new(),
            potion_totals: Vec::new(),
            consumables: Vec::new(),
        }
    }

    fn character(quick_slots: Vec<Item>, equipment: Vec<i64>) -> Character {
        Character {
            id: 1,
            class_id: 768,
            seasonal: false,
            level: 20,
            exp: 0,
            fame: 0,
            equipment,
            quick_slots,
            stats: CharacterStats::default(),
            health_stack_count: 0,
            magic_stack_count: 0,
            backpack_slots: 0,
            dead: false,
            pet: None,
        }
    }

    #[test]
    fn test_item_totals_counts_all_sources() {
        let mut account = empty_account();
        account.vault = vec![100, 100, 200];
        account.gifts = vec![200];
        account.potions = vec![2594];

        let characters = vec![character(
            vec![Item { item_id: 2594, amount: 5 }],
            vec![100, -1],
        )];

        let totals = item_totals(&account, &characters);
        assert_eq!(totals[&100], 3);
        assert_eq!(totals[&200], 2);
        assert_eq!(totals[&2594], 6);
        assert_eq!(totals[&-1], 1);
    }

    #[test]
    fn test_empty_slot_quick_slot_counts_once() {
        let account = empty_account();
        let characters = vec![character(
            vec![Item { item_id: EMPTY_SLOT, amount: 7 }],
            Vec::new(),
        )];

        let totals = item_totals(&account, &characters);
        assert_eq!(totals[&EMPTY_SLOT], 1);
    }

    #[test]
    fn test_item_totals_is_deterministic() {
        let mut account = empty_account();
        account.vault = vec![5, 6, 5];
        let characters = vec![character(Vec::new(), vec![7])];

        let first = item_totals(&account, &characters);
        let second = item_totals(&account, &characters);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cross_account_totals_sums_accounts() {
        let mut a = empty_account();
        a.vault = vec![100];
        let mut b = empty_account();
        b.vault = vec![100, 200];

        let none: Vec<Character> = Vec::new();
        let totals = cross_account_totals(vec![(&a, none.as_slice()), (&b, none.as_slice())]);
        assert_eq!(totals[&100], 2);
        assert_eq!(totals[&200], 1);
    }

    #[test]
    fn test_consumables_follow_canonical_order() {
        let items = vec![30, 10, 10];
        let quick_slots = vec![Item { item_id: 20, amount: 4 }];
        let canonical = [10, 20, 30, 40];

        let result = consumables(&items, &quick_slots, &canonical);
        assert_eq!(
            result,
            vec![
                Item { item_id: 10, amount: 2 },
                Item { item_id: 20, amount: 4 },
                Item { item_id: 30, amount: 1 },
            ]
        );
    }

    #[test]
    fn test_potion_totals_sorted_descending() {
        let totals = potion_totals(&[2594, 2591, 2594, -1, 0]);
        assert_eq!(
            totals,
            vec![
                Item { item_id: 2594, amount: 2 },
                Item { item_id: 2591, amount: 1 },
            ]
        );
    }

    #[test]
    fn test_compact_counts_first_seen_order() {
        let counts = compact_counts(&[7, -1, 3, 7, 0, 3, 7]);
        assert_eq!(
            counts,
            vec![
                Item { item_id: 7, amount: 3 },
                Item { item_id: 3, amount: 2 },
            ]
        );
    }

    #[test]
    fn test_class_summary_average_rounds_up() {
        let mut alive_a = character(Vec::new(), Vec::new());
        alive_a.fame = 5;
        let mut alive_b = character(Vec::new(), Vec::new());
        alive_b.id = 2;
        alive_b.fame = 4;

        let summaries = class_summary(&[alive_a, alive_b], &[]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].character_count, 2);
        assert_eq!(summaries[0].total_alive_fame, 9);
        assert_eq!(summaries[0].average_fame, 5);
        assert_eq!(summaries[0].highest_alive_fame, 5);
    }

    #[test]
    fn test_class_summary_matches_hex_class_stat() {
        let mut c = character(Vec::new(), Vec::new());
        c.class_id = 768;
        c.fame = 10;

        let stats = vec![ClassStat {
            class_id: "0x0300".to_string(),
            best_level: 20,
            best_base_fame: 2200,
            best_total_fame: 3000,
        }];

        let summaries = class_summary(&[c], &stats);
        assert_eq!(summaries[0].highest_dead_fame, 2200);
    }

    #[test]
    fn test_class_summary_unparseable_stat_never_matches() {
        let mut c = character(Vec::new(), Vec::new());
        c.class_id = 768;

        let stats = vec![ClassStat {
            class_id: "wizard".to_string(),
            best_level: 20,
            best_base_fame: 999,
            best_total_fame: 999,
        }];

        let summaries = class_summary(&[c], &stats);
        assert_eq!(summaries[0].highest_dead_fame, 0);
    }

    #[test]
    fn test_dead_characters_excluded_from_alive_fame() {
        let mut alive = character(Vec::new(), Vec::new());
        alive.fame = 100;
        let mut dead = character(Vec::new(), Vec::new());
        dead.id = 2;
        dead.fame = 900;
        dead.dead = true;

        assert_eq!(total_alive_fame(&[alive.clone(), dead.clone()]), 100);
        let summaries = class_summary(&[alive, dead], &[]);
        assert_eq!(summaries[0].character_count, 2);
        assert_eq!(summaries[0].highest_alive_fame, 100);
    }
}
