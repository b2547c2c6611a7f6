//! Account record mapping, including the derived count views.

use crate::aggregate::{CONSUMABLE_IDS, compact_counts, consumables, potion_totals, total_alive_fame};
use crate::mapping::stars::star_info;
use crate::mapping::util::{parse_chest, parse_int_or, parse_item_list};
use crate::models::{Account, Character, ClassStat, EMPTY_SLOT, Item, RawNode, coerce_list};
use std::collections::BTreeSet;

/// Map the `Account` node of a charlist document.
///
/// Returns `None` for an absent or null node, which callers surface as a
/// distinct "no account data" condition rather than an account with
/// all-zero stats. `characters` must already be mapped because several
/// derived fields (alive fame, consumables, totals) span both.
pub fn map_account(node: Option<&RawNode>, characters: &[Character]) -> Option<Account> {
    let node = node?;
    if node.is_null() {
        return None;
    }

    let stats = node.get("Stats");
    let class_stats = map_class_stats(stats);

    let vault = parse_chest(node.get("Vault").and_then(|v| v.get("Chest")));
    let material_storage = parse_chest(node.get("MaterialStorage").and_then(|m| m.get("Chest")));
    let gifts = node
        .field_text("Gifts")
        .map(parse_item_list)
        .unwrap_or_default();
    let seasonal_spoils = node
        .field_text("TemporaryGifts")
        .map(parse_item_list)
        .unwrap_or_default();
    let potions = node
        .field_text("Potions")
        .map(parse_item_list)
        .unwrap_or_default();

    let guild = node.get("Guild");
    let guild_name = guild
        .and_then(|g| g.field_text("Name"))
        .unwrap_or_default()
        .to_string();
    let guild_rank = parse_int_or(guild.and_then(|g| g.field_text("Rank")), 0);

    let equipment: Vec<i64> = characters
        .iter()
        .flat_map(|c| c.equipment.iter().copied())
        .collect();
    let quick_slots: Vec<Item> = characters
        .iter()
        .flat_map(|c| c.quick_slots.iter().copied())
        .collect();

    let all_plain_ids: Vec<i64> = vault
        .iter()
        .chain(&material_storage)
        .chain(&gifts)
        .chain(&seasonal_spoils)
        .chain(&potions)
        .chain(&equipment)
        .copied()
        .collect();

    let unique_items: Vec<i64> = all_plain_ids
        .iter()
        .copied()
        .chain(quick_slots.iter().map(|s| s.item_id))
        .filter(|&id| id != EMPTY_SLOT)
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect();

    // Potion storage is not part of the stored-item count.
    let total_items = count_stored(&vault)
        + count_stored(&material_storage)
        + gifts.len() as u64
        + seasonal_spoils.len() as u64
        + count_stored(&equipment)
        + quick_slots
            .iter()
            .filter(|s| s.item_id != EMPTY_SLOT)
            .map(|s| s.amount)
            .sum::<u64>();

    let star_info = star_info(&class_stats);

    Some(Account {
        id: node.field_text("AccountId").unwrap_or_default().to_string(),
        name: node.field_text("Name").unwrap_or_default().to_string(),
        credits: parse_int_or(node.field_text("Credits"), 0),
        fortune_tokens: parse_int_or(node.field_text("FortuneToken"), 0),
        fame: parse_int_or(stats.and_then(|s| s.field_text("Fame")), 0),
        best_char_fame: parse_int_or(stats.and_then(|s| s.field_text("BestCharFame")), 0),
        total_fame: parse_int_or(stats.and_then(|s| s.field_text("TotalFame")), 0),
        max_num_chars: parse_int_or(node.field_text("MaxNumChars"), 1),
        guild_name,
        guild_rank,
        vault_counts: compact_counts(&vault),
        material_counts: compact_counts(&material_storage),
        gift_counts: compact_counts(&gifts),
        seasonal_counts: compact_counts(&seasonal_spoils),
        potion_totals: potion_totals(&potions),
        consumables: consumables(&all_plain_ids, &quick_slots, &CONSUMABLE_IDS),
        vault,
        material_storage,
        gifts,
        seasonal_spoils,
        potions,
        class_stats,
        unique_items,
        total_items,
        star_info,
        total_alive_fame: total_alive_fame(characters),
    })
}

fn map_class_stats(stats: Option<&RawNode>) -> Vec<ClassStat> {
    coerce_list(stats.and_then(|s| s.get("ClassStats")))
        .into_iter()
        .filter_map(|cs| {
            let class_id = cs.field_text("objectType")?.to_string();
            Some(ClassStat {
                class_id,
                best_level: parse_int_or(cs.field_text("BestLevel"), 0),
                best_base_fame: parse_int_or(cs.field_text("BestBaseFame"), 0),
                best_total_fame: parse_int_or(cs.field_text("BestTotalFame"), 0),
            })
        })
        .collect()
}

/// Stored item count of a raw slot list, empty-slot sentinels excluded.
fn count_stored(ids: &[i64]) -> u64 {
    ids.iter().filter(|&&id| id != EMPTY_SLOT).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::normalize;

    const ACCOUNT_XML: &str = r#"
        <Account>
            <Credits>1200</Credits>
            <FortuneToken>15</FortuneToken>
            <AccountId>abc123</AccountId>
            <Name>Tester</Name>
            <MaxNumChars>3</MaxNumChars>
            <Vault>
                <Chest>100,100,-1</Chest>
                <Chest>200</Chest>
            </Vault>
            <MaterialStorage>
                <Chest>300,-1</Chest>
            </MaterialStorage>
            <Gifts>400,401</Gifts>
            <TemporaryGifts>500</TemporaryGifts>
            <Potions>2594,2594,2591</Potions>
            <Guild id="77">
                <Name>TestGuild</Name>
                <Rank>30</Rank>
            </Guild>
            <Stats>
                <ClassStats objectType="0x0300">
                    <BestLevel>20</BestLevel>
                    <BestBaseFame>2200</BestBaseFame>
                    <BestTotalFame>3000</BestTotalFame>
                </ClassStats>
                <BestCharFame>620</BestCharFame>
                <TotalFame>41000</TotalFame>
                <Fame>1800</Fame>
            </Stats>
        </Account>"#;

    #[test]
    fn test_map_full_account() {
        let doc = normalize(ACCOUNT_XML).unwrap();
        let account = map_account(doc.get("Account"), &[]).unwrap();

        assert_eq!(account.id, "abc123");
        assert_eq!(account.name, "Tester");
        assert_eq!(account.credits, 1200);
        assert_eq!(account.fortune_tokens, 15);
        assert_eq!(account.max_num_chars, 3);
        assert_eq!(account.guild_name, "TestGuild");
        assert_eq!(account.guild_rank, 30);
        assert_eq!(account.vault, vec![100, 100, -1, 200]);
        assert_eq!(account.material_storage, vec![300, -1]);
        assert_eq!(account.gifts, vec![400, 401]);
        assert_eq!(account.seasonal_spoils, vec![500]);
        assert_eq!(account.fame, 1800);
        assert_eq!(account.best_char_fame, 620);
        assert_eq!(account.total_fame, 41000);
        assert_eq!(account.class_stats.len(), 1);
        assert_eq!(account.class_stats[0].class_id, "0x0300");
        // 2200 base fame reaches the 20/500/1500 thresholds.
        assert_eq!(account.star_info.stars, 3);
    }

    #[test]
    fn test_total_items_excludes_sentinels_and_potions() {
        let doc = normalize(ACCOUNT_XML).unwrap();
        let account = map_account(doc.get("Account"), &[]).unwrap();
        // vault 3 stored + material 1 + gifts 2 + spoils 1; potions do not
        // count as stored items.
        assert_eq!(account.total_items, 7);
    }

    #[test]
    fn test_total_items_covers_character_storage() {
        let doc = normalize(
            "<Chars>\
                <Char id=\"1\">\
                    <ObjectType>768</ObjectType>\
                    <Equipment>100,-1,200</Equipment>\
                    <EquipQS>2594|7,-1|3</EquipQS>\
                </Char>\
                <Account>\
                    <AccountId>a</AccountId>\
                    <Vault><Chest>300,-1</Chest></Vault>\
                    <Gifts>400</Gifts>\
                    <Potions>2591,2591</Potions>\
                </Account>\
            </Chars>",
        )
        .unwrap();
        let snapshot = crate::mapping::map_char_list(&doc);
        let account = snapshot.account.unwrap();
        // vault 1 + gifts 1 + equipment 2 + quick-slot amount 7; the empty
        // quick slot and the potions contribute nothing.
        assert_eq!(account.total_items, 11);
    }

    #[test]
    fn test_unique_items_excludes_empty_slots() {
        let doc = normalize(ACCOUNT_XML).unwrap();
        let account = map_account(doc.get("Account"), &[]).unwrap();
        assert_eq!(
            account.unique_items,
            vec![100, 200, 300, 400, 401, 500, 2591, 2594]
        );
    }

    #[test]
    fn test_derived_count_views() {
        let doc = normalize(ACCOUNT_XML).unwrap();
        let account = map_account(doc.get("Account"), &[]).unwrap();

        assert_eq!(
            account.vault_counts,
            vec![
                Item { item_id: 100, amount: 2 },
                Item { item_id: 200, amount: 1 },
            ]
        );
        assert_eq!(
            account.potion_totals,
            vec![
                Item { item_id: 2594, amount: 2 },
                Item { item_id: 2591, amount: 1 },
            ]
        );
    }

    #[test]
    fn test_absent_account_is_none() {
        assert!(map_account(None, &[]).is_none());
        assert!(map_account(Some(&RawNode::Null), &[]).is_none());
    }
}
