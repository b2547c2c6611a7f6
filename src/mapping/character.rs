//! Character record mapping from the normalized charlist document.

use crate::mapping::util::{parse_bool, parse_int_or, parse_item_list, parse_quick_slots};
use crate::models::{Character, CharacterStats, PetAbility, PetInfo, RawNode, coerce_list};

/// Map one `Char` node into a [`Character`].
///
/// Returns `None` for a null node; every absent field falls back to its
/// documented default (0 for counters, 1 for level and max pools, -1 for
/// identifiers) so a sparse document still yields a usable record.
pub fn map_character(node: &RawNode) -> Option<Character> {
    if node.is_null() {
        return None;
    }

    let stats = CharacterStats {
        max_hp: parse_int_or(node.field_text("MaxHitPoints"), 1),
        hp: parse_int_or(node.field_text("HitPoints"), 0),
        max_mp: parse_int_or(node.field_text("MaxMagicPoints"), 1),
        mp: parse_int_or(node.field_text("MagicPoints"), 0),
        attack: parse_int_or(node.field_text("Attack"), 0),
        defense: parse_int_or(node.field_text("Defense"), 0),
        speed: parse_int_or(node.field_text("Speed"), 0),
        dexterity: parse_int_or(node.field_text("Dexterity"), 0),
        vitality: parse_int_or(node.field_text("HpRegen"), 0),
        wisdom: parse_int_or(node.field_text("MpRegen"), 0),
    };

    Some(Character {
        id: parse_int_or(node.field_text("id"), -1),
        class_id: parse_int_or(node.field_text("ObjectType"), -1),
        seasonal: parse_bool(node.field_text("Seasonal")),
        level: parse_int_or(node.field_text("Level"), 1),
        exp: parse_int_or(node.field_text("Exp"), 0),
        fame: parse_int_or(node.field_text("CurrentFame"), 0),
        equipment: node
            .field_text("Equipment")
            .map(parse_item_list)
            .unwrap_or_default(),
        quick_slots: node
            .field_text("EquipQS")
            .map(parse_quick_slots)
            .unwrap_or_default(),
        stats,
        health_stack_count: parse_int_or(node.field_text("HealthStackCount"), 0),
        magic_stack_count: parse_int_or(node.field_text("MagicStackCount"), 0),
        backpack_slots: parse_int_or(node.field_text("BackpackSlots"), 0),
        dead: parse_bool(node.field_text("Dead")),
        pet: node.get("Pet").and_then(map_pet),
    })
}

fn map_pet(node: &RawNode) -> Option<PetInfo> {
    if node.is_null() {
        return None;
    }

    let abilities = coerce_list(node.get("Abilities").and_then(|a| a.get("Ability")))
        .into_iter()
        .map(|ability| PetAbility {
            ability_type: parse_int_or(ability.field_text("type"), -1),
            power: parse_int_or(ability.field_text("power"), 0),
            points: parse_int_or(ability.field_text("points"), 0),
        })
        .collect();

    Some(PetInfo {
        instance_id: parse_int_or(node.field_text("instanceId"), -1),
        pet_type: parse_int_or(node.field_text("type"), -1),
        skin_id: parse_int_or(node.field_text("skin"), -1),
        shader_id: parse_int_or(node.field_text("shader"), -1),
        rarity: parse_int_or(node.field_text("rarity"), -1),
        max_ability_power: parse_int_or(node.field_text("maxAbilityPower"), 0),
        abilities,
    })
}
