//! Typed parsing helpers shared by the field mappers.
//!
//! The provider serializes everything as strings; these helpers apply the
//! grammar rules once so the per-record mappers stay declarative.

use crate::models::{Item, RawNode};

/// Parse a decimal integer, falling back to `default` for absent or
/// malformed input.
pub fn parse_int_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Case-insensitive boolean: `"true"` (any casing) is true, everything else
/// including absence is false.
pub fn parse_bool(raw: Option<&str>) -> bool {
    raw.is_some_and(|s| s.trim().eq_ignore_ascii_case("true"))
}

/// Parse the item-list grammar `id[#extra](,id[#extra])*`.
///
/// Each comma-separated token is an item id optionally followed by a `#`
/// suffix, which is dropped. Tokens that do not start with a valid integer
/// are dropped entirely rather than poisoning the list.
pub fn parse_item_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|token| {
            let id = token.split('#').next().unwrap_or("");
            id.trim().parse::<i64>().ok()
        })
        .collect()
}

/// Parse the quick-slot grammar `id|amount(,id|amount)*`.
///
/// The amount defaults to 1 when the `|amount` part is absent or does not
/// parse. Empty tokens are skipped.
pub fn parse_quick_slots(raw: &str) -> Vec<Item> {
    raw.split(',')
        .filter_map(|token| {
            let mut parts = token.split('|');
            let id = parts.next().unwrap_or("").trim();
            if id.is_empty() {
                return None;
            }
            let item_id = id.parse::<i64>().ok()?;
            let amount = parts
                .next()
                .and_then(|a| a.trim().parse::<u64>().ok())
                .unwrap_or(1);
            Some(Item { item_id, amount })
        })
        .collect()
}

/// Parse a provider class id, which arrives either as a decimal string or
/// hex-like with an `0x` prefix (`"0x0300"`). Unparseable input yields
/// `None` so callers never treat garbage as a matching class.
pub fn parse_class_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse::<i64>().ok()
    }
}

/// Parse a chest node: either one item-list string or an array of them,
/// flattened in order. Sentinel `-1` slots are kept so positions survive.
pub fn parse_chest(node: Option<&RawNode>) -> Vec<i64> {
    crate::models::coerce_list(node)
        .into_iter()
        .filter_map(|chest| chest.text())
        .flat_map(parse_item_list)
        .collect()
}
