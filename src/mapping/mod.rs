//! Domain Mapper: normalized [`RawNode`] documents into typed records.
//!
//! The mappers never fail on missing fields; each field has a documented
//! default so a sparse or truncated document still produces a record.
//! Absence of whole records (`Account`, `PowerUpStats`) maps to `None`.

pub mod account;
pub mod character;
pub mod exalt;
pub mod stars;
pub mod util;

pub use account::map_account;
pub use character::map_character;
pub use exalt::map_exalts;
pub use stars::star_info;

use crate::models::{AccountSnapshot, Character, RawNode, coerce_list};
use util::parse_int_or;

/// Map a full normalized charlist document into an [`AccountSnapshot`].
///
/// Characters are sorted by id; the account record (if present) is derived
/// against the mapped characters so its cross-cutting views line up.
pub fn map_char_list(doc: &RawNode) -> AccountSnapshot {
    let chars_node = doc.get("Chars");

    let mut characters: Vec<Character> = chars_node
        .map(|chars| {
            coerce_list(chars.get("Char"))
                .into_iter()
                .filter_map(map_character)
                .collect()
        })
        .unwrap_or_default();
    characters.sort_by_key(|c| c.id);

    let account = map_account(chars_node.and_then(|c| c.get("Account")), &characters);
    let exalts = map_exalts(chars_node.and_then(|c| c.get("PowerUpStats")));

    AccountSnapshot {
        next_char_id: parse_int_or(chars_node.and_then(|c| c.field_text("nextCharId")), 0),
        max_num_chars: parse_int_or(chars_node.and_then(|c| c.field_text("maxNumChars")), 1),
        account,
        characters,
        exalts,
    }
}
