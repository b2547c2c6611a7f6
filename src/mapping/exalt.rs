//! Exaltation progress mapping.

use crate::models::{ExaltRecord, RawNode, coerce_list};

/// Map a `PowerUpStats` node into per-class exaltation records.
///
/// Returns `None` when the node is absent or null, which is how the
/// provider reports an account that has never exalted anything. Each
/// `ClassStats` entry carries a decimal class id attribute and a comma
/// list of eight stat deltas in its text; malformed deltas become 0.
pub fn map_exalts(node: Option<&RawNode>) -> Option<Vec<ExaltRecord>> {
    let node = node?;
    if node.is_null() {
        return None;
    }

    let records = coerce_list(node.get("ClassStats"))
        .into_iter()
        .filter_map(|stats| {
            let class_id = stats.field_text("class")?.trim().parse::<i64>().ok()?;
            let deltas = stats
                .text()
                .map(|text| {
                    text.split(',')
                        .map(|d| d.trim().parse::<i64>().unwrap_or(0))
                        .collect()
                })
                .unwrap_or_default();
            Some(ExaltRecord { class_id, deltas })
        })
        .collect();

    Some(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::normalize;

    #[test]
    fn test_map_exalts_multiple_classes() {
        let doc = normalize(
            "<PowerUpStats>\
                <ClassStats class=\"768\">1,2,0,0,3,0,0,5</ClassStats>\
                <ClassStats class=\"784\">0,0,0,0,0,0,0,1</ClassStats>\
            </PowerUpStats>",
        )
        .unwrap();

        let records = map_exalts(doc.get("PowerUpStats")).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].class_id, 768);
        assert_eq!(records[0].deltas, vec![1, 2, 0, 0, 3, 0, 0, 5]);
        assert_eq!(records[1].class_id, 784);
    }

    #[test]
    fn test_single_class_coerces() {
        let doc = normalize("<PowerUpStats><ClassStats class=\"768\">1,1,1,1,1,1,1,1</ClassStats></PowerUpStats>")
            .unwrap();
        let records = map_exalts(doc.get("PowerUpStats")).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_absent_node_is_none() {
        assert!(map_exalts(None).is_none());
        assert!(map_exalts(Some(&RawNode::Null)).is_none());
    }

    #[test]
    fn test_malformed_deltas_become_zero() {
        let doc = normalize("<PowerUpStats><ClassStats class=\"768\">1,x,3</ClassStats></PowerUpStats>")
            .unwrap();
        let records = map_exalts(doc.get("PowerUpStats")).unwrap();
        assert_eq!(records[0].deltas, vec![1, 0, 3]);
    }
}
