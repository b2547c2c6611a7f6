use indexmap::IndexMap;

/// Generic normalized form of one XML node.
///
/// Produced by [`crate::xml::normalize`] and consumed by the mapping layer;
/// never persisted. The shape deliberately mirrors the provider's loose
/// serialization:
/// - a leaf element with a single text child collapses to [`RawNode::Text`]
/// - attributes become string entries of an [`RawNode::Element`] map
/// - a tag repeated under the same parent folds into a [`RawNode::List`],
///   preserving document order
/// - an element with no attributes and no children is [`RawNode::Null`]
///
/// Because a repeated element serializes as a bare map when it occurs only
/// once, consumers must go through [`RawNode::coerce_list`] before treating
/// anything as a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Null,
    Text(String),
    List(Vec<RawNode>),
    Element(IndexMap<String, RawNode>),
}

impl RawNode {
    /// Look up a child entry (sub-element or attribute) by name.
    pub fn get(&self, key: &str) -> Option<&RawNode> {
        match self {
            RawNode::Element(map) => map.get(key),
            _ => None,
        }
    }

    /// The scalar text carried by this node, if any.
    ///
    /// For an attributed element this is the merged `#text` (or `#cdata`)
    /// entry; for a collapsed leaf it is the text itself.
    pub fn text(&self) -> Option<&str> {
        match self {
            RawNode::Text(s) => Some(s),
            RawNode::Element(map) => match map.get("#text").or_else(|| map.get("#cdata")) {
                Some(RawNode::Text(s)) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    /// Text of a named child entry, combining [`get`](Self::get) and
    /// [`text`](Self::text).
    pub fn field_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|node| node.text())
    }

    /// Whether this node carries no data at all.
    pub fn is_null(&self) -> bool {
        matches!(self, RawNode::Null)
    }

    /// Normalize the single-vs-array ambiguity: a repeated element that
    /// occurred once arrives as a bare map, twice or more as a list. Null
    /// yields an empty slice-like view, anything else a one-element view.
    pub fn coerce_list(&self) -> Vec<&RawNode> {
        match self {
            RawNode::Null => Vec::new(),
            RawNode::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// [`RawNode::coerce_list`] lifted over an optional lookup result, so call
/// sites can write `coerce_list(node.get("Char"))` without unwrapping.
pub fn coerce_list(node: Option<&RawNode>) -> Vec<&RawNode> {
    node.map(RawNode::coerce_list).unwrap_or_default()
}
