//! XML Normalizer: provider XML documents into generic [`RawNode`] trees.
//!
//! The provider serializes the same element as a scalar, a map or an array
//! depending on how many children happen to be present, so the normalizer
//! applies a fixed set of shape rules and leaves field interpretation to the
//! mapping layer:
//!
//! - whitespace-only text is discarded
//! - a single text child of an attribute-less element collapses to a scalar
//! - attributes become string entries of the element map
//! - text alongside attributes lands under the `#text` key (`#cdata` for
//!   CDATA sections)
//! - a tag repeated under one parent promotes the entry to an array on the
//!   second occurrence, preserving document order
//! - an element mixing child elements and non-whitespace text collapses to
//!   its raw inner XML as one string
//! - an element with no attributes and no children is null
//!
//! Text content is escaped for `\`, `"`, newline and carriage return so the
//! output is safe to embed in JSON payloads downstream.

use crate::models::RawNode;
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Errors surfaced while normalizing a provider document.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("document contains no root element")]
    MissingRoot,
}

/// Parsed element before shape folding.
#[derive(Debug, Clone)]
struct DomElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<DomChild>,
}

#[derive(Debug, Clone)]
enum DomChild {
    Element(DomElement),
    Text(String),
    CData(String),
}

/// Normalize one XML document into a [`RawNode`] tree.
///
/// The result is an element map with a single entry keyed by the root tag
/// name, matching how consumers address the document (`doc.get("Chars")`).
///
/// # Errors
///
/// Returns [`XmlError::Parse`] for malformed input and
/// [`XmlError::MissingRoot`] when no element is present at all.
pub fn normalize(input: &str) -> Result<RawNode, XmlError> {
    let root = parse_document(input)?;
    let mut map = IndexMap::new();
    let name = root.name.clone();
    map.insert(name, fold(&root));
    Ok(RawNode::Element(map))
}

fn parse_document(input: &str) -> Result<DomElement, XmlError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<DomElement> = Vec::new();
    let mut root: Option<DomElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let elem = element_from_start(&start)?;
                attach(&mut stack, &mut root, elem);
            }
            Event::End(_) => {
                if let Some(elem) = stack.pop() {
                    attach(&mut stack, &mut root, elem);
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let value = text.unescape()?.into_owned();
                    parent.children.push(DomChild::Text(value));
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    parent.children.push(DomChild::CData(value));
                }
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    root.ok_or(XmlError::MissingRoot)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<DomElement, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(DomElement {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn attach(stack: &mut Vec<DomElement>, root: &mut Option<DomElement>, elem: DomElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(DomChild::Element(elem));
    } else if root.is_none() {
        *root = Some(elem);
    }
}

/// Apply the shape rules to one parsed element.
fn fold(elem: &DomElement) -> RawNode {
    let mut child_elements: Vec<&DomElement> = Vec::new();
    let mut texts: Vec<&str> = Vec::new();
    let mut cdatas: Vec<&str> = Vec::new();

    for child in &elem.children {
        match child {
            DomChild::Element(e) => child_elements.push(e),
            DomChild::Text(t) => {
                if !t.trim().is_empty() {
                    texts.push(t);
                }
            }
            DomChild::CData(c) => cdatas.push(c),
        }
    }

    // Mixed element and text content defeats the map shape entirely; the
    // whole body is kept as one raw XML string.
    if !child_elements.is_empty() && (!texts.is_empty() || !cdatas.is_empty()) {
        return RawNode::Text(escape(&serialize_children(&elem.children)));
    }

    let has_attrs = !elem.attrs.is_empty();

    if child_elements.is_empty() {
        let text = escape(&texts.concat());
        let cdata = escape(&cdatas.concat());

        if !has_attrs {
            if !texts.is_empty() {
                return RawNode::Text(text);
            }
            if !cdatas.is_empty() {
                return RawNode::Text(cdata);
            }
            return RawNode::Null;
        }

        let mut map = attr_map(elem);
        if !texts.is_empty() {
            map.insert("#text".to_string(), RawNode::Text(text));
        } else if !cdatas.is_empty() {
            map.insert("#cdata".to_string(), RawNode::Text(cdata));
        }
        return RawNode::Element(map);
    }

    let mut map = attr_map(elem);
    for child in child_elements {
        let folded = fold(child);
        match map.get_mut(&child.name) {
            None => {
                map.insert(child.name.clone(), folded);
            }
            Some(RawNode::List(items)) => items.push(folded),
            Some(existing) => {
                let first = std::mem::replace(existing, RawNode::Null);
                *existing = RawNode::List(vec![first, folded]);
            }
        }
    }
    RawNode::Element(map)
}

fn attr_map(elem: &DomElement) -> IndexMap<String, RawNode> {
    elem.attrs
        .iter()
        .map(|(k, v)| (k.clone(), RawNode::Text(escape(v))))
        .collect()
}

/// Reconstruct the inner XML of a mixed-content element.
fn serialize_children(children: &[DomChild]) -> String {
    let mut out = String::new();
    for child in children {
        match child {
            DomChild::Text(t) => out.push_str(t),
            DomChild::CData(c) => {
                out.push_str("<![CDATA[");
                out.push_str(c);
                out.push_str("]]>");
            }
            DomChild::Element(e) => {
                out.push('<');
                out.push_str(&e.name);
                for (k, v) in &e.attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                if e.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    out.push_str(&serialize_children(&e.children));
                    out.push_str("</");
                    out.push_str(&e.name);
                    out.push('>');
                }
            }
        }
    }
    out
}

/// Escape text content for embedding in JSON-like payloads.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}
