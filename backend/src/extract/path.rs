//! Node paths selecting record nodes in a document.
//!
//! Two forms are supported:
//!
//! - `//name` - every element named `name`, anywhere in the document
//! - `/root/child/name` - elements reached by walking named children from the root

use roxmltree::{Document, Node};
use std::fmt;
use std::str::FromStr;

use crate::error::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePath {
    Descendants(String),
    Absolute(Vec<String>),
}

impl NodePath {
    pub fn parse(raw: &str) -> Result<Self, ExtractError> {
        let raw = raw.trim();
        let invalid = || ExtractError::InvalidPath(raw.to_string());

        if let Some(name) = raw.strip_prefix("//") {
            if is_valid_name(name) {
                return Ok(NodePath::Descendants(name.to_string()));
            }
            return Err(invalid());
        }

        if let Some(rest) = raw.strip_prefix('/') {
            let segments: Vec<String> = rest.split('/').map(str::to_string).collect();
            if segments.iter().all(|s| is_valid_name(s)) {
                return Ok(NodePath::Absolute(segments));
            }
        }

        Err(invalid())
    }

    /// Matching elements, in document order.
    pub fn select<'a, 'input>(&self, doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
        match self {
            NodePath::Descendants(name) => doc
                .descendants()
                .filter(|n| n.is_element() && n.tag_name().name() == name)
                .collect(),
            NodePath::Absolute(segments) => {
                let root = doc.root_element();
                let mut current = match segments.first() {
                    Some(first) if root.tag_name().name() == first => vec![root],
                    _ => return Vec::new(),
                };
                for segment in &segments[1..] {
                    current = current
                        .iter()
                        .flat_map(|node| node.children())
                        .filter(|n| n.is_element() && n.tag_name().name() == segment)
                        .collect();
                }
                current
            }
        }
    }
}

impl FromStr for NodePath {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodePath::parse(s)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodePath::Descendants(name) => write!(f, "//{}", name),
            NodePath::Absolute(segments) => write!(f, "/{}", segments.join("/")),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = r#"<book><units><unit id="1"/><unit id="2"/></units><extra><unit id="3"/></extra></book>"#;

    #[test]
    fn test_parse_forms() {
        assert_eq!(NodePath::parse("//unit").unwrap(), NodePath::Descendants("unit".into()));
        assert_eq!(
            NodePath::parse("/book/units/unit").unwrap(),
            NodePath::Absolute(vec!["book".into(), "units".into(), "unit".into()])
        );
    }

    #[test]
    fn test_invalid_paths() {
        for raw in ["", "/", "//", "unit", "//unit[@id=1]", "/book//unit", "//1unit"] {
            assert!(
                matches!(NodePath::parse(raw), Err(ExtractError::InvalidPath(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_select_descendants() {
        let doc = Document::parse(BOOK).unwrap();
        let ids: Vec<_> = NodePath::parse("//unit")
            .unwrap()
            .select(&doc)
            .iter()
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_select_absolute() {
        let doc = Document::parse(BOOK).unwrap();
        let path = NodePath::parse("/book/units/unit").unwrap();
        assert_eq!(path.select(&doc).len(), 2);
        assert!(NodePath::parse("/other/unit").unwrap().select(&doc).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(NodePath::parse(" //petSkill ").unwrap().to_string(), "//petSkill");
    }
}
