//! XML extraction of source records.
//!
//! A document is decoded with encoding auto-detection, parsed, and every node matched by a
//! [`NodePath`] becomes a JSON object:
//!
//! - attributes, then child elements' text (a child wins over an attribute of the same name)
//! - the node's own text under `value`, when it has no child elements
//! - empty values are left out, so they deserialize as `None`
//!
//! The object is then deserialized into the requested record type. A node that does not
//! deserialize is logged and skipped.

pub mod encoding;
pub mod path;

use roxmltree::{Document, Node};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

use crate::api::logs::log_warning;
use crate::error::{ExtractError, ExtractResult};

pub use encoding::{decode_content, detect_encoding};
pub use path::NodePath;

/// Key holding a node's own text.
pub const TEXT_KEY: &str = "value";

/// Result of extracting one record type from a document
#[derive(Debug)]
pub struct Extraction<S> {
    /// Successfully extracted records, in document order
    pub records: Vec<S>,
    /// Nodes that could not be turned into a record
    pub skipped: Vec<SkippedNode>,
    /// Detected document encoding
    pub encoding: String,
}

/// A matched node that was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedNode {
    /// Position among the matched nodes
    pub index: usize,
    pub reason: String,
}

impl<S> Extraction<S> {
    pub fn summary(&self) -> String {
        format!(
            "Extracted: {} records, {} skipped ({})",
            self.records.len(),
            self.skipped.len(),
            self.encoding
        )
    }
}

/// Read a document from disk, detecting its encoding.
///
/// Returns the decoded text and the detected encoding.
pub fn read_document(file: &Path) -> ExtractResult<(String, String)> {
    let bytes = std::fs::read(file).map_err(|source| ExtractError::Io {
        path: file.display().to_string(),
        source,
    })?;
    let encoding = detect_encoding(&bytes);
    Ok((decode_content(&bytes, &encoding), encoding))
}

/// Every node matched by `path`, as JSON objects.
pub fn extract_nodes(xml: &str, path: &NodePath) -> ExtractResult<Vec<Value>> {
    let doc = Document::parse(xml).map_err(|e| ExtractError::Xml(e.to_string()))?;
    Ok(path.select(&doc).into_iter().map(node_to_json).collect())
}

/// Extract records of type `S` from an XML string.
pub fn extract_records<S: DeserializeOwned>(xml: &str, path: &NodePath) -> ExtractResult<Extraction<S>> {
    let nodes = extract_nodes(xml, path)?;
    let mut extraction = Extraction {
        records: Vec::with_capacity(nodes.len()),
        skipped: Vec::new(),
        encoding: "utf-8".to_string(),
    };

    for (index, node) in nodes.into_iter().enumerate() {
        match serde_json::from_value::<S>(node) {
            Ok(record) => extraction.records.push(record),
            Err(e) => {
                log_warning(format!("Failed to parse node {} at {}: {}", index, path, e));
                extraction.skipped.push(SkippedNode {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(extraction)
}

/// Extract records of type `S` from an XML file.
pub fn extract_file<S: DeserializeOwned>(file: &Path, path: &NodePath) -> ExtractResult<Extraction<S>> {
    let (xml, encoding) = read_document(file)?;
    let mut extraction = extract_records(&xml, path)?;
    extraction.encoding = encoding;
    Ok(extraction)
}

fn node_to_json(node: Node) -> Value {
    let mut object = Map::new();

    for attr in node.attributes() {
        let value = attr.value().trim();
        if !value.is_empty() {
            object.insert(attr.name().to_string(), Value::String(value.to_string()));
        }
    }

    let mut has_children = false;
    for child in node.children().filter(Node::is_element) {
        has_children = true;
        let name = child.tag_name().name().to_string();
        let text = own_text(child);
        if text.is_empty() {
            object.remove(&name);
        } else {
            object.insert(name, Value::String(text));
        }
    }

    if !has_children && !object.contains_key(TEXT_KEY) {
        let text = own_text(node);
        if !text.is_empty() {
            object.insert(TEXT_KEY.to_string(), Value::String(text));
        }
    }

    Value::Object(object)
}

fn own_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, PartialEq, Deserialize)]
    struct TestModel {
        id: String,
        #[serde(default)]
        name: Option<String>,
    }

    fn model(id: &str, name: Option<&str>) -> TestModel {
        TestModel {
            id: id.to_string(),
            name: name.map(str::to_string),
        }
    }

    fn path(raw: &str) -> NodePath {
        NodePath::parse(raw).unwrap()
    }

    #[test]
    fn test_extracts_list_of_models() {
        let xml = r#"<root><TestModel id="1"><name>foo</name></TestModel><TestModel id="2" name="bar"/></root>"#;
        let extraction: Extraction<TestModel> = extract_records(xml, &path("//TestModel")).unwrap();
        assert_eq!(extraction.records, vec![model("1", Some("foo")), model("2", Some("bar"))]);
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_continues_past_bad_node() {
        let xml = r#"<root><TestModel id="1" name="foo"/><TestModel name="broken"/><TestModel id="2" name="bar"/></root>"#;
        let extraction: Extraction<TestModel> = extract_records(xml, &path("//TestModel")).unwrap();
        assert_eq!(extraction.records, vec![model("1", Some("foo")), model("2", Some("bar"))]);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].index, 1);
    }

    #[test]
    fn test_empty_fields_are_null() {
        let xml = r#"<root><TestModel id="1"><name></name></TestModel><TestModel id="2" name="  "/></root>"#;
        let extraction: Extraction<TestModel> = extract_records(xml, &path("//TestModel")).unwrap();
        assert_eq!(extraction.records, vec![model("1", None), model("2", None)]);
    }

    #[test]
    fn test_child_element_wins_over_attribute() {
        let nodes = extract_nodes(r#"<a><b name="attr"><name>child</name></b></a>"#, &path("//b")).unwrap();
        assert_eq!(nodes[0]["name"], "child");
    }

    #[test]
    fn test_own_text_becomes_value() {
        let nodes = extract_nodes(r#"<book><text id="UNIT_NAME_1"> Knight </text></book>"#, &path("//text")).unwrap();
        assert_eq!(nodes[0]["id"], "UNIT_NAME_1");
        assert_eq!(nodes[0]["value"], "Knight");
    }

    #[test]
    fn test_malformed_document() {
        let err = extract_nodes("<root><open></root>", &path("//open")).unwrap_err();
        assert!(matches!(err, ExtractError::Xml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = extract_file::<TestModel>(Path::new("does/not/exist.xml"), &path("//x")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[test]
    fn test_extract_file_detects_encoding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<root><TestModel id=\"1\" name=\"caf\xe9\"/></root>").unwrap();

        let extraction: Extraction<TestModel> = extract_file(file.path(), &path("//TestModel")).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert!(extraction.records[0].name.as_deref().unwrap_or_default().starts_with("caf"));
    }
}
