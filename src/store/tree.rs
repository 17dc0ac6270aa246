//! In-memory pin tree
//!
//! Only [`Node::Pin`] leaves can be removed. Internal nodes are created on
//! demand and never removed on their own. Foreign values found in a
//! hand-edited document are kept verbatim as [`Node::Opaque`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{PIN_ID, PinRecord};
use crate::error::{self, Result};

/// A node of the persisted pin tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Pin(PinRecord),
    Internal(BTreeMap<String, Node>),
    Opaque(Value),
}

impl Default for Node {
    fn default() -> Self {
        Node::Internal(BTreeMap::new())
    }
}

impl Node {
    /// Node at `segments`, or `None` if any segment is missing
    pub fn lookup(&self, segments: &[String]) -> Option<&Node> {
        let mut node = self;
        for segment in segments {
            match node {
                Node::Internal(children) => node = children.get(segment)?,
                Node::Pin(_) | Node::Opaque(_) => return None,
            }
        }
        Some(node)
    }

    /// Pin at `segments`, or `None` if absent or not a pin
    pub fn pin(&self, segments: &[String]) -> Option<&PinRecord> {
        match self.lookup(segments)? {
            Node::Pin(record) => Some(record),
            Node::Internal(_) | Node::Opaque(_) => None,
        }
    }

    /// Place `record` at `segments`, creating missing intermediate nodes.
    ///
    /// The target may be absent, a pin, or an empty internal node. A
    /// populated internal node or an opaque value is never overwritten.
    pub fn insert_pin(&mut self, segments: &[String], record: PinRecord) -> Result<()> {
        let Some((last, parents)) = segments.split_last() else {
            return Err(error::store::not_a_pin(""));
        };

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            let Node::Internal(children) = node else {
                return Err(error::store::not_an_internal_node(segments[..depth].join("/")));
            };
            node = children.entry(segment.clone()).or_default();
        }

        let Node::Internal(children) = node else {
            return Err(error::store::not_an_internal_node(parents.join("/")));
        };
        match children.get(last) {
            None | Some(Node::Pin(_)) => {}
            Some(Node::Internal(grandchildren)) if grandchildren.is_empty() => {}
            Some(_) => return Err(error::store::not_a_pin(segments.join("/"))),
        }
        children.insert(last.clone(), Node::Pin(record));
        Ok(())
    }

    /// Remove and return the pin at `segments`
    pub fn remove_pin(&mut self, segments: &[String]) -> Result<PinRecord> {
        let path = segments.join("/");
        let Some((last, parents)) = segments.split_last() else {
            return Err(error::store::not_a_pin(path));
        };

        let mut node = self;
        for segment in parents {
            match node {
                Node::Internal(children) => {
                    node = children
                        .get_mut(segment)
                        .ok_or_else(|| error::store::no_such_path(path.clone()))?;
                }
                Node::Pin(_) | Node::Opaque(_) => return Err(error::store::no_such_path(path)),
            }
        }

        let Node::Internal(children) = node else {
            return Err(error::store::no_such_path(path));
        };
        match children.get(last) {
            None => return Err(error::store::no_such_path(path)),
            Some(Node::Internal(_) | Node::Opaque(_)) => {
                return Err(error::store::not_a_pin(path));
            }
            Some(Node::Pin(_)) => {}
        }
        match children.remove(last) {
            Some(Node::Pin(record)) => Ok(record),
            _ => Err(error::store::no_such_path(path)),
        }
    }

    /// Every pin below this node, keyed by its path relative to this node
    pub fn pins(&self) -> Vec<(Vec<String>, &PinRecord)> {
        let mut out = Vec::new();
        collect_pins(self, &mut Vec::new(), &mut out);
        out
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        match value {
            Value::Null => Ok(Node::default()),
            Value::Object(map) => match map.get("id") {
                Some(Value::String(id)) if id == PIN_ID => {
                    serde_json::from_value(Value::Object(map))
                        .map(Node::Pin)
                        .map_err(|e| format!("malformed pin: {e}"))
                }
                Some(_) => Ok(Node::Opaque(Value::Object(map))),
                None => {
                    let mut children = BTreeMap::new();
                    for (key, child) in map {
                        let child = Node::from_value(child).map_err(|e| format!("{key}: {e}"))?;
                        children.insert(key, child);
                    }
                    Ok(Node::Internal(children))
                }
            },
            other => Ok(Node::Opaque(other)),
        }
    }
}

fn collect_pins<'a>(
    node: &'a Node,
    prefix: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, &'a PinRecord)>,
) {
    match node {
        Node::Pin(record) => out.push((prefix.clone(), record)),
        Node::Internal(children) => {
            for (key, child) in children {
                prefix.push(key.clone());
                collect_pins(child, prefix, out);
                prefix.pop();
            }
        }
        Node::Opaque(_) => {}
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Node::Pin(record) => record.serialize(serializer),
            Node::Internal(children) => children.serialize(serializer),
            Node::Opaque(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Node::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::RefSpec;

    fn key(path: &str) -> Vec<String> {
        path.split('/').map(str::to_string).collect()
    }

    fn branch_pin(sha: &str) -> PinRecord {
        PinRecord::new(RefSpec::Branch("main".to_string()), sha, "u")
    }

    #[test]
    fn test_insert_creates_intermediates() {
        let mut tree = Node::default();
        tree.insert_pin(&key("github/octo/demo"), branch_pin("abc123"))
            .unwrap();

        assert!(matches!(tree.lookup(&key("github")), Some(Node::Internal(_))));
        assert!(matches!(tree.lookup(&key("github/octo")), Some(Node::Internal(_))));
        assert_eq!(tree.pin(&key("github/octo/demo")).unwrap().commit_sha, "abc123");
    }

    #[test]
    fn test_insert_keeps_siblings() {
        let mut tree = Node::default();
        tree.insert_pin(&key("github/octo/demo"), branch_pin("a"))
            .unwrap();
        tree.insert_pin(&key("github/octo/other"), branch_pin("b"))
            .unwrap();
        tree.insert_pin(&key("github/octo/demo"), branch_pin("c"))
            .unwrap();

        assert_eq!(tree.pin(&key("github/octo/other")).unwrap().commit_sha, "b");
        assert_eq!(tree.pin(&key("github/octo/demo")).unwrap().commit_sha, "c");
    }

    #[test]
    fn test_insert_refuses_to_descend_through_pin() {
        let mut tree = Node::default();
        tree.insert_pin(&key("github/octo/demo"), branch_pin("a"))
            .unwrap();
        let err = tree
            .insert_pin(&key("github/octo/demo/sub"), branch_pin("b"))
            .unwrap_err();
        assert!(matches!(err, crate::error::GhpinError::NotAnInternalNode { .. }));
    }

    #[test]
    fn test_insert_refuses_to_replace_populated_node() {
        let mut tree = Node::default();
        tree.insert_pin(&key("github/octo/demo"), branch_pin("a"))
            .unwrap();
        let err = tree.insert_pin(&key("github/octo"), branch_pin("b")).unwrap_err();
        assert!(matches!(err, crate::error::GhpinError::NotAPin { .. }));
        assert!(tree.pin(&key("github/octo/demo")).is_some());
    }

    #[test]
    fn test_remove_only_pins() {
        let mut tree = Node::default();
        tree.insert_pin(&key("github/octo/demo"), branch_pin("a"))
            .unwrap();

        let err = tree.remove_pin(&key("github/octo")).unwrap_err();
        assert!(matches!(err, crate::error::GhpinError::NotAPin { .. }));

        let err = tree.remove_pin(&key("github/nobody/demo")).unwrap_err();
        assert!(matches!(err, crate::error::GhpinError::NoSuchPath { .. }));

        let removed = tree.remove_pin(&key("github/octo/demo")).unwrap();
        assert_eq!(removed.commit_sha, "a");
        // The intermediate node outlives its last pin
        assert!(matches!(tree.lookup(&key("github/octo")), Some(Node::Internal(c)) if c.is_empty()));
    }

    #[test]
    fn test_deserialize_legacy_document() {
        let doc = r#"{
            "github": {
                "octo": {
                    "demo": {"id": "pin", "commit": {"sha": "abc", "url": "u"}, "branch": "main"},
                    "placeholder": null
                },
                "notes": "hand written",
                "vendor": {"id": "custom", "x": 1}
            }
        }"#;
        let tree: Node = serde_json::from_str(doc).unwrap();

        assert!(tree.pin(&key("github/octo/demo")).is_some());
        assert!(matches!(
            tree.lookup(&key("github/octo/placeholder")),
            Some(Node::Internal(c)) if c.is_empty()
        ));
        assert!(matches!(tree.lookup(&key("github/notes")), Some(Node::Opaque(_))));
        assert!(matches!(tree.lookup(&key("github/vendor")), Some(Node::Opaque(_))));
    }

    #[test]
    fn test_opaque_values_survive_round_trip() {
        let doc = serde_json::json!({"github": {"vendor": {"id": "custom", "x": 1}, "n": 3}});
        let tree: Node = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&tree).unwrap(), doc);
    }

    #[test]
    fn test_pins_lists_nested_records() {
        let mut tree = Node::default();
        tree.insert_pin(&key("github/octo/demo"), branch_pin("a"))
            .unwrap();
        tree.insert_pin(&key("github/alice/tools"), branch_pin("b"))
            .unwrap();

        let pins = tree.pins();
        let paths: Vec<String> = pins.iter().map(|(p, _)| p.join("/")).collect();
        assert_eq!(paths, vec!["github/alice/tools", "github/octo/demo"]);
    }
}
