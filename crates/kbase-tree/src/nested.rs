//! Nested JSON form of the tree
//!
//! The tree document on disk is a mapping of topic name to
//! `{ "icon": ..., "content": ..., "subtopics": { ... } }`, recursively.
//! Key order in the document is the insertion order of siblings.

use crate::error::{TreeError, TreeResult};
use crate::node::NodeId;
use crate::path::TopicPath;
use crate::tree::ContentTree;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const ICON: &str = "icon";
const CONTENT: &str = "content";
const SUBTOPICS: &str = "subtopics";

impl ContentTree {
    /// Decode the nested document
    ///
    /// Missing `icon`, `content` or `subtopics` keys are treated as absent;
    /// non-string content is treated as empty.
    ///
    /// # Errors
    /// - `NotADirectory` if a topic or its `subtopics` is not a mapping
    /// - `InvalidName` for blank topic names
    pub fn from_json(value: &Value) -> TreeResult<Self> {
        let mut tree = Self::new();
        let top = value
            .as_object()
            .ok_or_else(|| TreeError::NotADirectory(TopicPath::root()))?;
        let root = tree.root();
        tree.decode_children(root, &TopicPath::root(), top)?;
        Ok(tree)
    }

    fn decode_children(
        &mut self,
        parent: NodeId,
        parent_path: &TopicPath,
        entries: &Map<String, Value>,
    ) -> TreeResult<()> {
        for (name, value) in entries {
            let path = parent_path.child(name.clone());
            let fields = value
                .as_object()
                .ok_or_else(|| TreeError::NotADirectory(path.clone()))?;

            let icon = fields.get(ICON).and_then(Value::as_str);
            let id = self.attach(parent, name, icon)?;
            if let Some(content) = fields.get(CONTENT).and_then(Value::as_str) {
                self.node_mut(id)?.content = content.to_string();
            }

            match fields.get(SUBTOPICS) {
                None | Some(Value::Null) => {}
                Some(Value::Object(children)) => self.decode_children(id, &path, children)?,
                Some(_) => return Err(TreeError::NotADirectory(path)),
            }
        }
        Ok(())
    }

    /// Encode as the nested document
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.encode_children(self.root()))
    }

    fn encode_children(&self, parent: NodeId) -> Map<String, Value> {
        let mut out = Map::new();
        let Ok(node) = self.node(parent) else {
            return out;
        };
        for &id in node.children() {
            let Ok(child) = self.node(id) else {
                continue;
            };
            let mut fields = Map::new();
            if let Some(icon) = child.icon() {
                fields.insert(ICON.to_string(), Value::String(icon.to_string()));
            }
            fields.insert(CONTENT.to_string(), Value::String(child.content().to_string()));
            fields.insert(SUBTOPICS.to_string(), Value::Object(self.encode_children(id)));
            out.insert(child.name().to_string(), Value::Object(fields));
        }
        out
    }
}

impl Serialize for ContentTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decode_preserves_document_order() {
        let doc = json!({
            "Zeta": { "icon": "📗", "content": "z", "subtopics": {} },
            "Alpha": {
                "content": "<p>a</p>",
                "subtopics": { "Inner": { "content": "", "subtopics": {} } }
            }
        });
        let tree = ContentTree::from_json(&doc).unwrap();
        let paths: Vec<_> = tree.all_paths().iter().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["Zeta", "Alpha", "Alpha / Inner"]);

        let zeta = tree.resolve(&TopicPath::single("Zeta")).unwrap();
        assert_eq!(tree.node(zeta).unwrap().icon(), Some("📗"));
    }

    #[test]
    fn encode_round_trips_document() {
        let doc = json!({
            "B": { "icon": "📘", "content": "x", "subtopics": {
                "C": { "content": "", "subtopics": {} }
            } },
            "A": { "content": "", "subtopics": {} }
        });
        let tree = ContentTree::from_json(&doc).unwrap();
        assert_eq!(tree.to_json(), doc);
    }

    #[test]
    fn non_mapping_subtopics_is_not_a_directory() {
        let doc = json!({ "A": { "content": "", "subtopics": ["oops"] } });
        assert_eq!(
            ContentTree::from_json(&doc).unwrap_err(),
            TreeError::NotADirectory(TopicPath::single("A"))
        );
    }

    #[test]
    fn non_mapping_topic_is_not_a_directory() {
        let doc = json!({ "A": { "subtopics": { "B": "text" } } });
        assert_eq!(
            ContentTree::from_json(&doc).unwrap_err(),
            TreeError::NotADirectory(TopicPath::from(["A", "B"]))
        );
    }

    #[test]
    fn serde_uses_nested_form() {
        let tree: ContentTree = serde_json::from_str(r#"{"A":{"content":"hi"}}"#).unwrap();
        let a = tree.resolve(&TopicPath::single("A")).unwrap();
        assert_eq!(tree.node(a).unwrap().content(), "hi");
        assert!(serde_json::from_str::<ContentTree>("[]").is_err());
    }
}
