//! Dialect-agnostic schema tree.
//!
//! Every normalization pass matches on [`SchemaNode`] exhaustively; nothing
//! downstream of parsing touches `serde_json::Value` directly.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Key order follows the source document so emitted output is deterministic.
pub type Mapping = IndexMap<String, SchemaNode>;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "Value", into = "Value")]
pub enum SchemaNode {
    Scalar(Scalar),
    Sequence(Vec<SchemaNode>),
    Mapping(Mapping),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

pub const REF_KEY: &str = "$ref";

impl SchemaNode {
    pub fn null() -> Self {
        SchemaNode::Scalar(Scalar::Null)
    }
    pub fn string(s: impl Into<String>) -> Self {
        SchemaNode::Scalar(Scalar::String(s.into()))
    }
    pub fn bool(b: bool) -> Self {
        SchemaNode::Scalar(Scalar::Bool(b))
    }
    pub fn empty_mapping() -> Self {
        SchemaNode::Mapping(Mapping::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SchemaNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            SchemaNode::Mapping(m) => Some(m),
            _ => None,
        }
    }
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            SchemaNode::Mapping(m) => Some(m),
            _ => None,
        }
    }
    pub fn as_sequence(&self) -> Option<&[SchemaNode]> {
        match self {
            SchemaNode::Sequence(xs) => Some(xs),
            _ => None,
        }
    }
    pub fn is_null(&self) -> bool {
        matches!(self, SchemaNode::Scalar(Scalar::Null))
    }

    /// The `$ref` target, if this node is a mapping carrying a string `$ref`.
    pub fn reference(&self) -> Option<&str> {
        self.as_mapping()?.get(REF_KEY)?.as_str()
    }

    /// Shallow lookup for a mapping key.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.as_mapping()?.get(key)
    }

    /// Resolve a JSON Pointer (`/a/b/0`) against this node.
    pub fn pointer(&self, ptr: &str) -> Option<&SchemaNode> {
        if ptr.is_empty() {
            return Some(self);
        }
        let rest = ptr.strip_prefix('/')?;
        rest.split('/')
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
            .try_fold(self, |node, token| match node {
                SchemaNode::Mapping(m) => m.get(&token),
                SchemaNode::Sequence(xs) => token.parse::<usize>().ok().and_then(|i| xs.get(i)),
                SchemaNode::Scalar(_) => None,
            })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSIONS
// ————————————————————————————————————————————————————————————————————————————

impl From<Value> for SchemaNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SchemaNode::Scalar(Scalar::Null),
            Value::Bool(b) => SchemaNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => SchemaNode::Scalar(Scalar::Number(n)),
            Value::String(s) => SchemaNode::Scalar(Scalar::String(s)),
            Value::Array(xs) => SchemaNode::Sequence(xs.into_iter().map(SchemaNode::from).collect()),
            Value::Object(m) => SchemaNode::Mapping(
                m.into_iter().map(|(k, v)| (k, SchemaNode::from(v))).collect()
            ),
        }
    }
}

impl From<SchemaNode> for Value {
    fn from(node: SchemaNode) -> Self {
        match node {
            SchemaNode::Scalar(Scalar::Null) => Value::Null,
            SchemaNode::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            SchemaNode::Scalar(Scalar::Number(n)) => Value::Number(n),
            SchemaNode::Scalar(Scalar::String(s)) => Value::String(s),
            SchemaNode::Sequence(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            SchemaNode::Mapping(m) => Value::Object(
                m.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
            ),
        }
    }
}

impl From<Mapping> for SchemaNode {
    fn from(m: Mapping) -> Self {
        SchemaNode::Mapping(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_conversion_keeps_key_order() {
        let v = json!({"z": 1, "a": [true, null, "x"], "m": {"k": 1.5}});
        let node = SchemaNode::from(v.clone());
        let keys: Vec<_> = node.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(Value::from(node), v);
    }

    #[test]
    fn reference_accessor_requires_string_ref() {
        let r = SchemaNode::from(json!({"$ref": "#/definitions/Foo", "description": "d"}));
        assert_eq!(r.reference(), Some("#/definitions/Foo"));
        let not_ref = SchemaNode::from(json!({"$ref": 3}));
        assert_eq!(not_ref.reference(), None);
        assert_eq!(SchemaNode::string("x").reference(), None);
    }

    #[test]
    fn pointer_walks_mappings_and_sequences() {
        let node = SchemaNode::from(json!({"a": {"b/c": [10, {"d": "hit"}]}}));
        assert_eq!(node.pointer("/a/b~1c/1/d").and_then(SchemaNode::as_str), Some("hit"));
        assert!(node.pointer("/a/missing").is_none());
        assert_eq!(node.pointer(""), Some(&node));
    }

    #[test]
    fn serde_roundtrips_through_value() {
        let node: SchemaNode = serde_json::from_str(r#"{"type":"object","required":["id"]}"#).unwrap();
        assert_eq!(node.get("type").and_then(SchemaNode::as_str), Some("object"));
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(text, r#"{"type":"object","required":["id"]}"#);
    }
}
