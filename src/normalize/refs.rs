//! `$ref` rewriting and inline expansion.
//!
//! References into the internal definitions namespace are pointed at
//! `#/components/schemas/`. References to expandable definitions are replaced
//! by a processed copy of the target body. Re-entering an expansion that is
//! already in progress on the current path falls back to a rewritten reference.
//!
//! Keys under `properties`, `definitions` and `$defs` are names and are never
//! removed; the schemas under them are.
use indexmap::{IndexMap, IndexSet};

use crate::node::{Mapping, Scalar, SchemaNode, REF_KEY};

use super::filter::is_name_keyed;

pub const DEFINITIONS_PREFIX: &str = "#/definitions/";
pub const DEFS_PREFIX: &str = "#/$defs/";
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

// ————————————————————————————————————————————————————————————————————————————
// EXPANSION MAP
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Expandable {
    pub name: String,
    pub body: SchemaNode,
}

/// Canonical reference path → expandable definition.
#[derive(Debug, Clone, Default)]
pub struct ExpansionMap {
    entries: IndexMap<String, Expandable>,
}

impl ExpansionMap {
    pub fn insert(&mut self, name: &str, body: SchemaNode) {
        let key = canonical_reference(name);
        self.entries.insert(key, Expandable { name: name.to_string(), body });
    }

    /// Look up a `$ref` value, tolerating `$defs` and raw/encoded names.
    pub fn get(&self, reference: &str) -> Option<&Expandable> {
        let name = reference_target(reference)?;
        self.entries.get(&canonical_reference(&name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Names of the expansions in progress on the current recursion path.
#[derive(Debug, Clone, Default)]
pub struct ExpansionStack {
    names: Vec<String>,
}

impl ExpansionStack {
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
    pub fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }
    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }
    pub fn depth(&self) -> usize {
        self.names.len()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REWRITER
// ————————————————————————————————————————————————————————————————————————————

pub struct RefRewriter<'a> {
    removal: &'a IndexSet<String>,
    expansions: &'a ExpansionMap,
    cycle_fallbacks: IndexSet<String>,
}

impl<'a> RefRewriter<'a> {
    pub fn new(removal: &'a IndexSet<String>, expansions: &'a ExpansionMap) -> Self {
        Self { removal, expansions, cycle_fallbacks: IndexSet::new() }
    }

    /// Expandable names that were referenced from inside their own expansion.
    pub fn into_cycle_fallbacks(self) -> IndexSet<String> {
        self.cycle_fallbacks
    }

    pub fn rewrite(&mut self, node: SchemaNode, stack: &mut ExpansionStack) -> SchemaNode {
        match node {
            SchemaNode::Mapping(m) => self.rewrite_mapping(m, stack),
            SchemaNode::Sequence(xs) => {
                SchemaNode::Sequence(xs.into_iter().map(|x| self.rewrite(x, stack)).collect())
            }
            scalar @ SchemaNode::Scalar(_) => scalar,
        }
    }

    fn rewrite_mapping(&mut self, m: Mapping, stack: &mut ExpansionStack) -> SchemaNode {
        let removal = self.removal;
        let expansions = self.expansions;
        let target = m
            .get(REF_KEY)
            .and_then(SchemaNode::as_str)
            .filter(|_| !removal.contains(REF_KEY))
            .and_then(|r| expansions.get(r));

        if let Some(expandable) = target {
            if stack.contains(&expandable.name) {
                tracing::debug!(
                    name = %expandable.name,
                    depth = stack.depth(),
                    "cyclic expandable type; emitting a reference instead of inlining"
                );
                self.cycle_fallbacks.insert(expandable.name.clone());
            } else {
                let Expandable { name, body } = expandable.clone();
                stack.push(&name);
                let expanded = self.rewrite(body, stack);
                stack.pop();
                return expanded;
            }
        }

        let mut out = Mapping::with_capacity(m.len());
        for (k, v) in m {
            if removal.contains(&k) {
                continue;
            }
            let v = match v {
                SchemaNode::Scalar(Scalar::String(r)) if k == REF_KEY => {
                    SchemaNode::string(to_components_reference(&r))
                }
                SchemaNode::Mapping(names) if is_name_keyed(&k) => {
                    SchemaNode::Mapping(
                        names.into_iter().map(|(name, schema)| (name, self.rewrite(schema, stack))).collect(),
                    )
                }
                other => self.rewrite(other, stack),
            };
            out.insert(k, v);
        }
        SchemaNode::Mapping(out)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// REFERENCE PATHS
// ————————————————————————————————————————————————————————————————————————————

/// Swap the internal namespace prefix for `#/components/schemas/`.
/// Anything else (external files, JSON pointers into the same document) is
/// returned unchanged.
pub fn to_components_reference(reference: &str) -> String {
    [DEFINITIONS_PREFIX, DEFS_PREFIX]
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
        .map(|name| format!("{COMPONENTS_PREFIX}{name}"))
        .unwrap_or_else(|| reference.to_string())
}

/// Decoded definition name behind an internal `$ref`.
pub fn reference_target(reference: &str) -> Option<String> {
    let encoded = [DEFINITIONS_PREFIX, DEFS_PREFIX]
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))?;
    Some(decode_uri_component(encoded))
}

/// `#/definitions/` followed by the URI-component-encoded name.
pub fn canonical_reference(name: &str) -> String {
    format!("{DEFINITIONS_PREFIX}{}", encode_uri_component(name))
}

fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
            | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Invalid escapes are kept verbatim.
fn decode_uri_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(v: serde_json::Value) -> SchemaNode {
        SchemaNode::from(v)
    }

    fn removal() -> IndexSet<String> {
        crate::config::Config::default().removal_set()
    }

    fn run(v: serde_json::Value, map: &ExpansionMap) -> (serde_json::Value, IndexSet<String>) {
        let r = removal();
        let mut rewriter = RefRewriter::new(&r, map);
        let mut stack = ExpansionStack::default();
        let out = rewriter.rewrite(node(v), &mut stack);
        assert_eq!(stack.depth(), 0, "stack must unwind");
        (serde_json::Value::from(out), rewriter.into_cycle_fallbacks())
    }

    #[test]
    fn plain_reference_is_rewritten_to_components() {
        let (out, _) = run(json!({"$ref": "#/definitions/Foo"}), &ExpansionMap::default());
        assert_eq!(out, json!({"$ref": "#/components/schemas/Foo"}));
    }

    #[test]
    fn defs_namespace_is_rewritten_too() {
        assert_eq!(to_components_reference("#/$defs/Bar"), "#/components/schemas/Bar");
        assert_eq!(to_components_reference("other.json#/Foo"), "other.json#/Foo");
        assert_eq!(to_components_reference("#/properties/a"), "#/properties/a");
    }

    #[test]
    fn trailing_identifier_is_kept_encoded() {
        let (out, _) = run(json!({"$ref": "#/definitions/Maybe%3CUser%3E"}), &ExpansionMap::default());
        assert_eq!(out, json!({"$ref": "#/components/schemas/Maybe%3CUser%3E"}));
    }

    #[test]
    fn expandable_reference_replaces_enclosing_node() {
        let mut map = ExpansionMap::default();
        map.insert("Foo", node(json!({"type": "string"})));
        let (out, _) = run(
            json!({"properties": {"a": {"$ref": "#/definitions/Foo", "description": "dropped"}}}),
            &map,
        );
        assert_eq!(out, json!({"properties": {"a": {"type": "string"}}}));
    }

    #[test]
    fn expansion_matches_encoded_and_raw_names() {
        let mut map = ExpansionMap::default();
        map.insert("Partial<User>", node(json!({"type": "object"})));
        assert!(map.get("#/definitions/Partial%3CUser%3E").is_some());
        assert!(map.get("#/definitions/Partial<User>").is_some());
        assert!(map.get("#/$defs/Partial%3CUser%3E").is_some());
        assert!(map.get("#/definitions/User").is_none());
    }

    #[test]
    fn expanded_bodies_are_rewritten_recursively() {
        let mut map = ExpansionMap::default();
        map.insert("Partial<User>", node(json!({"properties": {"friend": {"$ref": "#/definitions/User"}}})));
        let (out, fallbacks) = run(json!({"$ref": "#/definitions/Partial%3CUser%3E"}), &map);
        assert_eq!(out, json!({"properties": {"friend": {"$ref": "#/components/schemas/User"}}}));
        assert!(fallbacks.is_empty());
    }

    #[test]
    fn self_referential_expansion_terminates_with_reference() {
        let mut map = ExpansionMap::default();
        map.insert("A", node(json!({"$ref": "#/definitions/A"})));
        let (out, fallbacks) = run(json!({"$ref": "#/definitions/A"}), &map);
        assert_eq!(out, json!({"$ref": "#/components/schemas/A"}));
        assert!(!out.to_string().contains("#/definitions/"));
        assert!(fallbacks.contains("A"));
    }

    #[test]
    fn mutual_recursion_inlines_once_per_path() {
        let mut map = ExpansionMap::default();
        map.insert("A", node(json!({"type": "object", "properties": {"b": {"$ref": "#/definitions/B"}}})));
        map.insert("B", node(json!({"type": "array", "items": {"$ref": "#/definitions/A"}})));
        let (out, fallbacks) = run(json!({"$ref": "#/definitions/A"}), &map);
        assert_eq!(
            out,
            json!({
                "type": "object",
                "properties": {"b": {"type": "array", "items": {"$ref": "#/components/schemas/A"}}}
            })
        );
        assert_eq!(fallbacks.len(), 1);
        assert!(fallbacks.contains("A"));
    }

    #[test]
    fn sibling_expansions_are_independent() {
        let mut map = ExpansionMap::default();
        map.insert("S", node(json!({"type": "string"})));
        let (out, fallbacks) = run(
            json!({"allOf": [{"$ref": "#/definitions/S"}, {"$ref": "#/definitions/S"}]}),
            &map,
        );
        assert_eq!(out, json!({"allOf": [{"type": "string"}, {"type": "string"}]}));
        assert!(fallbacks.is_empty());
    }

    #[test]
    fn removal_keys_are_deleted_during_traversal() {
        let (out, _) = run(json!({"$schema": "x", "properties": {"a": {"const": 1, "type": "integer"}}}), &ExpansionMap::default());
        assert_eq!(out, json!({"properties": {"a": {"type": "integer"}}}));
    }

    #[test]
    fn property_names_survive_the_removal_pass() {
        let mut map = ExpansionMap::default();
        map.insert("Partial<Id>", node(json!({"properties": {"id": {"type": "string", "const": "x"}}})));
        let (out, _) = run(
            json!({
                "properties": {
                    "id": {"type": "integer"},
                    "then": {"$ref": "#/definitions/Partial%3CId%3E"}
                },
                "required": ["id"]
            }),
            &map,
        );
        assert_eq!(
            out,
            json!({
                "properties": {
                    "id": {"type": "integer"},
                    "then": {"properties": {"id": {"type": "string"}}}
                },
                "required": ["id"]
            })
        );
    }

    #[test]
    fn expansion_stack_tracks_membership() {
        let mut stack = ExpansionStack::default();
        stack.push("A");
        stack.push("B");
        assert!(stack.contains("A"));
        assert_eq!(stack.pop().as_deref(), Some("B"));
        assert!(!stack.contains("B"));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn uri_component_codec() {
        assert_eq!(encode_uri_component("Maybe<User>"), "Maybe%3CUser%3E");
        assert_eq!(encode_uri_component("Record<string, number>"), "Record%3Cstring%2C%20number%3E");
        assert_eq!(decode_uri_component("Maybe%3CUser%3E"), "Maybe<User>");
        assert_eq!(decode_uri_component("100%"), "100%");
        assert_eq!(decode_uri_component("%zz"), "%zz");
    }
}
