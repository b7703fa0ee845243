//! Definition tables and the generator seam.
//!
//! Turning type declarations into JSON Schema is done by an external
//! generator. [`DefinitionGenerator`] is the boundary; [`DefinitionsFile`] is
//! the shipped implementation, which reads that generator's saved output.
use std::collections::VecDeque;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use crate::config::TypeSelection;
use crate::error::{Error, Result};
use crate::node::{SchemaNode, REF_KEY};
use crate::normalize::refs::reference_target;

/// Name → root schema, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionTable {
    entries: IndexMap<String, SchemaNode>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapping node becomes a table; anything else is `None`.
    pub fn from_node(node: SchemaNode) -> Option<Self> {
        match node {
            SchemaNode::Mapping(m) => Some(Self { entries: m }),
            _ => None,
        }
    }

    /// Pull the `definitions` (or `$defs`) table out of a generated document.
    pub fn from_document(path: &Path, document: SchemaNode) -> Result<Self> {
        let SchemaNode::Mapping(mut root) = document else {
            return Err(Error::parse(path, "expected a mapping at the document root"));
        };
        let table = root
            .shift_remove("definitions")
            .or_else(|| root.shift_remove("$defs"))
            .ok_or_else(|| Error::parse(path, "no `definitions` or `$defs` table"))?;
        Self::from_node(table)
            .ok_or_else(|| Error::parse(path, "`definitions` must be a mapping"))
    }

    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) -> Option<SchemaNode> {
        self.entries.insert(name.into(), node)
    }
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.get(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep the requested definitions plus everything they reach through
    /// internal `$ref`s. Table order is preserved.
    pub fn select(self, path: &Path, selection: &TypeSelection) -> Result<Self> {
        let TypeSelection::Named(names) = selection else {
            return Ok(self);
        };

        let mut reachable = IndexSet::<String>::new();
        let mut queue = VecDeque::<String>::new();
        for name in names {
            if !self.contains(name) {
                return Err(Error::Generation { type_name: name.clone(), path: path.to_path_buf() });
            }
            queue.push_back(name.clone());
        }
        while let Some(name) = queue.pop_front() {
            if !reachable.insert(name.clone()) {
                continue;
            }
            if let Some(node) = self.get(&name) {
                let mut refs = Vec::new();
                collect_references(node, &mut refs);
                queue.extend(refs.into_iter().filter(|r| self.contains(r)));
            }
        }

        let entries = self.entries.into_iter().filter(|(k, _)| reachable.contains(k)).collect();
        Ok(Self { entries })
    }
}

impl IntoIterator for DefinitionTable {
    type Item = (String, SchemaNode);
    type IntoIter = indexmap::map::IntoIter<String, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, SchemaNode)> for DefinitionTable {
    fn from_iter<T: IntoIterator<Item = (String, SchemaNode)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

fn collect_references(node: &SchemaNode, out: &mut Vec<String>) {
    match node {
        SchemaNode::Mapping(m) => {
            for (k, v) in m {
                match v.as_str() {
                    Some(r) if k == REF_KEY => out.extend(reference_target(r)),
                    _ => collect_references(v, out),
                }
            }
        }
        SchemaNode::Sequence(xs) => xs.iter().for_each(|x| collect_references(x, out)),
        SchemaNode::Scalar(_) => {}
    }
}

// ————————————————————————————————————————————————————————————————————————————
// GENERATORS
// ————————————————————————————————————————————————————————————————————————————

/// Produces the definitions for the selected types declared in `path`.
///
/// Shared read-only across the per-file workers of a run.
pub trait DefinitionGenerator: Send + Sync {
    fn generate(&self, path: &Path, selection: &TypeSelection) -> Result<DefinitionTable>;
}

/// Reads a generator's saved output: a JSON or YAML document with a top-level
/// `definitions` (or `$defs`) table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionsFile;

impl DefinitionGenerator for DefinitionsFile {
    fn generate(&self, path: &Path, selection: &TypeSelection) -> Result<DefinitionTable> {
        let document = crate::source::read_document(path)?;
        let table = DefinitionTable::from_document(path, document)?;
        table.select(path, selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generated() -> SchemaNode {
        SchemaNode::from(json!({
            "$ref": "#/definitions/Order",
            "definitions": {
                "Address": {"type": "object"},
                "Order": {
                    "type": "object",
                    "properties": {
                        "customer": {"$ref": "#/definitions/Customer"},
                        "items": {"type": "array", "items": {"$ref": "#/definitions/LineItem"}}
                    }
                },
                "Customer": {"properties": {"home": {"$ref": "#/definitions/Address"}}},
                "LineItem": {"properties": {"order": {"$ref": "#/definitions/Order"}}},
                "Unrelated": {"type": "string"}
            }
        }))
    }

    fn table() -> DefinitionTable {
        DefinitionTable::from_document(Path::new("gen.json"), generated()).unwrap()
    }

    #[test]
    fn all_selection_keeps_everything() {
        let t = table().select(Path::new("gen.json"), &TypeSelection::All).unwrap();
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn named_selection_follows_references_and_keeps_order() {
        let t = table()
            .select(Path::new("gen.json"), &TypeSelection::Named(vec!["Order".into()]))
            .unwrap();
        let names: Vec<_> = t.names().collect();
        assert_eq!(names, vec!["Address", "Order", "Customer", "LineItem"]);
    }

    #[test]
    fn unknown_type_is_a_generation_failure() {
        let err = table()
            .select(Path::new("gen.json"), &TypeSelection::Named(vec!["Missing".into()]))
            .unwrap_err();
        match err {
            Error::Generation { type_name, .. } => assert_eq!(type_name, "Missing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn defs_table_is_accepted() {
        let doc = SchemaNode::from(json!({"$defs": {"A": {"type": "string"}}}));
        let t = DefinitionTable::from_document(Path::new("x.yaml"), doc).unwrap();
        assert!(t.contains("A"));
    }

    #[test]
    fn document_without_definitions_is_a_parse_failure() {
        let doc = SchemaNode::from(json!({"type": "object"}));
        let err = DefinitionTable::from_document(Path::new("x.yaml"), doc).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn definitions_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("types.json");
        std::fs::write(&path, serde_json::to_string(&generated()).unwrap()).unwrap();
        let t = DefinitionsFile
            .generate(&path, &TypeSelection::Named(vec!["Customer".into()]))
            .unwrap();
        let names: Vec<_> = t.names().collect();
        assert_eq!(names, vec!["Address", "Customer"]);
    }
}
