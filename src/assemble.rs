//! Merging per-source schemas into one `components.schemas` map.
//!
//! Collision policy: last write wins. Every overwrite is recorded as a
//! [`Collision`] and logged, so callers can assert on it.
use std::path::Path;

use crate::node::{Mapping, Scalar, SchemaNode};
use crate::normalize::Normalized;

#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub name: String,
    pub previous: SchemaNode,
    pub replacement: SchemaNode,
}

#[derive(Debug, Default)]
pub struct Assembler {
    schemas: Mapping,
    collisions: Vec<Collision>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, node: SchemaNode) {
        let name = name.into();
        if let Some(previous) = self.schemas.get(&name) {
            tracing::warn!(name = %name, "component schema defined more than once; keeping the last definition");
            self.collisions.push(Collision {
                name: name.clone(),
                previous: previous.clone(),
                replacement: node.clone(),
            });
        }
        self.schemas.insert(name, node);
    }

    /// Every definition name of an engine run becomes its own entry.
    pub fn extend(&mut self, normalized: Normalized) {
        for (name, node) in normalized.schemas {
            self.insert(name, node);
        }
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn schemas(&self) -> &Mapping {
        &self.schemas
    }

    /// `{components: {schemas: ...}}`
    pub fn into_document(self) -> SchemaNode {
        components_document(self.schemas)
    }

    /// Insert the assembled schemas into `base.components.schemas`, creating
    /// the path if needed. Base entries with the same name are overwritten and
    /// reported like any other collision.
    pub fn merge_into(mut self, base: SchemaNode) -> (SchemaNode, Vec<Collision>) {
        let mut root = match base {
            SchemaNode::Mapping(m) => m,
            other => {
                tracing::warn!(?other, "base document is not a mapping; starting from an empty document");
                Mapping::new()
            }
        };

        let mut existing = match root.shift_remove("components") {
            Some(SchemaNode::Mapping(components)) => components,
            _ => Mapping::new(),
        };
        let base_schemas = match existing.shift_remove("schemas") {
            Some(SchemaNode::Mapping(schemas)) => schemas,
            _ => Mapping::new(),
        };

        let mut merged = Assembler::new();
        for (name, node) in base_schemas {
            merged.insert(name, node);
        }
        for (name, node) in std::mem::take(&mut self.schemas) {
            merged.insert(name, node);
        }

        existing.insert("schemas".to_string(), SchemaNode::Mapping(merged.schemas));
        root.insert("components".to_string(), SchemaNode::Mapping(existing));

        let mut collisions = self.collisions;
        collisions.extend(merged.collisions);
        (SchemaNode::Mapping(root), collisions)
    }
}

pub fn components_document(schemas: Mapping) -> SchemaNode {
    let mut components = Mapping::new();
    components.insert("schemas".to_string(), SchemaNode::Mapping(schemas));
    let mut root = Mapping::new();
    root.insert("components".to_string(), SchemaNode::Mapping(components));
    SchemaNode::Mapping(root)
}

/// Component name for a JSON Schema document: its root `title` (removed from
/// the node) or, failing that, the file name without its last extension.
pub fn json_schema_name(path: &Path, root: &mut SchemaNode) -> String {
    if let Some(m) = root.as_mapping_mut() {
        if matches!(m.get("title"), Some(t) if t.as_str().is_some()) {
            if let Some(SchemaNode::Scalar(Scalar::String(title))) = m.shift_remove("title") {
                return title;
            }
        }
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
