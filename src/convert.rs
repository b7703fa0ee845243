//! Per-source conversion units: one input file in, one [`Normalized`] out.
//!
//! Both are pure apart from the generator call and safe to run in parallel.
use std::path::{Path, PathBuf};

use crate::assemble::json_schema_name;
use crate::config::{Config, TypeSelection};
use crate::definitions::{DefinitionGenerator, DefinitionTable};
use crate::error::Result;
use crate::node::SchemaNode;
use crate::normalize::{normalize_definitions, Normalized};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceKind {
    JsonSchema,
    Definitions,
}

#[derive(Debug, Clone)]
pub struct Converted {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub normalized: Normalized,
}

/// A JSON Schema document becomes one component named by its `title` (or file
/// stem). Embedded `definitions`/`$defs` are hoisted next to it so internal
/// references can point at `#/components/schemas/`.
pub fn convert_json_schema(path: &Path, mut document: SchemaNode, config: &Config) -> Normalized {
    let name = json_schema_name(path, &mut document);

    let mut table = DefinitionTable::new();
    if let Some(root) = document.as_mapping_mut() {
        for key in ["definitions", "$defs"] {
            if let Some(SchemaNode::Mapping(defs)) = root.shift_remove(key) {
                for (def_name, def) in defs {
                    if table.insert(def_name.clone(), def).is_some() {
                        tracing::warn!(path = %path.display(), name = %def_name, "definition appears in both `definitions` and `$defs`");
                    }
                }
            }
        }
    }
    if table.insert(name.clone(), document).is_some() {
        tracing::warn!(path = %path.display(), name = %name, "document title shadows one of its own definitions");
    }

    normalize_definitions(table, config)
}

/// Every selected definition becomes its own component.
pub fn convert_definitions(
    path: &Path,
    generator: &dyn DefinitionGenerator,
    selection: &TypeSelection,
    config: &Config,
) -> Result<Normalized> {
    let table = generator.generate(path, selection)?;
    tracing::debug!(path = %path.display(), definitions = table.len(), "generated definitions");
    Ok(normalize_definitions(table, config))
}
