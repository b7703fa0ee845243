//! End-to-end run: resolve inputs → convert each file (in parallel) → join →
//! assemble → merge into the base document → prune → encode → write.
//!
//! Nothing is written until every input has converted; the first failure
//! aborts the run.
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::assemble::{components_document, Assembler, Collision};
use crate::config::ResolvedConfig;
use crate::convert::{convert_definitions, convert_json_schema, Converted, SourceKind};
use crate::definitions::DefinitionGenerator;
use crate::error::{Error, Result};
use crate::node::SchemaNode;
use crate::prune::prune_document;
use crate::source::{read_document, resolve_file_path_patterns};

static DOCUMENT_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(json|ya?ml)$").expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn from_to_yaml(to_yaml: bool) -> Self {
        if to_yaml { OutputFormat::Yaml } else { OutputFormat::Json }
    }
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

/// Result of [`Pipeline::build`], ready to encode.
#[derive(Debug)]
pub struct Built {
    pub document: SchemaNode,
    pub collisions: Vec<Collision>,
    pub sources: Vec<Converted>,
}

pub struct Pipeline<'a> {
    config: &'a ResolvedConfig,
    generator: &'a dyn DefinitionGenerator,
    json_pointer: Option<&'a str>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ResolvedConfig, generator: &'a dyn DefinitionGenerator) -> Self {
        Self { config, generator, json_pointer: None }
    }

    /// Select a sub-node of every JSON Schema document before converting it.
    pub fn with_json_pointer(mut self, pointer: Option<&'a str>) -> Self {
        self.json_pointer = pointer;
        self
    }

    /// Convert every input. Results are ordered JSON Schema files first, then
    /// definition files, each by path, so last-write-wins is deterministic.
    pub fn convert_sources(&self) -> Result<Vec<Converted>> {
        let mut units: Vec<(SourceKind, PathBuf)> = Vec::new();
        if !self.config.json_schema.is_empty() {
            units.extend(
                resolve_file_path_patterns(&self.config.json_schema)?
                    .into_iter()
                    .map(|p| (SourceKind::JsonSchema, p)),
            );
        }
        if !self.config.type_script.is_empty() {
            units.extend(
                resolve_file_path_patterns(&self.config.type_script)?
                    .into_iter()
                    .map(|p| (SourceKind::Definitions, p)),
            );
        }

        let mut converted = units
            .into_par_iter()
            .map(|(kind, path)| self.convert_one(kind, path))
            .collect::<Result<Vec<_>>>()?;
        converted.sort_by(|a, b| (a.kind, &a.path).cmp(&(b.kind, &b.path)));
        Ok(converted)
    }

    fn convert_one(&self, kind: SourceKind, path: PathBuf) -> Result<Converted> {
        tracing::debug!(path = %path.display(), ?kind, "converting");
        let engine = &self.config.engine;
        let normalized = match kind {
            SourceKind::JsonSchema => {
                let document = read_document(&path)?;
                let document = match self.json_pointer {
                    None => document,
                    Some(pointer) => document.pointer(pointer).cloned().ok_or_else(|| Error::Pointer {
                        pointer: pointer.to_string(),
                        path: path.clone(),
                    })?,
                };
                convert_json_schema(&path, document, engine)
            }
            SourceKind::Definitions => {
                convert_definitions(&path, self.generator, &self.config.types, engine)?
            }
        };
        if !normalized.cycle_fallbacks.is_empty() {
            tracing::warn!(
                path = %path.display(),
                names = ?normalized.cycle_fallbacks,
                "kept cyclic expandable types as components"
            );
        }
        Ok(Converted { path, kind, normalized })
    }

    pub fn build(&self) -> Result<Built> {
        let sources = self.convert_sources()?;
        let mut assembler = Assembler::new();
        for source in &sources {
            assembler.extend(source.normalized.clone());
        }

        let (document, collisions) = match &self.config.openapi_definition {
            Some(base_path) => assembler.merge_into(read_document(base_path)?),
            None => {
                let collisions = assembler.collisions().to_vec();
                (assembler.into_document(), collisions)
            }
        };

        Ok(Built { document: prune_document(document), collisions, sources })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OUTPUT
// ————————————————————————————————————————————————————————————————————————————

pub fn encode(document: &SchemaNode, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(document).map_err(|e| Error::Encode(e.to_string())),
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| Error::Encode(e.to_string())),
    }
}

/// Swap a `.json`/`.yaml`/`.yml` extension for the one matching `format`.
/// Names without a recognised extension are left alone.
pub fn output_path(filename: &str, format: OutputFormat) -> PathBuf {
    let replacement = format!(".{}", format.extension());
    PathBuf::from(DOCUMENT_EXTENSION.replace(filename, replacement.as_str()).into_owned())
}

pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote document");
    Ok(())
}

/// One `<stem>.components.<ext>` file per source, unpruned.
pub fn write_fragments(dir: &Path, sources: &[Converted], format: OutputFormat) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(sources.len());
    for source in sources {
        let stem = source
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = stem
            .strip_suffix(".d.ts")
            .or_else(|| stem.rsplit_once('.').map(|(s, _)| s))
            .unwrap_or(stem.as_str())
            .to_string();
        let path = dir.join(format!("{stem}.components.{}", format.extension()));
        let document = components_document(source.normalized.schemas.clone());
        write_document(&path, &encode(&document, format)?)?;
        written.push(path);
    }
    Ok(written)
}
