//! Transformation options and the project config file.
//!
//! [`Config`] is what the normalization engine reads. [`ProjectConfig`] is the
//! on-disk `.schemawagonrc` shape; CLI flags are layered over it and the
//! result is resolved into a [`Config`] plus the pipeline's I/O settings.
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Keywords OpenAPI 3.0 schema objects do not accept.
pub const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$schema",
    "additionalItems",
    "const",
    "contains",
    "dependencies",
    "examples",
    "id",
    "$id",
    "patternProperties",
    "propertyNames",
    "if",
    "then",
    "else",
];

pub const DEFAULT_WRAPPER_PREFIXES: &[&str] = &["Maybe", "Scalar"];
pub const DEFAULT_FILENAME: &str = "openapi.yaml";
pub const CONFIG_FILE_NAMES: &[&str] = &[".schemawagonrc", ".schemawagonrc.json", ".schemawagonrc.yaml"];
/// Base documents picked up from the working directory, in priority order.
pub const BASE_DOCUMENT_NAMES: &[&str] = &[
    "openapi.definition.json",
    "openapi.definition.yaml",
    "swagger.definition.json",
    "swagger.definition.yaml",
];

// ————————————————————————————————————————————————————————————————————————————
// ENGINE CONFIG
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub struct Config {
    pub remove_props: IndexSet<String>,
    pub expand_type_prefixes: IndexSet<String>,
    pub detect_wrapper: bool,
    pub wrapper_prefixes: IndexSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remove_props: IndexSet::new(),
            expand_type_prefixes: IndexSet::new(),
            detect_wrapper: true,
            wrapper_prefixes: DEFAULT_WRAPPER_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Built-in unsupported keywords ∪ user `remove_props`.
    pub fn removal_set(&self) -> IndexSet<String> {
        UNSUPPORTED_KEYWORDS
            .iter()
            .map(|s| s.to_string())
            .chain(self.remove_props.iter().cloned())
            .collect()
    }

    /// `Prefix<...>` naming: a configured prefix immediately followed by `<`.
    pub fn is_expandable(&self, name: &str) -> bool {
        matches_generic_prefix(name, &self.expand_type_prefixes)
    }

    pub fn is_wrapper(&self, name: &str) -> bool {
        self.detect_wrapper && matches_generic_prefix(name, &self.wrapper_prefixes)
    }
}

fn matches_generic_prefix(name: &str, prefixes: &IndexSet<String>) -> bool {
    prefixes.iter().any(|p| {
        name.strip_prefix(p.as_str()).is_some_and(|rest| rest.starts_with('<'))
    })
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE SELECTION
// ————————————————————————————————————————————————————————————————————————————

/// Which declared types a definition file contributes. `"*"` means all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeSelection {
    #[default]
    All,
    Named(Vec<String>),
}

impl TypeSelection {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() || names.iter().any(|n| n == "*") {
            TypeSelection::All
        } else {
            TypeSelection::Named(names)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(xs) => xs,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PROJECT CONFIG FILE
// ————————————————————————————————————————————————————————————————————————————

/// Every field is optional; missing fields fall back to defaults at resolve time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    pub json_schema: Option<OneOrMany>,
    pub type_script: Option<OneOrMany>,
    pub openapi_definition: Option<PathBuf>,
    pub types: Option<OneOrMany>,
    pub expand_types: Option<Vec<String>>,
    pub remove_props: Option<Vec<String>>,
    #[serde(rename = "detectGraphQL")]
    pub detect_graphql: Option<bool>,
    #[serde(rename = "graphQLExpandedTypes")]
    pub graphql_expanded_types: Option<Vec<String>>,
    #[serde(rename = "toYAML")]
    pub to_yaml: Option<bool>,
    pub filename: Option<String>,
}

impl ProjectConfig {
    /// Parse a config file. `.json` is read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            crate::path_de::from_json_str_with_path::<ProjectConfig>(&source)
        } else {
            crate::path_de::from_yaml_str_with_path::<ProjectConfig>(&source)
        };
        parsed.map_err(|message| Error::Config { path: path.to_path_buf(), message })
    }

    /// Look for a config file in `dir`. Absent is not an error.
    pub fn discover(dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }

    /// Fill an unset `openapi_definition` from [`BASE_DOCUMENT_NAMES`] in `dir`.
    pub fn with_base_document_from(mut self, dir: &Path) -> Self {
        if self.openapi_definition.is_none() {
            self.openapi_definition = BASE_DOCUMENT_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file());
            if let Some(path) = self.openapi_definition.as_ref() {
                tracing::debug!(path = %path.display(), "using base document from the working directory");
            }
        }
        self
    }

    /// Field-wise overlay: values set in `other` win.
    pub fn overlay(self, other: ProjectConfig) -> ProjectConfig {
        ProjectConfig {
            json_schema: other.json_schema.or(self.json_schema),
            type_script: other.type_script.or(self.type_script),
            openapi_definition: other.openapi_definition.or(self.openapi_definition),
            types: other.types.or(self.types),
            expand_types: other.expand_types.or(self.expand_types),
            remove_props: other.remove_props.or(self.remove_props),
            detect_graphql: other.detect_graphql.or(self.detect_graphql),
            graphql_expanded_types: other.graphql_expanded_types.or(self.graphql_expanded_types),
            to_yaml: other.to_yaml.or(self.to_yaml),
            filename: other.filename.or(self.filename),
        }
    }

    pub fn resolve(self) -> ResolvedConfig {
        let defaults = Config::default();
        let engine = Config {
            remove_props: self.remove_props.unwrap_or_default().into_iter().collect(),
            expand_type_prefixes: self.expand_types.unwrap_or_default().into_iter().collect(),
            detect_wrapper: self.detect_graphql.unwrap_or(defaults.detect_wrapper),
            wrapper_prefixes: self
                .graphql_expanded_types
                .map(|xs| xs.into_iter().collect())
                .unwrap_or(defaults.wrapper_prefixes),
        };
        ResolvedConfig {
            engine,
            json_schema: self.json_schema.map(OneOrMany::into_vec).unwrap_or_default(),
            type_script: self.type_script.map(OneOrMany::into_vec).unwrap_or_default(),
            openapi_definition: self.openapi_definition,
            types: self.types.map(|t| TypeSelection::from_names(t.into_vec())).unwrap_or_default(),
            to_yaml: self.to_yaml.unwrap_or(true),
            filename: self.filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        }
    }
}

/// Read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub engine: Config,
    pub json_schema: Vec<String>,
    pub type_script: Vec<String>,
    pub openapi_definition: Option<PathBuf>,
    pub types: TypeSelection,
    pub to_yaml: bool,
    pub filename: String,
}
