//! Input discovery and parsing.
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::node::{Scalar, SchemaNode};

/// Expand literal paths and glob patterns into a sorted, de-duplicated list.
///
/// A pattern with glob characters that matches nothing is an error; a literal
/// path is passed through and fails later at read time if missing.
pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let entries = glob::glob(pattern).map_err(|source| Error::GlobPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            let mut matched_any = false;
            for entry in entries {
                let path = entry?;
                if path.is_file() {
                    matched_any = true;
                    out.push(path);
                }
            }
            if !matched_any {
                return Err(Error::GlobEmpty(pattern.to_string()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    out.sort();
    out.dedup();
    Ok(out)
}

/// Parse JSON or YAML text. `.json` files go through `serde_json` for sharper
/// error positions; everything else through `serde_yaml`, which accepts JSON too.
pub fn parse_document(path: &Path, source: &str) -> Result<SchemaNode> {
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str::<SchemaNode>(source).map_err(|e| Error::parse(path, e))
    } else {
        serde_yaml::from_str::<serde_yaml::Value>(source)
            .map(from_yaml)
            .map_err(|e| Error::parse(path, e))
    }
}

/// YAML allows non-string keys (`200:` under `responses`); they are stringified.
fn from_yaml(value: serde_yaml::Value) -> SchemaNode {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => SchemaNode::null(),
        Yaml::Bool(b) => SchemaNode::bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => SchemaNode::string(s),
        Yaml::Sequence(xs) => SchemaNode::Sequence(xs.into_iter().map(from_yaml).collect()),
        Yaml::Mapping(m) => SchemaNode::Mapping(
            m.into_iter().map(|(k, v)| (yaml_key(k), from_yaml(v))).collect(),
        ),
        Yaml::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> SchemaNode {
    let number = if let Some(i) = n.as_i64() {
        Some(serde_json::Number::from(i))
    } else if let Some(u) = n.as_u64() {
        Some(serde_json::Number::from(u))
    } else {
        n.as_f64().and_then(serde_json::Number::from_f64)
    };
    number.map(|n| SchemaNode::Scalar(Scalar::Number(n))).unwrap_or_else(SchemaNode::null)
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(&other).map(|s| s.trim_end().to_string()).unwrap_or_default(),
    }
}

pub fn read_document(path: &Path) -> Result<SchemaNode> {
    let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_document(path, &source)
}
