use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal conditions of a conversion run.
///
/// Expansion cycles and name collisions are not errors: the normalizer and
/// the assembler resolve them by policy and report them through `tracing`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("type `{type_name}` not found in {path}")]
    Generation { type_name: String, path: PathBuf },

    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern `{pattern}`: {source}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("glob pattern matched no files: {0}")]
    GlobEmpty(String),

    #[error(transparent)]
    GlobEntry(#[from] glob::GlobError),

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("json pointer `{pointer}` does not resolve in {path}")]
    Pointer { pointer: String, path: PathBuf },

    #[error("failed to encode output: {0}")]
    Encode(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Parse { path: path.into(), message: message.to_string() }
    }
}
