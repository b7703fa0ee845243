//! Normalize JSON Schema documents and generated type definitions into
//! OpenAPI 3.0 `components.schemas`.
pub mod assemble;
pub mod cli;
pub mod config;
pub mod convert;
pub mod definitions;
pub mod error;
pub mod logging;
pub mod node;
pub mod normalize;
pub mod path_de;
pub mod pipeline;
pub mod prune;
pub mod source;

pub use assemble::{Assembler, Collision};
pub use config::{Config, ProjectConfig, ResolvedConfig, TypeSelection};
pub use definitions::{DefinitionGenerator, DefinitionTable, DefinitionsFile};
pub use error::{Error, Result};
pub use node::SchemaNode;
pub use normalize::{normalize_definitions, Normalized, Normalizer};
pub use pipeline::{Built, OutputFormat, Pipeline};
pub use prune::prune;
