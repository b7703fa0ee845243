//! CLI: (json-schema | definitions | both) → OpenAPI components
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::config::{OneOrMany, ProjectConfig, ResolvedConfig};
use crate::definitions::DefinitionsFile;
use crate::pipeline::{encode, output_path, write_document, write_fragments, OutputFormat, Pipeline};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert JSON Schema documents and generated type definitions into OpenAPI component schemas
#[derive(Parser, Debug)]
#[command(name = "schema-wagon", version)]
pub struct CommandLineInterface {
    /// config file (default: .schemawagonrc, .schemawagonrc.json or .schemawagonrc.yaml in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// merge every configured source into one OpenAPI document
    Build(BuildOut),
    /// convert JSON Schema documents only and print the components fragment
    JsonSchema(FragmentOut),
    /// convert generated definition files only and print the components fragment
    Definitions(DefinitionsOut),
}

#[derive(Args, Debug, Clone, Default)]
struct TransformSettings {
    /// extra keys to strip from every schema (repeatable)
    #[arg(long = "remove-prop")]
    remove_props: Vec<String>,

    /// generic type prefixes to inline instead of reference, e.g. `Partial` for `Partial<User>` (repeatable)
    #[arg(long = "expand-type")]
    expand_types: Vec<String>,

    /// nullable wrapper prefixes, e.g. `Maybe` for `Maybe<User>` (repeatable)
    #[arg(long = "wrapper-type")]
    wrapper_types: Vec<String>,

    /// do not fold `Wrapper<T>` null unions into `nullable: true`
    #[arg(long, default_value_t = false)]
    no_detect_wrapper: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct OutputSettings {
    /// emit JSON instead of YAML
    #[arg(long, default_value_t = false)]
    json: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct BuildOut {
    #[command(flatten)]
    transform: TransformSettings,

    #[command(flatten)]
    output: OutputSettings,

    /// JSON Schema files; literal paths or quoted glob patterns
    #[arg(long, num_args = 1..)]
    json_schema: Vec<String>,

    /// generated definition files (documents with a `definitions` table); literal paths or quoted glob patterns
    #[arg(long, num_args = 1..)]
    definitions: Vec<String>,

    /// type names to take from definition files; `*` for all
    #[arg(long, num_args = 1..)]
    types: Vec<String>,

    /// base OpenAPI document the components are merged into
    #[arg(long)]
    openapi_definition: Option<PathBuf>,

    /// JSON Pointer selecting a subnode in each JSON Schema document (e.g. /components/schemas/Pet)
    #[arg(long)]
    json_pointer: Option<String>,

    /// output file (extension is adjusted to the output format)
    #[arg(short, long)]
    out: Option<String>,

    /// also write one `<name>.components.<ext>` fragment per source into this directory
    #[arg(long)]
    fragments_dir: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct FragmentOut {
    #[command(flatten)]
    transform: TransformSettings,

    #[command(flatten)]
    output: OutputSettings,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON Pointer selecting a subnode in each document
    #[arg(long)]
    json_pointer: Option<String>,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DefinitionsOut {
    #[command(flatten)]
    transform: TransformSettings,

    #[command(flatten)]
    output: OutputSettings,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// type names to convert; `*` for all
    #[arg(long, num_args = 1..)]
    types: Vec<String>,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl TransformSettings {
    fn apply(&self, mut project: ProjectConfig) -> ProjectConfig {
        if !self.remove_props.is_empty() {
            project.remove_props = Some(self.remove_props.clone());
        }
        if !self.expand_types.is_empty() {
            project.expand_types = Some(self.expand_types.clone());
        }
        if !self.wrapper_types.is_empty() {
            project.graphql_expanded_types = Some(self.wrapper_types.clone());
        }
        if self.no_detect_wrapper {
            project.detect_graphql = Some(false);
        }
        project
    }
}

impl OutputSettings {
    fn apply(&self, mut project: ProjectConfig) -> ProjectConfig {
        if self.json {
            project.to_yaml = Some(false);
        }
        project
    }
}

fn non_empty(xs: &[String]) -> Option<OneOrMany> {
    (!xs.is_empty()).then(|| OneOrMany::Many(xs.to_vec()))
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    fn file_config(&self) -> Result<ProjectConfig> {
        if let Some(path) = self.config.as_ref() {
            return ProjectConfig::load(path).with_context(|| format!("loading config {}", path.display()));
        }
        let cwd = std::env::current_dir().context("reading the working directory")?;
        match ProjectConfig::discover(&cwd)? {
            Some((path, config)) => {
                tracing::debug!(path = %path.display(), "using config file");
                Ok(config)
            }
            None => Ok(ProjectConfig::default()),
        }
    }

    pub fn run(&self) -> Result<()> {
        let file = self.file_config()?;
        match &self.cmd {
            Command::Build(target) => {
                let flags = ProjectConfig {
                    json_schema: non_empty(&target.json_schema),
                    type_script: non_empty(&target.definitions),
                    types: non_empty(&target.types),
                    openapi_definition: target.openapi_definition.clone(),
                    filename: target.out.clone(),
                    ..ProjectConfig::default()
                };
                let flags = target.output.apply(target.transform.apply(flags));
                let cwd = std::env::current_dir().context("reading the working directory")?;
                let config = file.overlay(flags).with_base_document_from(&cwd).resolve();

                // debug path
                if target.output.no_op {
                    eprintln!("{self:#?}\n{config:#?}");
                    return Ok(());
                }
                if config.json_schema.is_empty() && config.type_script.is_empty() {
                    anyhow::bail!("no inputs: pass --json-schema and/or --definitions, or set them in the config file");
                }

                let format = OutputFormat::from_to_yaml(config.to_yaml);
                let pipeline = Pipeline::new(&config, &DefinitionsFile)
                    .with_json_pointer(target.json_pointer.as_deref());
                let built = pipeline.build()?;
                let source = encode(&built.document, format)?;

                // All inputs converted; only now touch the filesystem.
                if let Some(dir) = target.fragments_dir.as_ref() {
                    write_fragments(dir, &built.sources, format)?;
                }
                let out = output_path(&config.filename, format);
                write_document(&out, &source)?;
                report(&out, built.collisions.len());
                Ok(())
            }
            Command::JsonSchema(target) => {
                let flags = ProjectConfig {
                    json_schema: non_empty(&target.input),
                    ..ProjectConfig::default()
                };
                let config = fragment_config(file, target.transform.apply(target.output.apply(flags)));
                if target.output.no_op {
                    eprintln!("{self:#?}\n{config:#?}");
                    return Ok(());
                }
                let pipeline = Pipeline::new(&config, &DefinitionsFile)
                    .with_json_pointer(target.json_pointer.as_deref());
                emit(&pipeline, &config, target.out.as_ref())
            }
            Command::Definitions(target) => {
                let flags = ProjectConfig {
                    type_script: non_empty(&target.input),
                    types: non_empty(&target.types),
                    ..ProjectConfig::default()
                };
                let config = fragment_config(file, target.transform.apply(target.output.apply(flags)));
                if target.output.no_op {
                    eprintln!("{self:#?}\n{config:#?}");
                    return Ok(());
                }
                let pipeline = Pipeline::new(&config, &DefinitionsFile);
                emit(&pipeline, &config, target.out.as_ref())
            }
        }
    }
}

/// Fragment subcommands take inputs from flags only and never merge a base document.
fn fragment_config(file: ProjectConfig, flags: ProjectConfig) -> ResolvedConfig {
    let file = ProjectConfig { json_schema: None, type_script: None, openapi_definition: None, ..file };
    file.overlay(flags).resolve()
}

fn emit(pipeline: &Pipeline<'_>, config: &ResolvedConfig, out: Option<&PathBuf>) -> Result<()> {
    let format = OutputFormat::from_to_yaml(config.to_yaml);
    let built = pipeline.build()?;
    let source = encode(&built.document, format)?;
    match out {
        Some(out) => {
            write_document(out, &source)?;
            report(out, built.collisions.len());
        }
        None => print!("{source}"),
    }
    Ok(())
}

fn report(out: &Path, collisions: usize) {
    let mut line = format!("{} {}", "wrote".green().bold(), out.display());
    if collisions > 0 {
        line.push_str(&format!(" ({} overwritten)", collisions.to_string().yellow()));
    }
    eprintln!("{line}");
}
