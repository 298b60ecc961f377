use crate::batch::{generate_batch, load_annotations};
use crate::config::GeneratorConfig;
use crate::generator::ExampleGenerator;
use crate::registry::{load_registry, SchemaRegistry};
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command-line interface for brrtdoc
#[derive(Parser)]
#[command(name = "brrtdoc")]
#[command(about = "Resolve response annotations into OpenAPI examples", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one annotation line
    Resolve {
        /// Schema registry file (YAML or JSON)
        #[arg(short, long)]
        schemas: PathBuf,

        /// Route used to name derived schemas (e.g. /users/:id/comments)
        #[arg(short, long)]
        route: Option<String>,

        /// HTTP method used to name derived schemas
        #[arg(short, long)]
        method: Option<String>,

        /// Print only the example payload
        #[arg(long, default_value_t = false)]
        example_only: bool,

        /// The annotation, e.g. "<User>.with(posts).exclude(timestamps)"
        line: String,
    },
    /// Resolve a file of route annotations
    Batch {
        /// Schema registry file (YAML or JSON)
        #[arg(short, long)]
        schemas: PathBuf,

        /// Annotation list file (YAML or JSON)
        #[arg(short, long)]
        annotations: PathBuf,
    },
}

/// Parse arguments from the process and print the result to stdout.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}

/// Run a parsed command, writing pretty JSON to `out`.
pub fn execute(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = GeneratorConfig::from_env();
    let document = match cli.command {
        Commands::Resolve {
            schemas,
            route,
            method,
            example_only,
            line,
        } => {
            let registry = open_registry(&schemas)?;
            let mut generator = ExampleGenerator::with_config(&registry, config);
            if let Some(route) = route {
                generator.set_current_route(route);
            }
            if let Some(method) = method {
                generator.set_current_method(&method);
            }
            if example_only {
                generator.example_for(&line)
            } else {
                let response = generator.response_for(&line);
                json!({
                    "response": response,
                    "components": {"schemas": generator.custom_schemas().to_components()},
                })
            }
        }
        Commands::Batch {
            schemas,
            annotations,
        } => {
            let registry = open_registry(&schemas)?;
            let annotations = load_annotations(&annotations)?;
            generate_batch(&registry, &config, &annotations).to_json()
        }
    };
    write_json(out, &document)
}

fn open_registry(path: &Path) -> anyhow::Result<SchemaRegistry> {
    let registry = load_registry(path)?.with_pagination_meta();
    debug!(path = %path.display(), schemas = registry.len(), "loaded schema registry");
    Ok(registry)
}

fn write_json(out: &mut impl Write, document: &Value) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, document).context("failed to serialize output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}
