//! Resource schema CLI
//!
//! Parses an annotated XML Schema file and prints the resulting schema model.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use xavyo_schema::{parse_schema_with, BuilderOptions, Schema, SchemaError};

#[derive(Parser)]
#[command(name = "xavyo-schema")]
#[command(about = "Inspect annotated resource schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema definition model as JSON
    Inspect {
        /// XML Schema file
        file: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Ignore resource annotations and build a plain schema
        #[arg(long)]
        non_resource: bool,
    },

    /// List resource object classes and their identifiers
    ObjectClasses {
        /// XML Schema file
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct ObjectClassSummary<'a> {
    name: String,
    native_object_class: Option<&'a str>,
    account_type: bool,
    default_account_type: bool,
    identifiers: Vec<String>,
    secondary_identifiers: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            file,
            pretty,
            non_resource,
        } => run_inspect(&file, pretty, non_resource),
        Commands::ObjectClasses { file } => run_object_classes(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load(file: &Path, options: BuilderOptions) -> Result<Schema, u8> {
    let xml = std::fs::read_to_string(file)
        .map_err(SchemaError::from)
        .map_err(|e| {
            eprintln!("Error reading {}: {e}", file.display());
            3u8
        })?;
    parse_schema_with(&xml, options).map_err(|e| {
        eprintln!("Error [{}]: {e}", e.error_code());
        1u8
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), u8> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {e}");
        2u8
    })?;
    println!("{output}");
    Ok(())
}

fn run_inspect(file: &Path, pretty: bool, non_resource: bool) -> Result<(), u8> {
    let options = if non_resource {
        BuilderOptions::non_resource()
    } else {
        BuilderOptions::default()
    };
    let schema = load(file, options)?;
    print_json(&schema, pretty)
}

fn run_object_classes(file: &Path) -> Result<(), u8> {
    let schema = load(file, BuilderOptions::default())?;
    let summaries: Vec<ObjectClassSummary<'_>> = schema
        .resource_object_definitions()
        .map(|def| ObjectClassSummary {
            name: def.name().to_string(),
            native_object_class: def.native_object_class(),
            account_type: def.is_account_type(),
            default_account_type: def.is_default_account_type(),
            identifiers: def.identifier_names().iter().map(ToString::to_string).collect(),
            secondary_identifiers: def
                .secondary_identifier_names()
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
        .collect();
    print_json(&summaries, true)
}
