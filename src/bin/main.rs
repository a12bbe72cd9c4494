//! sq CLI - Normalize and describe structured queries
//!
//! Usage:
//!   sq clean <query.json>
//!   sq describe <query.json> --metadata <catalog.json> [--table <id>] [--rich]
//!   sq check-field <json>
//!
//! Examples:
//!   sq clean saved/orders_by_month.json
//!   sq describe saved/orders_by_month.json --metadata catalog.json
//!   sq check-field '["fk->", ["field-id", 11], ["field-id", 20]]'

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use structured_query::config::Settings;
use structured_query::describe::{render_plain, QueryDescriber, PlainExpressionFormatter};
use structured_query::metadata::{Catalog, CatalogProvider, DefaultCapabilities};
use structured_query::normalize::clean_query;
use structured_query::query::{FieldReference, StructuredQuery};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sq")]
#[command(about = "sq - Normalize and describe structured queries")]
#[command(version)]
struct Cli {
    /// Path to a TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the normalized form of a query
    Clean {
        /// Path to the query JSON file
        file: PathBuf,
    },

    /// Describe a query in plain language
    Describe {
        /// Path to the query JSON file
        file: PathBuf,

        /// Path to the catalog JSON file
        #[arg(short, long)]
        metadata: PathBuf,

        /// Table to describe against (defaults to the query's source table)
        #[arg(short, long)]
        table: Option<i64>,

        /// Print the tagged segments as JSON
        #[arg(long)]
        rich: bool,
    },

    /// Classify a field reference
    CheckField {
        /// The field reference as JSON
        json: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Clean { file } => cmd_clean(&file),
        Commands::Describe {
            file,
            metadata,
            table,
            rich,
        } => cmd_describe(&settings, &file, &metadata, table, rich),
        Commands::CheckField { json } => cmd_check_field(&json),
    }
}

fn read_query(file: &Path) -> Option<StructuredQuery> {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return None;
        }
    };
    match StructuredQuery::from_json(&source) {
        Ok(query) => Some(query),
        Err(e) => {
            eprintln!("Error in '{}': {}", file.display(), e);
            None
        }
    }
}

fn cmd_clean(file: &Path) -> ExitCode {
    let Some(query) = read_query(file) else {
        return ExitCode::FAILURE;
    };

    match serde_json::to_string_pretty(&clean_query(&query)) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing query: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_describe(settings: &Settings, file: &Path, metadata: &Path, table: Option<i64>, rich: bool) -> ExitCode {
    let Some(query) = read_query(file) else {
        return ExitCode::FAILURE;
    };

    let catalog: Catalog = match fs::read_to_string(metadata)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading catalog '{}': {}", metadata.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let Some(table_id) = table.or(query.source_table) else {
        eprintln!("No table given and the query has no source table");
        return ExitCode::FAILURE;
    };
    let Some(table) = catalog.table(table_id) else {
        eprintln!("Table {} not found in catalog", table_id);
        return ExitCode::FAILURE;
    };

    let mut options = match settings.describe.to_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    options.rich |= rich;

    let describer = QueryDescriber::new(&catalog, &DefaultCapabilities, &PlainExpressionFormatter);
    let segments = describer.describe(table, &query, &options);

    if options.rich {
        match serde_json::to_string_pretty(&segments) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error writing description: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", render_plain(&segments));
    }
    ExitCode::SUCCESS
}

fn cmd_check_field(json: &str) -> ExitCode {
    let value: serde_json::Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let field = FieldReference::from_value(&value);
    println!("Kind:   {}", field_kind(&field));
    println!("Valid:  {}", field.is_valid());
    match field.target_id() {
        Some(target) => println!("Target: {:?}", target),
        None => println!("Target: (none)"),
    }
    if let Some(unit) = field.datetime_unit() {
        println!("Unit:   {}", unit);
    }

    if field.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn field_kind(field: &FieldReference) -> &'static str {
    match field {
        FieldReference::Plain(_) => "field id (bare)",
        FieldReference::LocalField(_) => "field id",
        FieldReference::ForeignKey { .. } => "foreign key",
        FieldReference::DatetimeCast { .. } => "datetime field",
        FieldReference::BinningStrategy { .. } => "binning strategy",
        FieldReference::Expression(_) => "expression",
        FieldReference::AggregateResult(_) => "aggregation",
        FieldReference::FieldLiteral { .. } => "field literal",
        FieldReference::Malformed(_) => "malformed",
    }
}
