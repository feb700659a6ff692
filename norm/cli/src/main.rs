//! norm CLI - parse and check Notion schema files

mod error;
mod messages;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use norm_lib::client::NotionClient;
use norm_lib::config::NormConfig;
use norm_lib::schema::Schema;
use norm_lib::{NormError, SkippedLine, parse_with_diagnostics, validate_and_sync};
use serde_json::json;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;
use crate::messages::Messages;

#[derive(Parser)]
#[command(name = "norm", version)]
#[command(about = "Parse Notion schema files and check them against live databases", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a schema file and summarize its models
    Parse {
        /// Path to the schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Print the parsed models as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a schema file and validate it against the Notion databases it names
    ///
    /// Requires NOTION_TOKEN (or NOTION_API_KEY) in the environment or a .env file.
    Check {
        /// Path to the schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Print the validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,norm_lib=info,norm=info".to_string(),
            2 => "info,norm_lib=debug,norm=debug".to_string(),
            _ => "debug,norm_lib=trace,norm=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn load_schema(path: &Path) -> Result<(Schema, Vec<SkippedLine>), CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadSchema {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with_diagnostics(&text).map_err(|e| CliError::Norm(e.into()))
}

fn run_parse(schema_path: &Path, json: bool, messages: Messages) -> Result<(), CliError> {
    let (schema, skipped) = load_schema(schema_path)?;

    if json {
        let output = json!({ "models": schema.models, "skipped": skipped });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for model in &schema.models {
        println!("{} ({})", model.name, model.database_id);
        for field in &model.fields {
            let optional = if field.optional { "?" } else { "" };
            println!(
                "  {}: {}{} -> {} '{}'",
                field.name,
                field.type_token,
                optional,
                field.property_type,
                field.remote_name()
            );
        }
    }
    for line in &skipped {
        eprintln!("{}", messages.skipped(line.line, &line.text));
    }

    let fields = schema.models.iter().map(|m| m.fields.len()).sum::<usize>();
    println!("{}", messages.parsed(schema.len(), fields));
    Ok(())
}

async fn run_check(
    schema_path: &Path,
    json: bool,
    config: &NormConfig,
    messages: Messages,
) -> Result<(), CliError> {
    let (schema, skipped) = load_schema(schema_path)?;
    for line in &skipped {
        eprintln!("{}", messages.skipped(line.line, &line.text));
    }

    let client = NotionClient::from_config(config)?;
    let report = validate_and_sync(&schema, &client)
        .await
        .map_err(NormError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for model in &report.models {
        println!("{}", messages.model_ok(&model.model, &model.title));
        for property in &model.extra {
            println!("{}", messages.undeclared(property));
        }
    }
    println!("{}", messages.all_valid(report.models.len()));
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before reading any configuration
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let config = match NormConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let messages = Messages::new(config.locale);

    let result = match &cli.command {
        Commands::Parse { schema, json } => run_parse(schema, *json, messages),
        Commands::Check { schema, json } => run_check(schema, *json, &config, messages).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
