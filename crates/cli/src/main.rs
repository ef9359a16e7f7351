mod report;
mod schema_file;

use anyhow::{Context, Result};
use argspec::{ParseOutcome, Schema, help};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::report::ParseReport;
use crate::schema_file::{DEFAULT_SCHEMA_NAME, load_schema_file, write_default_schema};

/// Exit status for argv rejected by the schema.
const USAGE_ERROR_STATUS: i32 = 2;

#[derive(Parser)]
#[command(name = "argspec")]
#[command(version, about = "Parse argument vectors against a JSON argument schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter argspec.json
    Init(InitArgs),

    /// Compile a schema file and report problems
    Check(SchemaArgs),

    /// Print the help text a schema renders
    Usage(UsageArgs),

    /// Parse an argument vector against a schema
    Parse(ParseArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Overwrite an existing schema file
    #[arg(long)]
    force: bool,
}

#[derive(Parser)]
struct SchemaArgs {
    /// Path to the schema file
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,
}

#[derive(Parser)]
struct UsageArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Program name for the usage line
    #[arg(short, long, default_value = "program")]
    program: String,
}

#[derive(Parser)]
struct ParseArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Argument vector to parse; the first entry is the program name
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check(args),
        Commands::Usage(args) => usage(args),
        Commands::Parse(args) => parse(args),
    }
}

fn load_schema(args: &SchemaArgs) -> Result<Schema> {
    let file = load_schema_file(&args.schema)?;
    file.compile()
        .with_context(|| format!("{}", args.schema.display()))
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let dest = write_default_schema(&dir, args.force)?;

    eprintln!("Created: {}", dest.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_SCHEMA_NAME} to describe your arguments");
    eprintln!("  2. Run: argspec usage");
    eprintln!("  3. Run: argspec parse -- prog --verbose input.txt");

    Ok(())
}

fn check(args: SchemaArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let schema = load_schema(&args)?;
    eprintln!(
        "OK: {} flag(s), {} option(s), {} positional(s)",
        schema.flags().len(),
        schema.options().len(),
        schema.positionals().len()
    );
    Ok(())
}

fn usage(args: UsageArgs) -> Result<()> {
    tracing::debug!("executing usage command");

    let schema = load_schema(&args.schema)?;
    print!("{}", schema.help(&args.program));
    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let schema = load_schema(&args.schema)?;
    let argv = args.args;
    let program = help::program_name(&argv);

    let result = match schema.parse(&argv) {
        Ok(ParseOutcome::Success(result)) => result,
        Ok(ParseOutcome::HelpRequested) => {
            print!("{}", schema.help(program));
            return Ok(());
        }
        Err(err) => {
            tracing::debug!(kind = ?err.kind(), "rejected argument vector");
            eprintln!("error: {err}\n");
            eprint!("{}", schema.help(program));
            std::process::exit(USAGE_ERROR_STATUS);
        }
    };

    for (name, value) in result.entries(&schema) {
        tracing::debug!(name, %value, "parsed argument");
    }

    let report = ParseReport::new(&schema, program, &result);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
