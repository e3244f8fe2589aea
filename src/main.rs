use std::path::PathBuf;

use clap::{Parser, Subcommand};
use golden_tools::fix::{self, FixMode};
use golden_tools::report::{self, ReportConventions};
use golden_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

const RULE_WIDTH: usize = 80;

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the run should end with a failing exit code.
fn run(cli: Cli) -> Result<bool> {
    init_logging(cli.verbose)?;
    let conventions = ReportConventions::with_prefixes(cli.entity_prefix);

    match cli.command {
        Command::Fix(args) => execute_fix(args, &conventions),
        Command::FixFile(args) => execute_fix_file(args, &conventions),
        Command::Schema(args) => execute_schema(args, &conventions),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn mode_for(check: bool) -> FixMode {
    if check { FixMode::Check } else { FixMode::Write }
}

fn execute_fix(args: FixArgs, conventions: &ReportConventions) -> Result<bool> {
    let summary = fix::fix_directory(&args.dir, conventions, mode_for(args.check))?;

    println!("Found {} golden files", summary.golden_files);
    println!("{}", "=".repeat(RULE_WIDTH));

    for report in &summary.reports {
        let path = report.path.display();
        match &report.result {
            Ok(outcome) if outcome.changed() => println!("✓ {path}: {outcome}"),
            Ok(outcome) => println!("  {path}: {outcome}"),
            Err(error) => println!("✗ {path}: Error - {error}"),
        }
    }

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Summary:");
    println!("  Fixed: {}", summary.fixed());
    println!("  Skipped: {}", summary.skipped());
    println!("  Errors: {}", summary.errors());

    let pending = args.check && summary.fixed() > 0;
    Ok(summary.errors() == 0 && !pending)
}

fn execute_fix_file(args: FixFileArgs, conventions: &ReportConventions) -> Result<bool> {
    if !args.json.exists() {
        return Err(ToolError::MissingInput(args.json));
    }

    let mode = mode_for(args.check);
    let outcome = fix::fix_json_file(&args.json, &args.golden, conventions, mode)?;
    println!("{}: {outcome}", args.json.display());

    Ok(!(args.check && outcome.changed()))
}

fn execute_schema(args: SchemaArgs, conventions: &ReportConventions) -> Result<bool> {
    if !args.golden.exists() {
        return Err(ToolError::MissingInput(args.golden));
    }

    let parsed = report::parse_report_file(&args.golden, conventions)?;
    println!("{}", serde_json::to_string_pretty(&parsed.schemas)?);
    for issue in &parsed.diagnostics.issues {
        eprintln!("warning: {issue}");
    }
    Ok(true)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Reshape resource cost fixtures to follow their golden reports."
)]
struct Cli {
    /// Emit debug logs unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Prefix marking resource lines in golden reports. Repeat to accept
    /// several providers.
    #[arg(long, global = true)]
    entity_prefix: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fix every JSON document that has a sibling golden report.
    Fix(FixArgs),
    /// Fix a single JSON document against a golden report.
    FixFile(FixFileArgs),
    /// Print the layout extracted from a golden report.
    Schema(SchemaArgs),
}

#[derive(clap::Args)]
struct FixArgs {
    /// Directory searched recursively for golden reports.
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Report what would change without writing files.
    #[arg(long)]
    check: bool,
}

#[derive(clap::Args)]
struct FixFileArgs {
    /// Resource document to reshape.
    #[arg(long)]
    json: PathBuf,

    /// Golden report describing the expected layout.
    #[arg(long)]
    golden: PathBuf,

    /// Report what would change without writing the file.
    #[arg(long)]
    check: bool,
}

#[derive(clap::Args)]
struct SchemaArgs {
    /// Golden report to parse.
    golden: PathBuf,
}
