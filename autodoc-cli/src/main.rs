//! autodoc CLI - generated Google-style docstrings for Python functions

use anyhow::Context;
use autodoc_core::config;
use autodoc_core::credentials;
use autodoc_core::{
    document_file, validate_target, DriverOptions, GeminiOracle, OracleError, ParseError,
    RunSummary,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "autodoc")]
#[command(about = "Document every function in a Python module with a generated docstring")]
#[command(version = env!("AUTODOC_VERSION"))]
struct Cli {
    /// Path to the Python module to document (rewritten in place)
    module: PathBuf,

    /// Gemini model id (overrides config file, default: gemini-1.5-flash)
    #[arg(long)]
    model: Option<String>,

    /// Path to config file (default: auto-discover)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generation attempts per function (overrides config file)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    max_attempts: Option<u8>,

    /// Generate docstrings without writing the module
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // The key is required before anything touches the filesystem
    let api_key = credentials::load_api_key()?;

    validate_target(&cli.module)?;

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let resolved_config = config::load_and_resolve(&cwd, cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(config_path) = &resolved_config.config_path {
        eprintln!("Using config: {}", config_path.display());
    }

    // CLI flags override config file values
    let model = cli.model.unwrap_or(resolved_config.model);
    let options = DriverOptions {
        max_attempts: cli
            .max_attempts
            .map(usize::from)
            .unwrap_or(resolved_config.max_attempts),
        prompt: resolved_config.prompt,
        dry_run: cli.dry_run,
    };

    let oracle = GeminiOracle::new(api_key, model)?
        .with_base_url(resolved_config.api_base_url)
        .with_timeout(resolved_config.timeout)?;

    match oracle.verify_model() {
        Ok(()) => {}
        Err(OracleError::Permanent(message)) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        Err(OracleError::Transient(message)) => {
            eprintln!("Error: Gemini internal error: {}", message);
            std::process::exit(1);
        }
    }

    info!(module = %cli.module.display(), model = %oracle.model(), "starting");
    let summary = match document_file(&cli.module, &oracle, &options) {
        Ok(summary) => summary,
        Err(err) => {
            if let Some(parse_error) = err.downcast_ref::<ParseError>() {
                eprintln!("Error: {}: {}", cli.module.display(), parse_error);
                std::process::exit(1);
            }
            return Err(err);
        }
    };

    print_summary(&cli.module, &summary, options.dry_run);
    Ok(())
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,autodoc={level},autodoc_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(module: &Path, summary: &RunSummary, dry_run: bool) {
    let verb = if dry_run { "would document" } else { "documented" };
    println!(
        "{}: {} {} of {} functions",
        module.display(),
        verb,
        summary.documented.len(),
        summary.functions()
    );
    for skipped in &summary.skipped {
        println!("  skipped {}: {}", skipped.name, skipped.reason);
    }
    if dry_run {
        print!("{}", summary.source);
    }
}
