//! Command-line interface for callmap.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Config, ReportFormat};
use crate::driver::Driver;
use crate::error::AnalysisError;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Map the functions, classes and call relationships of a Python module.
///
/// Callmap parses every source file of a module directory, walks each
/// syntax tree in document order and writes three reports: the functions,
/// the classes and the caller/callee pairs it found.
#[derive(Parser)]
#[command(name = "callmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug events
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one module and write its reports
    Analyze(AnalyzeArgs),
    /// Write the default configuration file
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Module directory name, relative to the base directory
    pub module: String,

    /// Directory modules are resolved against
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Directory the reports are written to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report format: json or yaml
    #[arg(short, long)]
    pub format: Option<ReportFormat>,

    /// Parse files on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Exit non-zero when any file was skipped
    #[arg(long)]
    pub strict: bool,

    /// List the functions that make no calls
    #[arg(long)]
    pub show_leaves: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "callmap.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Install the tracing subscriber. `RUST_LOG` takes precedence over flags.
pub fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Load the configuration named on the command line, or discover one.
fn load_config(path: Option<&Path>) -> Result<Config, AnalysisError> {
    match path {
        Some(p) => Config::parse_file(p),
        None => Config::load(),
    }
}

/// Exit code for a fatal analysis error.
fn exit_code_for(err: &AnalysisError) -> i32 {
    match err {
        AnalysisError::Usage(_) | AnalysisError::Config(_) => EXIT_ERROR,
        _ => EXIT_FAILED,
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    crate::init();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Flags override file values
    if let Some(dir) = &args.base_dir {
        config.base_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.output {
        config.output_dir = Some(dir.clone());
    }
    if let Some(format) = args.format {
        config.format = Some(format);
    }
    if args.parallel {
        config.parallel = Some(true);
    }

    let driver = match Driver::new(config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let summary = match driver.run(&args.module) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let AnalysisError::ModuleNotFound { .. } = e {
                eprintln!(
                    "Check the module name or pass --base-dir (currently {})",
                    driver.config().base_dir().display()
                );
            }
            return Ok(exit_code_for(&e));
        }
    };

    report::write_pretty(&summary, args.show_leaves);

    if args.strict && !summary.diagnostics.is_empty() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, config::DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set base_dir in {} to your source tree", args.output.display());
    println!("  2. Run: callmap analyze <MODULE> --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
