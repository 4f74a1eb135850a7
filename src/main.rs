use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use indexsweep::config::Configuration;
use indexsweep::index::JsonlProvider;
use indexsweep::report::{ReportFormat, Reporter};

/// indexsweep - dead code detection driven by compiler symbol indexes
#[derive(Parser, Debug)]
#[command(name = "indexsweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Index export to analyze (one JSON occurrence record per line)
    #[arg(value_name = "INDEX_FILE")]
    index: PathBuf,

    /// Project root used to locate a configuration file
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Retain all public and open declarations
    #[arg(long)]
    retain_public: bool,

    /// Retain @objc and @objcMembers annotated declarations
    #[arg(long)]
    retain_objc_annotated: bool,

    /// Keep assign-only properties out of the report
    #[arg(long)]
    retain_assign_only_properties: bool,

    /// Retain all parameters of protocol requirements
    #[arg(long)]
    retain_unused_protocol_func_params: bool,

    /// File basenames treated as entry points (repeatable)
    #[arg(long, value_name = "FILE")]
    entry_point: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for the json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);
    info!("indexsweep v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    if !cli.index.exists() {
        eprintln!(
            "{}: index file not found: {}",
            "Error".red(),
            cli.index.display()
        );
        std::process::exit(2);
    }

    let provider = JsonlProvider::new(&cli.index);
    let results = indexsweep::run_analysis(&provider, &config).into_diagnostic()?;

    info!("analysis produced {} findings", results.total());

    let reporter = Reporter::new(cli.format.clone().into(), cli.output.clone());
    reporter.report(&results)?;

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(cli: &Cli) -> Result<Configuration> {
    let mut config = if let Some(config_path) = &cli.config {
        Configuration::from_file(config_path)?
    } else {
        Configuration::from_default_locations(&cli.path)?
    };

    // CLI flags override file settings.
    if cli.retain_public {
        config.retain_public = true;
    }
    if cli.retain_objc_annotated {
        config.retain_objc_annotated = true;
    }
    if cli.retain_assign_only_properties {
        config.retain_assign_only_properties = true;
    }
    if cli.retain_unused_protocol_func_params {
        config.retain_unused_protocol_func_params = true;
    }
    if !cli.entry_point.is_empty() {
        config.entry_point_filenames.extend(cli.entry_point.clone());
    }

    Ok(config)
}
