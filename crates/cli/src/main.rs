mod commands;
mod exit_code;
mod progress;

use clap::{Parser, Subcommand};
use rst_types::DiagnosticSeverity;
use std::path::PathBuf;

pub use exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "rst-check")]
#[command(about = "Check reStructuredText documents against their Sphinx configuration", long_about = None)]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to an rst-check settings file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Interpreter used to execute configuration artifacts and the validator
    #[arg(long, value_name = "COMMAND", global = true)]
    interpreter: Option<String>,

    /// Directory where artifact discovery stops walking upward
    #[arg(long, value_name = "DIR", global = true)]
    boundary: Option<PathBuf>,

    /// Force colored output even when not a TTY
    #[arg(long, global = true, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    /// Suppress all output except diagnostics and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Suppress progress indicators (spinners)
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output verbosity options
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// Whether to show progress indicators (spinners)
    pub show_progress: bool,
    /// Whether to show informational output (success messages, summaries)
    pub show_info: bool,
}

/// Values from global flags that override settings file values
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config: Option<PathBuf>,
    pub interpreter: Option<String>,
    pub boundary: Option<PathBuf>,
    pub report_level: Option<DiagnosticSeverity>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check documents, reconciling validator output with the governing conf.py
    ///
    /// Directories are searched recursively for `*.rst` files. With no paths,
    /// the current directory is checked.
    Check {
        /// Files or directories to check
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Minimum severity reported (info, warning, error, severe)
        #[arg(long, value_name = "LEVEL")]
        report_level: Option<DiagnosticSeverity>,
    },

    /// Show the governing artifact and the symbols harvested from it
    Symbols {
        /// Document or directory to resolve
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
    /// GitHub Actions workflow commands for PR annotations
    Github,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();
    let format = match &cli.command {
        Commands::Check { format, .. } | Commands::Symbols { format, .. } => *format,
    };
    let env_var = |name: &str| std::env::var_os(name).map(|v| v.to_string_lossy().into_owned());
    if let Some(enabled) = color_choice(cli.color, cli.no_color, format, env_var) {
        colored::control::set_override(enabled);
    }

    let output_opts = OutputOptions {
        show_progress: !cli.quiet && !cli.no_progress,
        show_info: !cli.quiet,
    };
    let overrides = SettingsOverrides {
        config: cli.config,
        interpreter: cli.interpreter,
        boundary: cli.boundary,
        report_level: None,
    };

    match cli.command {
        Commands::Check {
            paths,
            format,
            report_level,
        } => commands::check::run(
            &paths,
            SettingsOverrides {
                report_level,
                ..overrides
            },
            format,
            output_opts,
        ),
        Commands::Symbols { path, format } => commands::symbols::run(&path, overrides, format),
    }
}

/// Initialize tracing; filtered by `RUST_LOG`, silent by default
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Whether output is colored, or `None` to leave it to TTY detection.
///
/// `--color` wins over everything. Colors are off for `--no-color`, for
/// machine-read formats, and when `NO_COLOR` is set to anything. Otherwise a
/// non-zero `CLICOLOR_FORCE` turns them on and `CLICOLOR=0` turns them off
/// (<https://no-color.org/>, <https://bixense.com/clicolors/>).
fn color_choice(
    force_color: bool,
    no_color: bool,
    format: OutputFormat,
    var: impl Fn(&str) -> Option<String>,
) -> Option<bool> {
    if force_color {
        return Some(true);
    }
    if no_color || !matches!(format, OutputFormat::Human) || var("NO_COLOR").is_some() {
        return Some(false);
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return Some(true);
    }
    (var("CLICOLOR").as_deref() == Some("0")).then_some(false)
}
