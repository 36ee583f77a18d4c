//! Binary entry point for the irwalk CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Walk a tree with the identity callback and print the rebuilt tree
//! irwalk walk --input tree.json
//!
//! # Same, with a config file and a command-line override
//! irwalk --max-nesting 2048 walk --input tree.json --config irwalk.json
//!
//! # List every visited node with its traversal context
//! irwalk --verbosity nodes --log-level trace trace --input tree.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use irwalk::cli::{load_config, run_trace, run_walk, ConfigOverrides};
use irwalk_core::config::Verbosity;
use irwalk_core::error::{OutputErrorCode, WalkError};
use irwalk_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Callback-driven rewriting engine for compiler IR trees.
///
/// All output is JSON on stdout; diagnostics go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "irwalk",
    version,
    about = "Callback-driven rewriting engine for compiler IR trees"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Walker configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Walker trace output, overriding the config file.
    #[arg(long, global = true, value_enum)]
    verbosity: Option<VerbosityArg>,

    /// Callee symbol for rewritten copy markers, overriding the config file.
    #[arg(long, global = true)]
    copy_routine: Option<String>,

    /// Nesting limit, overriding the config file.
    #[arg(long, global = true)]
    max_nesting: Option<usize>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

impl GlobalArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            verbosity: self.verbosity.map(VerbosityArg::to_verbosity),
            copy_routine: self.copy_routine.clone(),
            max_nesting: self.max_nesting,
        }
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Walker trace output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum VerbosityArg {
    Quiet,
    Summary,
    Nodes,
}

impl VerbosityArg {
    fn to_verbosity(self) -> Verbosity {
        match self {
            VerbosityArg::Quiet => Verbosity::Quiet,
            VerbosityArg::Summary => Verbosity::Summary,
            VerbosityArg::Nodes => Verbosity::Nodes,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a tree with the identity callback and print the rebuilt tree.
    Walk {
        /// Tree to walk (JSON).
        #[arg(long)]
        input: PathBuf,
    },
    /// Print every visited node with its traversal context.
    Trace {
        /// Tree to walk (JSON).
        #[arg(long)]
        input: PathBuf,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::new(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), WalkError> {
    let config = load_config(cli.global.config.as_deref(), &cli.global.overrides())?;
    let mut stdout = io::stdout();
    let written = match cli.command {
        Command::Walk { input } => emit_response(&run_walk(&input, config)?, &mut stdout),
        Command::Trace { input } => emit_response(&run_trace(&input, config)?, &mut stdout),
    };
    written.map_err(|e| WalkError::internal(format!("failed to write output: {}", e)))
}

// ============================================================================
// Tests
// ============================================================================
