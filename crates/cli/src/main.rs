// bagcheck - duplicate BAG object detection for JSON map datasets

mod check;
mod config_cmd;
mod dataset;
mod exit_codes;
mod merge;
mod settings;
mod upload;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use flexi_logger::{Logger, LoggerHandle};

use config_cmd::ConfigCommands;
use dataset::DatasetError;
use exit_codes::{dataset_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "bagcheck")]
#[command(about = "Find and reconcile duplicate BAG objects in a map dataset")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report duplicate BAG references and duplicate addresses
    #[command(after_help = "\
Examples:
  bagcheck validate buildings.json
  bagcheck validate buildings.json --json
  bagcheck validate buildings.json --config taxonomy.toml --output findings.json")]
    Validate {
        /// Dataset JSON file with an "objects" array
        dataset: PathBuf,

        /// Taxonomy config (defaults to the user config, then built-ins)
        #[arg(long, env = "BAGCHECK_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Reconcile duplicate pairs and write the fixed dataset
    #[command(after_help = "\
Examples:
  bagcheck fix buildings.json --output fixed.json
  bagcheck fix buildings.json --dry-run --json
  bagcheck fix buildings.json --no-merge")]
    Fix {
        /// Dataset JSON file
        dataset: PathBuf,

        /// Taxonomy config (defaults to the user config, then built-ins)
        #[arg(long, env = "BAGCHECK_CONFIG")]
        config: Option<PathBuf>,

        /// Only apply tag updates; never merge geometries
        #[arg(long)]
        no_merge: bool,

        /// Write the fixed dataset here instead of in place
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Propose fixes without writing the dataset
        #[arg(long)]
        dry_run: bool,

        /// Output the fix report as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Pad short ref:bag values on new and modified objects
    #[command(after_help = "\
Examples:
  bagcheck prepare-upload buildings.json
  bagcheck prepare-upload buildings.json --output upload.json --json")]
    PrepareUpload {
        /// Dataset JSON file
        dataset: PathBuf,

        /// Write the padded dataset here instead of in place
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Report edits without writing the dataset
        #[arg(long)]
        dry_run: bool,

        /// Output the edit batch as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Inspect or check the building taxonomy config
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: bagcheck <command> [options]");
            eprintln!("       bagcheck --help for more information");
            Err(CliError::args(""))
        }
        Some(Commands::Validate { dataset, config, json, output }) => {
            check::cmd_validate(dataset, config, json, output)
        }
        Some(Commands::Fix { dataset, config, no_merge, output, dry_run, json }) => {
            check::cmd_fix(dataset, config, no_merge, output, dry_run, json)
        }
        Some(Commands::PrepareUpload { dataset, output, dry_run, json }) => {
            upload::cmd_prepare_upload(dataset, output, dry_run, json)
        }
        Some(Commands::Config(cmd)) => config_cmd::cmd_config(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// stderr logger; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) -> Option<LoggerHandle> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logging disabled: {e}");
            None
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<DatasetError> for CliError {
    fn from(err: DatasetError) -> Self {
        Self { code: dataset_exit_code(&err), message: err.to_string(), hint: None }
    }
}

/// Serialize `value`, write it to `output` if given, and print it when
/// `json` is set.
pub fn emit_json<T: serde::Serialize>(
    value: &T,
    json: bool,
    output: Option<&std::path::Path>,
) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(path) = output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json {
        println!("{json_str}");
    }
    Ok(())
}
