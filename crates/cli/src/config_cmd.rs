//! `bagcheck config`: inspect and check taxonomy files.

use std::path::PathBuf;

use bagcheck_recon::ReconcileConfig;
use clap::Subcommand;

use crate::exit_codes::config_exit_code;
use crate::settings::{default_config_path, load_config};
use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective taxonomy as TOML
    #[command(after_help = "\
Examples:
  bagcheck config show
  bagcheck config show --config taxonomy.toml > my-taxonomy.toml")]
    Show {
        /// Taxonomy config (defaults to the user config, then built-ins)
        #[arg(long, env = "BAGCHECK_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Parse and validate a taxonomy file without running
    #[command(after_help = "\
Examples:
  bagcheck config check taxonomy.toml")]
    Check {
        /// Path to the taxonomy .toml file
        config: PathBuf,
    },

    /// Print where the default taxonomy file is looked up
    Path,
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Show { config } => cmd_config_show(config),
        ConfigCommands::Check { config } => cmd_config_check(config),
        ConfigCommands::Path => {
            println!("{}", default_config_path().display());
            Ok(())
        }
    }
}

fn cmd_config_show(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let rendered = config
        .to_toml()
        .map_err(|e| CliError::general(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

fn cmd_config_check(config_path: PathBuf) -> Result<(), CliError> {
    let config = ReconcileConfig::from_file(&config_path).map_err(|e| CliError {
        code: config_exit_code(&e),
        message: e.to_string(),
        hint: None,
    })?;

    eprintln!(
        "valid: {} specific, {} generic building values, {} exempt tags, {} note keys",
        config.building.specific.len(),
        config.building.generic.len(),
        config.exclusion.exempt.len(),
        config.exclusion.note_keys.len(),
    );
    Ok(())
}
