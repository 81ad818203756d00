//! Locating and loading the taxonomy config.

use std::path::{Path, PathBuf};

use bagcheck_recon::ReconcileConfig;

use crate::exit_codes::config_exit_code;
use crate::CliError;

/// `<config dir>/bagcheck/taxonomy.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bagcheck")
        .join("taxonomy.toml")
}

/// Load and validate the config at `explicit`, else the default path when
/// it exists, else the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ReconcileConfig, CliError> {
    let default_path = default_config_path();
    let path = match explicit {
        Some(path) => path,
        None if default_path.exists() => default_path.as_path(),
        None => {
            log::debug!("no taxonomy config at {}, using defaults", default_path.display());
            return Ok(ReconcileConfig::default());
        }
    };

    log::debug!("loading taxonomy config from {}", path.display());
    ReconcileConfig::from_file(path).map_err(|e| CliError {
        code: config_exit_code(&e),
        message: format!("{}: {e}", path.display()),
        hint: Some("run `bagcheck config show` to see the built-in defaults".to_string()),
    })
}
