use std::fmt;

/// Errors from the fallible edge of the engine: loading configuration.
///
/// Reconciliation itself never fails; it degrades to "no fix".
#[derive(Debug)]
pub enum BagError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (overlapping lists, empty values, etc.).
    ConfigValidation(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for BagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for BagError {}
