//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Success                                   |
//! | 1    | General error (unspecified)               |
//! | 2    | CLI usage error (bad args)                |
//! | 3    | `validate` found duplicates               |
//! | 4    | Taxonomy config invalid or unparsable     |
//! | 5    | Dataset could not be parsed               |
//! | 6    | File could not be read or written         |

use bagcheck_recon::BagError;

use crate::dataset::DatasetError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Validation reported at least one duplicate finding.
pub const EXIT_DUPLICATES: u8 = 3;

/// Taxonomy config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Dataset JSON is malformed.
pub const EXIT_DATASET_PARSE: u8 = 5;

/// Read/write failure on a dataset, config or output file.
pub const EXIT_IO: u8 = 6;

pub fn config_exit_code(err: &BagError) -> u8 {
    match err {
        BagError::ConfigParse(_) | BagError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        BagError::Io(_) => EXIT_IO,
    }
}

pub fn dataset_exit_code(err: &DatasetError) -> u8 {
    match err {
        DatasetError::Io(_) => EXIT_IO,
        DatasetError::Parse(_) => EXIT_DATASET_PARSE,
        DatasetError::UnknownObject(_) => EXIT_ERROR,
    }
}
