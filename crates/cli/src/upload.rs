//! `bagcheck prepare-upload`.

use std::path::{Path, PathBuf};

use bagcheck_core::EditBatch;
use bagcheck_recon::normalize_references_for_upload;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::{emit_json, CliError};

#[derive(Serialize)]
struct UploadOutput<'a> {
    batch: Option<&'a EditBatch>,
    applied_changes: usize,
    written: Option<&'a Path>,
}

pub fn cmd_prepare_upload(
    dataset_path: PathBuf,
    output_file: Option<PathBuf>,
    dry_run: bool,
    json_output: bool,
) -> Result<(), CliError> {
    if dry_run && output_file.is_some() {
        return Err(CliError::args("--dry-run cannot be combined with --output"));
    }

    let mut dataset = Dataset::load(&dataset_path)?;
    let batch = normalize_references_for_upload(&dataset.objects);

    let mut applied_changes = 0;
    let mut written = None;
    if let Some(batch) = &batch {
        applied_changes = dataset.apply(batch)?;
        if !dry_run {
            let target = output_file.as_deref().unwrap_or(dataset_path.as_path());
            dataset.save(target)?;
            written = Some(target);
        }
    }

    emit_json(
        &UploadOutput { batch: batch.as_ref(), applied_changes, written },
        json_output,
        None,
    )?;

    match (&batch, written) {
        (None, _) => eprintln!("all references already canonical"),
        (Some(batch), Some(path)) => {
            eprintln!("{}: {} objects, wrote {}", batch.label, batch.edits.len(), path.display())
        }
        (Some(batch), None) => eprintln!("{}: {} objects (dry run)", batch.label, batch.edits.len()),
    }
    Ok(())
}
