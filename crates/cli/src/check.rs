//! `bagcheck validate` and `bagcheck fix`.

use std::path::{Path, PathBuf};

use bagcheck_core::EditBatch;
use bagcheck_recon::run::ReportMeta;
use bagcheck_recon::{
    compute_summary, reconcile_findings, validate, Finding, FixOutcome, ProposedFix,
    ValidationSummary,
};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::exit_codes::EXIT_DUPLICATES;
use crate::merge::{LogNotifier, TagTransferMerge};
use crate::settings::load_config;
use crate::{emit_json, CliError};

#[derive(Serialize)]
struct ValidateOutput<'a> {
    meta: &'a ReportMeta,
    summary: ValidationSummary,
    findings: &'a [Finding],
}

#[derive(Serialize)]
struct FixOutput<'a> {
    meta: &'a ReportMeta,
    summary: ValidationSummary,
    fixes: &'a [ProposedFix],
    notifications: &'a [String],
    applied_changes: usize,
    written: Option<&'a Path>,
}

pub fn cmd_validate(
    dataset_path: PathBuf,
    config_path: Option<PathBuf>,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    // Loaded for its validation errors; detection itself is taxonomy-free.
    load_config(config_path.as_deref())?;
    let dataset = Dataset::load(&dataset_path)?;

    let report = validate(dataset.live());
    let findings = report.findings();
    let summary = compute_summary(&findings, &[]);

    emit_json(
        &ValidateOutput { meta: &report.meta, summary: summary.clone(), findings: &findings },
        json_output,
        output_file.as_deref(),
    )?;

    if !json_output {
        for finding in &findings {
            let ids: Vec<String> = finding.objects.iter().map(ToString::to_string).collect();
            eprintln!(
                "{:?} {}: {} [{}]",
                finding.severity,
                finding.code,
                finding.message,
                ids.join(", ")
            );
        }
    }
    eprintln!(
        "{} objects: {} duplicate references, {} duplicate postcode addresses, {} duplicate street addresses",
        report.meta.objects_visited,
        summary.reference_duplicates,
        summary.postcode_duplicates,
        summary.street_duplicates,
    );

    if findings.is_empty() {
        Ok(())
    } else {
        Err(CliError {
            code: EXIT_DUPLICATES,
            message: format!("{} duplicate findings", findings.len()),
            hint: Some("run `bagcheck fix` to reconcile duplicate references".to_string()),
        })
    }
}

pub fn cmd_fix(
    dataset_path: PathBuf,
    config_path: Option<PathBuf>,
    no_merge: bool,
    output_file: Option<PathBuf>,
    dry_run: bool,
    json_output: bool,
) -> Result<(), CliError> {
    if dry_run && output_file.is_some() {
        return Err(CliError::args("--dry-run cannot be combined with --output")
            .with_hint("drop --dry-run to write the fixed dataset"));
    }

    let config = load_config(config_path.as_deref())?;
    let mut dataset = Dataset::load(&dataset_path)?;

    let report = validate(dataset.live());
    let findings = report.findings();

    let mut merger = TagTransferMerge { enabled: !no_merge };
    let mut notifier = LogNotifier::default();
    let fixes = {
        let by_id = dataset.index();
        reconcile_findings(
            &findings,
            |id| by_id.get(id).copied(),
            &config,
            &mut merger,
            &mut notifier,
        )
    };

    let batches: Vec<EditBatch> = fixes
        .iter()
        .filter_map(|fix| fix.outcome.batch().cloned())
        .collect();
    let mut applied_changes = 0;
    for batch in &batches {
        applied_changes += dataset.apply(batch)?;
    }

    let target = output_file.as_deref().unwrap_or(dataset_path.as_path());
    let written = if dry_run || batches.is_empty() {
        None
    } else {
        dataset.save(target)?;
        Some(target)
    };

    let summary = compute_summary(&findings, &fixes);
    emit_json(
        &FixOutput {
            meta: &report.meta,
            summary: summary.clone(),
            fixes: &fixes,
            notifications: &notifier.messages,
            applied_changes,
            written,
        },
        json_output,
        None,
    )?;

    if !json_output {
        for fix in &fixes {
            match &fix.outcome {
                FixOutcome::TagUpdate(batch) | FixOutcome::GeometryMerge(batch) => {
                    eprintln!("{}: {} ({} edits)", fix.key, batch.label, batch.edits.len())
                }
                FixOutcome::NoFix { reason } => eprintln!("{}: no fix, {reason}", fix.key),
            }
        }
    }
    eprintln!(
        "{} reference duplicates: {} tag updates, {} geometry merges, {} left for manual review",
        summary.reference_duplicates, summary.tag_updates, summary.geometry_merges, summary.no_fix,
    );
    if let Some(path) = written {
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}
