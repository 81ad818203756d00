use std::collections::BTreeMap;

use serde::Serialize;

use crate::reconcile::{FixOutcome, ProposedFix};
use crate::run::{Finding, FindingKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total_findings: usize,
    pub reference_duplicates: usize,
    pub postcode_duplicates: usize,
    pub street_duplicates: usize,
    pub tag_updates: usize,
    pub geometry_merges: usize,
    pub no_fix: usize,
    /// `NoFixReason::code` -> count.
    pub no_fix_reasons: BTreeMap<String, usize>,
}

/// Count findings per kind and fix outcomes per variant.
pub fn compute_summary(findings: &[Finding], fixes: &[ProposedFix]) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total_findings: findings.len(),
        ..Default::default()
    };

    for finding in findings {
        match finding.kind {
            FindingKind::DuplicateReference => summary.reference_duplicates += 1,
            FindingKind::DuplicatePostcodeHouseNumber => summary.postcode_duplicates += 1,
            FindingKind::DuplicateStreetHouseNumber => summary.street_duplicates += 1,
        }
    }

    for fix in fixes {
        match &fix.outcome {
            FixOutcome::TagUpdate(_) => summary.tag_updates += 1,
            FixOutcome::GeometryMerge(_) => summary.geometry_merges += 1,
            FixOutcome::NoFix { reason } => {
                summary.no_fix += 1;
                *summary
                    .no_fix_reasons
                    .entry(reason.code().to_string())
                    .or_insert(0) += 1;
            }
        }
    }

    summary
}
