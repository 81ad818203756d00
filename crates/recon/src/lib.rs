//! `bagcheck-recon`: duplicate detection and reconciliation for BAG-tagged
//! map data.
//!
//! Pure engine crate: the caller visits pre-loaded objects, the engine
//! returns collision groups and proposed edit batches. No CLI or dataset IO;
//! the only file it reads is a taxonomy config.

pub mod config;
pub mod error;
pub mod exclusion;
pub mod index;
pub mod keys;
pub mod merge;
pub mod reconcile;
pub mod reference;
pub mod run;
pub mod summary;
pub mod upload;

pub use config::ReconcileConfig;
pub use error::BagError;
pub use exclusion::{ExclusionPolicy, Exemption};
pub use index::DuplicateIndex;
pub use merge::{GeometryMerger, MergeOutcome, Notifier};
pub use reconcile::{
    propose_tag_updates, reconcile, reconcile_findings, FixOutcome, NoFixReason, ProposedFix,
};
pub use reference::{BagReference, BagReferenceIndex};
pub use run::{validate, Finding, FindingKind, Severity, ValidationReport, ValidationRun};
pub use summary::{compute_summary, ValidationSummary};
pub use upload::normalize_references_for_upload;
