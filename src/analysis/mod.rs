//! Analyses over a [`ProjectIndex`](crate::index::ProjectIndex).
//!
//! Each analysis is a pure function of (index snapshot, options) returning
//! a serializable report: dependency graph topology with cycle detection,
//! duplicate block detection, complexity scoring, unused-export detection,
//! and the orphan-import companion check. Analyses share no state and never
//! call each other, so callers are free to run them in parallel.
//!
//! Invalid options are rejected up front; per-item failures inside a run
//! (an unresolvable import, an unanswerable reference lookup) recover with
//! a conservative default and never abort the analysis.

pub mod complexity;
pub mod dependencies;
pub mod duplicates;
pub mod unused;

use thiserror::Error;

/// Errors raised by analysis configuration validation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid {analysis} configuration: {message}")]
    InvalidConfig {
        analysis: &'static str,
        message: String,
    },

    #[error("Invalid ignore pattern: {0}")]
    BadPattern(#[from] globset::Error),
}

impl AnalysisError {
    pub(crate) fn config(analysis: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            analysis,
            message: message.into(),
        }
    }
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

// Re-export main entry points for convenience
pub use complexity::{ComplexityOptions, ComplexityReport, ComplexityThresholds};
pub use dependencies::{DependencyGraphReport, GraphOptions, OrphanReport};
pub use duplicates::{DuplicateOptions, DuplicateReport};
pub use unused::{UnusedExportOptions, UnusedExportReport};
