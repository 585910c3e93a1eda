//! Unused-export detection via cross-file reference reachability.
//!
//! For every exported symbol outside the entry-point files, the syntactic
//! reference table decides whether any mention exists beyond the
//! declaration itself. Where the oracle has no vocabulary for a kind
//! (default exports, re-exports) the symbol is conservatively treated as
//! used, trading recall for zero false positives.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;

use crate::index::exports::ExportedSymbol;
use crate::index::references::ReferenceTable;
use crate::index::ProjectIndex;

use super::AnalysisResult;

/// Options for unused-export detection.
#[derive(Debug, Clone, Default)]
pub struct UnusedExportOptions {
    /// Root-relative paths whose exports are the program's public surface.
    /// Empty selects the conventional defaults (`index.*` / `main.*` at the
    /// root and under `src/`).
    pub entry_points: Vec<String>,
    /// Glob patterns for files to skip entirely.
    pub ignore_patterns: Vec<String>,
}

/// One export with no reference outside its declaration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedSymbol {
    pub name: String,
    pub line: usize,
    pub col: usize,
    pub kind: String,
}

/// Unused exports grouped per file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUnusedExports {
    pub file: String,
    pub exports: Vec<UnusedSymbol>,
}

/// Aggregate unused-export statistics over the examined files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedStats {
    pub total_exports: usize,
    pub unused_count: usize,
    pub used_count: usize,
    /// Integer percentage, rounded.
    pub unused_percentage: u32,
}

/// Full unused-export report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedExportReport {
    pub unused_exports: Vec<FileUnusedExports>,
    pub stats: UnusedStats,
}

/// Runs unused-export detection.
pub fn analyze(
    index: &ProjectIndex,
    options: &UnusedExportOptions,
) -> AnalysisResult<UnusedExportReport> {
    let ignore = build_ignore_set(&options.ignore_patterns)?;
    let references = ReferenceTable::build(index);

    let mut unused_exports: Vec<FileUnusedExports> = Vec::new();
    let mut total_exports = 0;
    let mut unused_count = 0;

    for file in index.files() {
        if is_entry_point(&file.path, &options.entry_points) {
            continue;
        }
        if ignore.as_ref().is_some_and(|set| set.is_match(&file.path)) {
            continue;
        }

        let mut unused: Vec<UnusedSymbol> = Vec::new();
        for export in &file.exports {
            total_exports += 1;
            if is_used(&references, file.id, export) {
                continue;
            }
            unused_count += 1;
            unused.push(UnusedSymbol {
                name: export.name.clone(),
                line: export.line,
                col: export.col,
                kind: export.kind.label().to_string(),
            });
        }

        if !unused.is_empty() {
            unused_exports.push(FileUnusedExports {
                file: file.path.clone(),
                exports: unused,
            });
        }
    }

    let used_count = total_exports - unused_count;
    let unused_percentage = if total_exports == 0 {
        0
    } else {
        ((unused_count as f64 / total_exports as f64) * 100.0).round() as u32
    };

    Ok(UnusedExportReport {
        unused_exports,
        stats: UnusedStats {
            total_exports,
            unused_count,
            used_count,
            unused_percentage,
        },
    })
}

/// A symbol is used when any reference occurs beyond the declaration site,
/// or when the reference oracle cannot answer for its kind.
fn is_used(references: &ReferenceTable, file: crate::index::FileId, export: &ExportedSymbol) -> bool {
    if export.kind.outside_reference_oracle() || export.name == "*" {
        return true;
    }
    references.referenced_outside_declaration(&export.name, file, export.line, export.col)
}

fn is_entry_point(path: &str, entry_points: &[String]) -> bool {
    if !entry_points.is_empty() {
        return entry_points.iter().any(|entry| entry == path);
    }
    default_entry_point(path)
}

/// Conventional entry points when none are configured: `index.*` and
/// `main.*` at the project root or directly under `src/`.
fn default_entry_point(path: &str) -> bool {
    let (dir, file_name) = match path.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", path),
    };
    if !(dir.is_empty() || dir == "src") {
        return false;
    }
    let stem = file_name.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_name);
    stem == "index" || stem == "main"
}

fn build_ignore_set(patterns: &[String]) -> AnalysisResult<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}
