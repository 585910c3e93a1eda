//! Duplicate code block detection.
//!
//! Slides windows of normalized lines over every eligible file, hashes each
//! window with SHA-256, and groups identical windows into duplicate blocks.
//! Normalization trims whitespace and collapses string/template literal
//! contents to empty placeholders so blocks differing only in literal text
//! still match. Subsumption filtering keeps only the largest duplicated
//! unit at each location.
//!
//! The windowed scan is O(files x maxWindow x fileLength); the window cap
//! bounds that cost. A rolling hash would amortize the window recompute but
//! is an optimization, not a contract change.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::index::{FileId, ProjectIndex};

use super::{AnalysisError, AnalysisResult};

/// Default minimum duplicate block length in lines.
pub const DEFAULT_MIN_LINES: usize = 3;

/// Largest window size scanned; bounds the cost of the naive windowed scan.
pub const MAX_WINDOW_LINES: usize = 50;

/// Options for duplicate detection.
#[derive(Debug, Clone)]
pub struct DuplicateOptions {
    /// Minimum block length in lines.
    pub min_lines: usize,
    /// Skip test files (`*.test.*`, `*.spec.*`, `__tests__/`, `tests/`).
    pub ignore_tests: bool,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            min_lines: DEFAULT_MIN_LINES,
            ignore_tests: false,
        }
    }
}

impl DuplicateOptions {
    /// Rejects configurations the scan cannot honor.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.min_lines == 0 {
            return Err(AnalysisError::config("duplicates", "minLines must be >= 1"));
        }
        if self.min_lines > MAX_WINDOW_LINES {
            return Err(AnalysisError::config(
                "duplicates",
                format!("minLines must be <= {MAX_WINDOW_LINES}"),
            ));
        }
        Ok(())
    }
}

/// A single instance of a duplicate block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
    pub raw: String,
}

/// A contiguous run of normalized lines repeated at two or more
/// non-overlapping locations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateBlock {
    /// Canonical raw text, taken from the first occurrence.
    pub pattern: String,
    /// Block length in lines.
    pub lines: usize,
    pub occurrences: Vec<Occurrence>,
    /// Lines removable by deduplicating: `(occurrences - 1) * lines`.
    pub savings: usize,
}

/// Aggregate duplicate statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateStats {
    pub total_duplicate_blocks: usize,
    /// Lines involved across all occurrences: `length * occurrences` per
    /// block, so shared lines are counted once per occurrence.
    pub total_duplicate_lines: usize,
    pub potential_savings: usize,
    pub files_with_duplication: usize,
}

/// Full duplicate detection report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub duplicates: Vec<DuplicateBlock>,
    pub stats: DuplicateStats,
}

/// One raw window occurrence, recorded during the scan.
#[derive(Debug, Clone, Copy)]
struct WindowSite {
    file: FileId,
    /// 0-based start line.
    start: usize,
}

/// A candidate block: identical windows at >= 2 non-overlapping sites.
struct Candidate {
    len: usize,
    sites: Vec<WindowSite>,
}

/// Runs duplicate detection over every eligible file.
pub fn analyze(index: &ProjectIndex, options: &DuplicateOptions) -> AnalysisResult<DuplicateReport> {
    options.validate()?;

    let mut groups: HashMap<(usize, [u8; 32]), Vec<WindowSite>> = HashMap::new();

    for file in index.files() {
        if options.ignore_tests && is_test_file(&file.path) {
            continue;
        }

        let normalized: Vec<String> = file.lines.iter().map(|l| normalize_line(l)).collect();

        // Prefix sums of substantive lines for O(1) window checks.
        let mut substantive_prefix = vec![0usize; normalized.len() + 1];
        for (i, line) in normalized.iter().enumerate() {
            substantive_prefix[i + 1] = substantive_prefix[i] + usize::from(is_substantive(line));
        }

        let max_window = MAX_WINDOW_LINES.min(normalized.len());
        for window in options.min_lines..=max_window {
            for start in 0..=(normalized.len() - window) {
                let substantive = substantive_prefix[start + window] - substantive_prefix[start];
                if substantive < options.min_lines {
                    continue;
                }

                let mut hasher = Sha256::new();
                for line in &normalized[start..start + window] {
                    hasher.update(line.as_bytes());
                    hasher.update(b"\n");
                }
                let digest: [u8; 32] = hasher.finalize().into();

                groups
                    .entry((window, digest))
                    .or_default()
                    .push(WindowSite { file: file.id, start });
            }
        }
    }

    let mut candidates = collect_candidates(index, groups);

    // Longest first so subsumption keeps the largest unit at each location;
    // ties break on first site for run-to-run stability.
    candidates.sort_by(|a, b| {
        b.len
            .cmp(&a.len)
            .then_with(|| {
                let fa = &index.file(a.sites[0].file).path;
                let fb = &index.file(b.sites[0].file).path;
                fa.cmp(fb)
            })
            .then_with(|| a.sites[0].start.cmp(&b.sites[0].start))
    });

    let mut covered: HashMap<FileId, Vec<(usize, usize)>> = HashMap::new();
    let mut blocks: Vec<DuplicateBlock> = Vec::new();
    let mut files_touched: BTreeSet<FileId> = BTreeSet::new();

    for candidate in candidates {
        let novel = candidate.sites.iter().any(|site| {
            let range = (site.start, site.start + candidate.len - 1);
            !covered
                .get(&site.file)
                .is_some_and(|ranges| ranges.iter().any(|&(s, e)| s <= range.0 && range.1 <= e))
        });
        if !novel {
            continue;
        }

        for site in &candidate.sites {
            covered
                .entry(site.file)
                .or_default()
                .push((site.start, site.start + candidate.len - 1));
            files_touched.insert(site.file);
        }

        let occurrences: Vec<Occurrence> = candidate
            .sites
            .iter()
            .map(|site| {
                let file = index.file(site.file);
                let start_line = site.start + 1;
                let end_line = site.start + candidate.len;
                Occurrence {
                    file: file.path.clone(),
                    start_line,
                    end_line,
                    raw: file.raw_range(start_line, end_line),
                }
            })
            .collect();

        let savings = (occurrences.len() - 1) * candidate.len;
        blocks.push(DuplicateBlock {
            pattern: occurrences[0].raw.clone(),
            lines: candidate.len,
            occurrences,
            savings,
        });
    }

    blocks.sort_by(|a, b| {
        b.savings
            .cmp(&a.savings)
            .then_with(|| a.occurrences[0].file.cmp(&b.occurrences[0].file))
            .then_with(|| a.occurrences[0].start_line.cmp(&b.occurrences[0].start_line))
            .then_with(|| b.lines.cmp(&a.lines))
    });

    let stats = DuplicateStats {
        total_duplicate_blocks: blocks.len(),
        total_duplicate_lines: blocks.iter().map(|b| b.lines * b.occurrences.len()).sum(),
        potential_savings: blocks.iter().map(|b| b.savings).sum(),
        files_with_duplication: files_touched.len(),
    };

    Ok(DuplicateReport {
        duplicates: blocks,
        stats,
    })
}

/// Groups window sites by (length, hash) and keeps groups with >= 2
/// distinct, non-overlapping occurrences. Overlapping windows within one
/// file are deduplicated keeping the first.
fn collect_candidates(
    index: &ProjectIndex,
    groups: HashMap<(usize, [u8; 32]), Vec<WindowSite>>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for ((len, _digest), mut sites) in groups {
        if sites.len() < 2 {
            continue;
        }

        sites.sort_by(|a, b| {
            index
                .file(a.file)
                .path
                .cmp(&index.file(b.file).path)
                .then_with(|| a.start.cmp(&b.start))
        });

        let mut kept: Vec<WindowSite> = Vec::with_capacity(sites.len());
        let mut last_end: HashMap<FileId, usize> = HashMap::new();
        for site in sites {
            let overlaps = last_end
                .get(&site.file)
                .is_some_and(|&end| site.start <= end);
            if overlaps {
                continue;
            }
            last_end.insert(site.file, site.start + len - 1);
            kept.push(site);
        }

        if kept.len() >= 2 {
            candidates.push(Candidate { len, sites: kept });
        }
    }

    candidates
}

/// Collapses string and template literal contents to empty placeholders and
/// trims surrounding whitespace. Literals left open at end of line are
/// truncated at the line break.
pub fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' | '`' => {
                out.push(c);
                let mut escaped = false;
                for inner in chars.by_ref() {
                    if escaped {
                        escaped = false;
                        continue;
                    }
                    match inner {
                        '\\' => escaped = true,
                        _ if inner == c => {
                            out.push(c);
                            break;
                        }
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out.trim().to_string()
}

/// A normalized line is substantive when it contains anything beyond
/// brace/paren/bracket punctuation, so runs of closing braces never count
/// toward the minimum block length.
pub fn is_substantive(normalized: &str) -> bool {
    normalized
        .chars()
        .any(|c| !c.is_whitespace() && !matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ';' | ','))
}

/// Test-file predicate used by `ignoreTests`.
pub fn is_test_file(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    if file_name.contains(".test.") || file_name.contains(".spec.") {
        return true;
    }
    path.split('/').any(|part| part == "__tests__" || part == "tests")
}
