//! Complexity analysis: per-function nesting depth, size, and parameter
//! metrics checked against configurable thresholds.
//!
//! Comment stripping is a line-prefix heuristic, not a lexical comment-span
//! parser: a trimmed line starting with `//`, `/*`, or `*` counts as a
//! comment, and comment-like text inside string literals may be
//! misclassified. This is documented behavior; downstream thresholds were
//! tuned against it.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;
use tree_sitter::{Node, TreeCursor};

use crate::index::ProjectIndex;

use super::{AnalysisError, AnalysisResult};

/// Placeholder name for arrow functions not bound to any name.
const ANONYMOUS: &str = "<anonymous>";

/// Node kinds that add one level of structural nesting.
const NESTING_KINDS: [&str; 9] = [
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "switch_statement",
    "try_statement",
    "catch_clause",
    "ternary_expression",
];

/// Threshold configuration for complexity violations.
#[derive(Debug, Clone, Copy)]
pub struct ComplexityThresholds {
    pub max_loc: usize,
    pub max_nesting: usize,
    pub max_functions: usize,
    pub max_parameters: usize,
}

impl Default for ComplexityThresholds {
    fn default() -> Self {
        Self {
            max_loc: 300,
            max_nesting: 4,
            max_functions: 20,
            max_parameters: 5,
        }
    }
}

/// Options for the complexity analysis.
#[derive(Debug, Clone, Default)]
pub struct ComplexityOptions {
    /// Restrict analysis to these root-relative paths. Empty means all
    /// indexed files.
    pub files: Vec<String>,
    pub thresholds: ComplexityThresholds,
}

impl ComplexityOptions {
    /// Rejects threshold configurations that would flag everything.
    pub fn validate(&self) -> AnalysisResult<()> {
        let t = &self.thresholds;
        if t.max_loc == 0 || t.max_nesting == 0 || t.max_functions == 0 || t.max_parameters == 0 {
            return Err(AnalysisError::config(
                "complexity",
                "thresholds must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Metrics for one function-like declaration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMetrics {
    pub name: String,
    pub line: usize,
    pub parameters: usize,
    pub max_nesting: usize,
    pub loc: usize,
}

/// Metrics for one file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub loc: usize,
    pub loc_without_comments: usize,
    pub function_count: usize,
    pub max_nesting: usize,
    pub functions: Vec<FunctionMetrics>,
}

/// The threshold a violation was raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Loc,
    Nesting,
    Functions,
    Parameters,
}

impl ViolationKind {
    fn label(&self) -> &'static str {
        match self {
            ViolationKind::Loc => "loc",
            ViolationKind::Nesting => "nesting",
            ViolationKind::Functions => "functions",
            ViolationKind::Parameters => "parameters",
        }
    }
}

/// A single threshold violation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub value: usize,
    pub threshold: usize,
}

/// Per-file analysis result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileComplexity {
    pub path: String,
    pub metrics: FileMetrics,
    pub violations: Vec<Violation>,
}

/// Aggregate complexity summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexitySummary {
    pub total_files: usize,
    pub total_loc: usize,
    pub total_functions: usize,
    pub files_with_violations: usize,
    pub violations_by_type: BTreeMap<String, usize>,
}

/// Full complexity report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
    pub files: Vec<FileComplexity>,
    pub summary: ComplexitySummary,
}

/// Runs the complexity analysis.
pub fn analyze(index: &ProjectIndex, options: &ComplexityOptions) -> AnalysisResult<ComplexityReport> {
    options.validate()?;

    let targets: Vec<&crate::index::SourceFile> = if options.files.is_empty() {
        index.files().iter().collect()
    } else {
        options
            .files
            .iter()
            .filter_map(|path| match index.lookup(path) {
                Some(id) => Some(index.file(id)),
                None => {
                    warn!("target file not found in project: {}", path);
                    None
                }
            })
            .collect()
    };

    let mut files = Vec::with_capacity(targets.len());
    let mut violations_by_type: BTreeMap<String, usize> = BTreeMap::new();

    for file in &targets {
        let metrics = file_metrics(file);
        let violations = check_thresholds(&metrics, &options.thresholds);

        for violation in &violations {
            *violations_by_type
                .entry(violation.kind.label().to_string())
                .or_insert(0) += 1;
        }

        files.push(FileComplexity {
            path: file.path.clone(),
            metrics,
            violations,
        });
    }

    let summary = ComplexitySummary {
        total_files: files.len(),
        total_loc: files.iter().map(|f| f.metrics.loc).sum(),
        total_functions: files.iter().map(|f| f.metrics.function_count).sum(),
        files_with_violations: files.iter().filter(|f| !f.violations.is_empty()).count(),
        violations_by_type,
    };

    Ok(ComplexityReport { files, summary })
}

fn file_metrics(file: &crate::index::SourceFile) -> FileMetrics {
    let loc = file.lines.len();
    let loc_without_comments = file
        .lines
        .iter()
        .filter(|line| is_non_trivial(line))
        .count();

    let mut functions = Vec::new();
    let mut cursor = file.tree.root_node().walk();
    collect_functions(&mut cursor, &file.text, &mut functions);

    let max_nesting = functions.iter().map(|f| f.max_nesting).max().unwrap_or(0);

    FileMetrics {
        loc,
        loc_without_comments,
        function_count: functions.len(),
        max_nesting,
        functions,
    }
}

/// A line is non-trivial if, after trimming, it is non-empty and does not
/// start with a comment marker.
fn is_non_trivial(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !trimmed.starts_with("//")
        && !trimmed.starts_with("/*")
        && !trimmed.starts_with('*')
}

fn collect_functions(cursor: &mut TreeCursor, source: &str, functions: &mut Vec<FunctionMetrics>) {
    let node = cursor.node();

    if let Some(metrics) = function_metrics(&node, source) {
        functions.push(metrics);
    }

    if cursor.goto_first_child() {
        loop {
            collect_functions(cursor, source, functions);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

fn function_metrics(node: &Node, source: &str) -> Option<FunctionMetrics> {
    let name = match node.kind() {
        "function_declaration" | "generator_function_declaration" | "method_definition" => {
            named_field(node, "name", source).unwrap_or_else(|| ANONYMOUS.to_string())
        }
        "function_expression" | "generator_function" => named_field(node, "name", source)
            .or_else(|| binding_name(node, source))
            .unwrap_or_else(|| ANONYMOUS.to_string()),
        "arrow_function" => binding_name(node, source).unwrap_or_else(|| ANONYMOUS.to_string()),
        _ => return None,
    };

    let start = node.start_position();
    let end = node.end_position();

    Some(FunctionMetrics {
        name,
        line: start.row + 1,
        parameters: parameter_count(node),
        max_nesting: body_nesting(node),
        loc: end.row - start.row + 1,
    })
}

/// The name an arrow/function expression is bound to: a variable
/// declarator, an object property, a class field, or an assignment target.
fn binding_name(node: &Node, source: &str) -> Option<String> {
    let parent = node.parent()?;

    match parent.kind() {
        "variable_declarator" | "public_field_definition" | "field_definition" => {
            named_field(&parent, "name", source)
        }
        "pair" => named_field(&parent, "key", source),
        "assignment_expression" => named_field(&parent, "left", source),
        _ => None,
    }
}

fn named_field(node: &Node, field: &str, source: &str) -> Option<String> {
    let name_node = node.child_by_field_name(field)?;
    source
        .get(name_node.start_byte()..name_node.end_byte())
        .map(str::to_string)
}

/// Parameter count, handling both parenthesized parameter lists and the
/// single bare-identifier arrow form (`x => x + 1`).
fn parameter_count(node: &Node) -> usize {
    if let Some(params) = node.child_by_field_name("parameters") {
        return params.named_child_count();
    }
    if node.child_by_field_name("parameter").is_some() {
        return 1;
    }
    0
}

/// Maximum structural nesting depth within the function body.
///
/// Depth increases by one on entering any control-flow construct in
/// `NESTING_KINDS`; sibling branches do not add to each other. Descendants
/// of nested function definitions count toward the enclosing maximum too;
/// the nested function is additionally reported on its own.
fn body_nesting(node: &Node) -> usize {
    let Some(body) = node.child_by_field_name("body") else {
        return 0;
    };

    let mut max = 0;
    descend(&body, 0, &mut max);
    max
}

fn descend(node: &Node, depth: usize, max: &mut usize) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let child_depth = if NESTING_KINDS.contains(&child.kind()) {
            depth + 1
        } else {
            depth
        };
        if child_depth > *max {
            *max = child_depth;
        }
        descend(&child, child_depth, max);
    }
}

fn check_thresholds(metrics: &FileMetrics, thresholds: &ComplexityThresholds) -> Vec<Violation> {
    let mut violations = Vec::new();

    if metrics.loc > thresholds.max_loc {
        violations.push(Violation {
            kind: ViolationKind::Loc,
            message: format!(
                "File has {} lines (max {})",
                metrics.loc, thresholds.max_loc
            ),
            line: None,
            value: metrics.loc,
            threshold: thresholds.max_loc,
        });
    }

    if metrics.function_count > thresholds.max_functions {
        violations.push(Violation {
            kind: ViolationKind::Functions,
            message: format!(
                "File has {} functions (max {})",
                metrics.function_count, thresholds.max_functions
            ),
            line: None,
            value: metrics.function_count,
            threshold: thresholds.max_functions,
        });
    }

    for function in &metrics.functions {
        if function.max_nesting > thresholds.max_nesting {
            violations.push(Violation {
                kind: ViolationKind::Nesting,
                message: format!(
                    "Function '{}' has nesting depth {} (max {})",
                    function.name, function.max_nesting, thresholds.max_nesting
                ),
                line: Some(function.line),
                value: function.max_nesting,
                threshold: thresholds.max_nesting,
            });
        }
        if function.parameters > thresholds.max_parameters {
            violations.push(Violation {
                kind: ViolationKind::Parameters,
                message: format!(
                    "Function '{}' has {} parameters (max {})",
                    function.name, function.parameters, thresholds.max_parameters
                ),
                line: Some(function.line),
                value: function.parameters,
                threshold: thresholds.max_parameters,
            });
        }
    }

    violations
}
