//! Markdown report implementation.
//!
//! Renders the merged analysis report as a human-readable summary for
//! documentation and review threads.

use std::io::{self, Write};

use super::{ProjectReport, Reporter};

/// Markdown reporter implementation.
pub struct MarkdownReporter;

impl Reporter for MarkdownReporter {
    fn write<W: Write>(&self, report: &ProjectReport, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# Refactoring Analysis Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Project root:** {}", report.root)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(
            writer,
            "| Files | {} |",
            report.dependency_graph.stats.total_files
        )?;
        writeln!(
            writer,
            "| Circular Dependencies | {} |",
            report.dependency_graph.stats.circular_deps.len()
        )?;
        writeln!(
            writer,
            "| Duplicate Blocks | {} |",
            report.duplicates.stats.total_duplicate_blocks
        )?;
        writeln!(
            writer,
            "| Potential Savings (lines) | {} |",
            report.duplicates.stats.potential_savings
        )?;
        writeln!(
            writer,
            "| Complexity Violations | {} |",
            report
                .complexity
                .summary
                .violations_by_type
                .values()
                .sum::<usize>()
        )?;
        writeln!(
            writer,
            "| Unused Exports | {} |",
            report.unused_exports.stats.unused_count
        )?;
        writeln!(
            writer,
            "| Orphan Imports | {} |",
            report.orphans.stats.orphan_count
        )?;
        writeln!(writer)?;

        if !report.dependency_graph.stats.circular_deps.is_empty() {
            writeln!(writer, "## Circular Dependencies")?;
            writeln!(writer)?;
            for cycle in &report.dependency_graph.stats.circular_deps {
                writeln!(writer, "- {}", cycle.join(" -> "))?;
            }
            writeln!(writer)?;
        }

        if !report.duplicates.duplicates.is_empty() {
            writeln!(writer, "## Duplicate Blocks")?;
            writeln!(writer)?;
            writeln!(writer, "| Lines | Occurrences | Savings | First Location |")?;
            writeln!(writer, "|-------|-------------|---------|----------------|")?;
            for block in &report.duplicates.duplicates {
                let first = &block.occurrences[0];
                writeln!(
                    writer,
                    "| {} | {} | {} | {}:{} |",
                    block.lines,
                    block.occurrences.len(),
                    block.savings,
                    first.file,
                    first.start_line
                )?;
            }
            writeln!(writer)?;
        }

        let violating_files: Vec<_> = report
            .complexity
            .files
            .iter()
            .filter(|f| !f.violations.is_empty())
            .collect();
        if !violating_files.is_empty() {
            writeln!(writer, "## Complexity Violations")?;
            writeln!(writer)?;
            for file in violating_files {
                writeln!(writer, "### {}", file.path)?;
                writeln!(writer)?;
                for violation in &file.violations {
                    writeln!(writer, "- {}", violation.message)?;
                }
                writeln!(writer)?;
            }
        }

        if !report.unused_exports.unused_exports.is_empty() {
            writeln!(writer, "## Unused Exports")?;
            writeln!(writer)?;
            writeln!(writer, "| File | Symbol | Line | Kind |")?;
            writeln!(writer, "|------|--------|------|------|")?;
            for file in &report.unused_exports.unused_exports {
                for export in &file.exports {
                    writeln!(
                        writer,
                        "| {} | {} | {} | {} |",
                        file.file, export.name, export.line, export.kind
                    )?;
                }
            }
            writeln!(writer)?;
        }

        if !report.orphans.orphans.is_empty() {
            writeln!(writer, "## Orphan Imports")?;
            writeln!(writer)?;
            for orphan in &report.orphans.orphans {
                writeln!(
                    writer,
                    "- `{}` in {}:{}",
                    orphan.specifier, orphan.file, orphan.line
                )?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{complexity, dependencies, duplicates, unused};
    use crate::index::ProjectIndex;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_markdown_report_sections() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.ts"),
            "import { b } from './b';\nimport { gone } from './missing';\nexport const a = 1;\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.ts"),
            "import { a } from './a';\nexport const b = 1;\nexport const unused = 2;\n",
        )
        .unwrap();

        let index = ProjectIndex::build(dir.path()).unwrap();
        let report = ProjectReport {
            root: dir.path().display().to_string(),
            dependency_graph: dependencies::analyze(&index, &Default::default()),
            duplicates: duplicates::analyze(&index, &Default::default()).unwrap(),
            complexity: complexity::analyze(&index, &Default::default()).unwrap(),
            unused_exports: unused::analyze(&index, &Default::default()).unwrap(),
            orphans: dependencies::find_orphans(&index),
        };

        let mut output = Vec::new();
        MarkdownReporter.write(&report, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.contains("# Refactoring Analysis Report"));
        assert!(text.contains("## Summary"));
        assert!(text.contains("## Circular Dependencies"));
        assert!(text.contains("a.ts -> b.ts -> a.ts"));
        assert!(text.contains("## Unused Exports"));
        assert!(text.contains("| b.ts | unused |"));
        assert!(text.contains("## Orphan Imports"));
        assert!(text.contains("`./missing` in a.ts:2"));
    }
}
