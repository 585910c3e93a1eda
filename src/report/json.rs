//! JSON report implementation.
//!
//! The analysis report types already serialize with the wire field names,
//! so this writer is a thin serde_json pass.

use std::io::{self, Write};

use super::{ProjectReport, Reporter};

/// JSON reporter implementation.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn write<W: Write>(&self, report: &ProjectReport, writer: &mut W) -> io::Result<()> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{complexity, dependencies, duplicates, unused};
    use crate::index::ProjectIndex;
    use std::fs;
    use tempfile::TempDir;

    fn sample_report() -> (TempDir, ProjectReport) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.ts"),
            "import { b } from './b';\nexport const a = 1;\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.ts"),
            "import { a } from './a';\nexport const b = 1;\n",
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
        (dir, report)
    }

    #[test]
    fn test_json_report_shape() {
        let (_dir, report) = sample_report();
        let mut output = Vec::new();
        JsonReporter.write(&report, &mut output).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["dependencyGraph"]["stats"]["totalFiles"], 2);
        assert!(parsed["dependencyGraph"]["stats"]["circularDeps"]
            .as_array()
            .unwrap()
            .len()
            >= 1);
        assert!(parsed["duplicates"]["stats"]["totalDuplicateBlocks"].is_number());
        assert!(parsed["complexity"]["summary"]["totalFiles"].is_number());
        assert!(parsed["unusedExports"]["stats"]["totalExports"].is_number());
        assert!(parsed["orphans"]["stats"]["orphanCount"].is_number());
    }

    #[test]
    fn test_json_report_is_byte_stable() {
        let (_dir, report) = sample_report();
        let mut first = Vec::new();
        let mut second = Vec::new();
        JsonReporter.write(&report, &mut first).unwrap();
        JsonReporter.write(&report, &mut second).unwrap();
        assert_eq!(first, second);
    }
}
