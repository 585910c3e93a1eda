//! Project-wide syntactic reference table.
//!
//! Maps an identifier name to every site where an identifier-like node with
//! that text occurs, across all indexed files. This is a purely syntactic
//! oracle: it does not resolve scopes or types, which is exactly the
//! fidelity the unused-export check needs (a reference anywhere outside the
//! declaration marks a symbol as used).

use std::collections::HashMap;

use tree_sitter::TreeCursor;

use super::{FileId, ProjectIndex};

/// Node kinds that count as identifier references.
const IDENTIFIER_KINDS: [&str; 5] = [
    "identifier",
    "property_identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
    "type_identifier",
];

/// A single occurrence of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSite {
    pub file: FileId,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
}

/// All identifier occurrences in a project, keyed by name.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    sites: HashMap<String, Vec<ReferenceSite>>,
}

impl ReferenceTable {
    /// Scans every indexed file and records identifier occurrences.
    pub fn build(index: &ProjectIndex) -> Self {
        let mut table = Self::default();

        for file in index.files() {
            let mut cursor = file.tree.root_node().walk();
            collect_sites(&mut cursor, file.id, &file.text, &mut table.sites);
        }

        table
    }

    /// All recorded sites for `name`, in scan order.
    pub fn sites(&self, name: &str) -> &[ReferenceSite] {
        self.sites.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `name` is referenced anywhere other than its own
    /// declaration site: in a different file, or in the declaring file at a
    /// different position. The declaration's own name node is itself a
    /// recorded site, so an export with no other mentions reports false.
    pub fn referenced_outside_declaration(
        &self,
        name: &str,
        decl_file: FileId,
        decl_line: usize,
        decl_col: usize,
    ) -> bool {
        self.sites(name).iter().any(|site| {
            site.file != decl_file || site.line != decl_line || site.col != decl_col
        })
    }
}

fn collect_sites(
    cursor: &mut TreeCursor,
    file: FileId,
    source: &str,
    sites: &mut HashMap<String, Vec<ReferenceSite>>,
) {
    let node = cursor.node();

    if IDENTIFIER_KINDS.contains(&node.kind()) {
        if let Some(text) = source.get(node.start_byte()..node.end_byte()) {
            let pos = node.start_position();
            sites.entry(text.to_string()).or_default().push(ReferenceSite {
                file,
                line: pos.row + 1,
                col: pos.column + 1,
            });
        }
    }

    if cursor.goto_first_child() {
        loop {
            collect_sites(cursor, file, source, sites);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn indexed(files: &[(&str, &str)]) -> (TempDir, ProjectIndex) {
        let dir = TempDir::new().unwrap();
        for (path, text) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, text).unwrap();
        }
        let index = ProjectIndex::build(dir.path()).unwrap();
        (dir, index)
    }

    #[test]
    fn test_cross_file_reference_is_found() {
        let (_dir, index) = indexed(&[
            ("a.ts", "export function calc() { return 1; }\n"),
            ("b.ts", "import { calc } from './a';\ncalc();\n"),
        ]);
        let table = ReferenceTable::build(&index);

        let a = index.lookup("a.ts").unwrap();
        let decl = &index.file(a).exports[0];
        assert!(table.referenced_outside_declaration("calc", a, decl.line, decl.col));
    }

    #[test]
    fn test_declaration_does_not_count_as_its_own_reference() {
        let (_dir, index) = indexed(&[("a.ts", "export const lonely = 1;\n")]);
        let table = ReferenceTable::build(&index);

        let a = index.lookup("a.ts").unwrap();
        let decl = &index.file(a).exports[0];
        assert!(!table.sites("lonely").is_empty());
        assert!(!table.referenced_outside_declaration("lonely", a, decl.line, decl.col));
    }

    #[test]
    fn test_same_file_second_position_counts() {
        let (_dir, index) = indexed(&[(
            "a.ts",
            "export function twice() {}\nconst again = twice;\n",
        )]);
        let table = ReferenceTable::build(&index);

        let a = index.lookup("a.ts").unwrap();
        let decl = &index.file(a).exports[0];
        assert!(table.referenced_outside_declaration("twice", a, decl.line, decl.col));
    }

    #[test]
    fn test_property_identifiers_are_recorded() {
        let (_dir, index) = indexed(&[("a.ts", "const o = { run() {} };\no.run();\n")]);
        let table = ReferenceTable::build(&index);

        assert!(table.sites("run").len() >= 2);
    }

    #[test]
    fn test_unknown_name_has_no_sites() {
        let (_dir, index) = indexed(&[("a.ts", "const x = 1;\n")]);
        let table = ReferenceTable::build(&index);
        assert!(table.sites("phantom").is_empty());
    }
}
