//! Project source index for JavaScript/TypeScript analysis.
//!
//! The index walks a project root, parses every eligible source file with
//! tree-sitter, and exposes the per-file facts the analyses consume: raw
//! text, line table, import statements, and exported declarations.
//!
//! Files are indexed in sorted path order so every report derived from the
//! index is order-stable across runs. Files that fail to read or parse are
//! skipped with a warning; a missing project root is a fatal error.

pub mod exports;
pub mod imports;
pub mod references;
pub mod resolve;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use tree_sitter::{Language, Parser, Tree};
use walkdir::WalkDir;

use exports::ExportedSymbol;
use imports::Import;

/// Errors that can occur while building the project index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Project root does not exist or is not a directory: {0}")]
    InvalidRoot(PathBuf),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Identifier of an indexed file; stable for the lifetime of one index.
pub type FileId = usize;

/// Language type for file analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    Jsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    /// Get tree-sitter language for this source language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => {
                tree_sitter_javascript::LANGUAGE.into()
            }
            SourceLanguage::TypeScript | SourceLanguage::Tsx => {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }
        }
    }
}

/// A single indexed source file with its parsed tree and extracted facts.
#[derive(Debug)]
pub struct SourceFile {
    /// Index-local identifier.
    pub id: FileId,
    /// Project-root-relative path with forward slashes.
    pub path: String,
    /// Full file text.
    pub text: String,
    /// Raw source lines (no trailing newlines).
    pub lines: Vec<String>,
    /// Detected language.
    pub language: SourceLanguage,
    /// Parsed tree-sitter tree.
    pub tree: Tree,
    /// Import statements in source order.
    pub imports: Vec<Import>,
    /// Exported declarations in source order.
    pub exports: Vec<ExportedSymbol>,
}

impl SourceFile {
    /// Total line count of the file.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Raw text of an inclusive 1-based line range.
    pub fn raw_range(&self, start_line: usize, end_line: usize) -> String {
        self.lines[start_line - 1..end_line].join("\n")
    }
}

/// Parser pair for the two grammars in play.
///
/// Tsx/Jsx files reuse the TypeScript/JavaScript parsers respectively.
struct SourceParsers {
    js_parser: Parser,
    ts_parser: Parser,
}

impl SourceParsers {
    fn new() -> IndexResult<Self> {
        let mut js_parser = Parser::new();
        js_parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|_| IndexError::LanguageInit)?;

        let mut ts_parser = Parser::new();
        ts_parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|_| IndexError::LanguageInit)?;

        Ok(Self {
            js_parser,
            ts_parser,
        })
    }

    fn parse(&mut self, source: &str, language: SourceLanguage) -> Option<Tree> {
        let parser = match language {
            SourceLanguage::JavaScript | SourceLanguage::Jsx => &mut self.js_parser,
            SourceLanguage::TypeScript | SourceLanguage::Tsx => &mut self.ts_parser,
        };
        parser.parse(source, None)
    }
}

/// Immutable snapshot of a project's source files.
///
/// Built once per analysis run; analyses are pure functions over it.
#[derive(Debug)]
pub struct ProjectIndex {
    root: PathBuf,
    files: Vec<SourceFile>,
    by_path: HashMap<String, FileId>,
}

impl ProjectIndex {
    /// Walks `root` and indexes every eligible source file.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    /// Returns an error only when `root` is missing or not a directory.
    pub fn build(root: &Path) -> IndexResult<Self> {
        if !root.is_dir() {
            return Err(IndexError::InvalidRoot(root.to_path_buf()));
        }

        let mut parsers = SourceParsers::new()?;

        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
                SourceLanguage::from_extension(ext).is_some()
            })
            .collect();
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        let mut by_path = HashMap::with_capacity(paths.len());

        for path in paths {
            let rel = relative_path(root, &path);
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            let language = match SourceLanguage::from_extension(ext) {
                Some(lang) => lang,
                None => continue,
            };

            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!("skipping unreadable file {}: {}", rel, err);
                    continue;
                }
            };

            let tree = match parsers.parse(&text, language) {
                Some(tree) => tree,
                None => {
                    warn!("skipping unparseable file {}", rel);
                    continue;
                }
            };

            let id = files.len();
            let lines: Vec<String> = text.lines().map(str::to_string).collect();
            let imports = imports::extract_imports(&tree, &text);
            let exports = exports::extract_exports(&tree, &text);

            by_path.insert(rel.clone(), id);
            files.push(SourceFile {
                id,
                path: rel,
                text,
                lines,
                language,
                tree,
                imports,
                exports,
            });
        }

        debug!("indexed {} files under {}", files.len(), root.display());

        Ok(Self {
            root: root.to_path_buf(),
            files,
            by_path,
        })
    }

    /// The project root this index was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All indexed files in sorted path order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Looks up a file by its index-local id.
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id]
    }

    /// Looks up a file id by root-relative path.
    pub fn lookup(&self, rel_path: &str) -> Option<FileId> {
        self.by_path.get(rel_path).copied()
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files were indexed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Converts an absolute walked path into a root-relative slash path.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<&str> = rel
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    parts.join("/")
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    matches!(
        name.as_ref(),
        "node_modules" | ".git" | "dist" | "build" | ".next" | "coverage" | ".turbo"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> (TempDir, ProjectIndex) {
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
    fn test_missing_root_is_fatal() {
        let err = ProjectIndex::build(Path::new("/definitely/not/a/real/dir")).unwrap_err();
        assert!(matches!(err, IndexError::InvalidRoot(_)));
    }

    #[test]
    fn test_indexes_supported_extensions_only() {
        let (_dir, index) = project(&[
            ("a.ts", "export const a = 1;"),
            ("b.js", "module.exports = {};"),
            ("notes.md", "# not code"),
            ("style.css", ".x {}"),
        ]);

        assert_eq!(index.len(), 2);
        assert!(index.lookup("a.ts").is_some());
        assert!(index.lookup("b.js").is_some());
        assert!(index.lookup("notes.md").is_none());
    }

    #[test]
    fn test_sorted_path_order() {
        let (_dir, index) = project(&[
            ("src/z.ts", "export const z = 1;"),
            ("src/a.ts", "export const a = 1;"),
            ("index.ts", "export const i = 1;"),
        ]);

        let paths: Vec<&str> = index.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["index.ts", "src/a.ts", "src/z.ts"]);
    }

    #[test]
    fn test_ignored_directories_are_skipped() {
        let (_dir, index) = project(&[
            ("src/a.ts", "export const a = 1;"),
            ("node_modules/pkg/index.js", "module.exports = 1;"),
            ("dist/a.js", "var a = 1;"),
        ]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.files()[0].path, "src/a.ts");
    }

    #[test]
    fn test_file_facts_are_extracted() {
        let (_dir, index) = project(&[(
            "a.ts",
            "import { b } from './b';\nexport function go() { return b; }\n",
        )]);

        let file = &index.files()[0];
        assert_eq!(file.imports.len(), 1);
        assert_eq!(file.imports[0].source, "./b");
        assert_eq!(file.exports.len(), 1);
        assert_eq!(file.exports[0].name, "go");
        assert_eq!(file.line_count(), 2);
    }

    #[test]
    fn test_raw_range() {
        let (_dir, index) = project(&[("a.ts", "one\ntwo\nthree\n")]);
        let file = &index.files()[0];
        assert_eq!(file.raw_range(2, 3), "two\nthree");
    }
}
