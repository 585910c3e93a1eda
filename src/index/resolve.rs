//! Module specifier resolution.
//!
//! Resolves a relative import specifier against the importing file's
//! directory using Node-style probing: the literal path, the known source
//! extensions, then `<dir>/index.<ext>`. Package specifiers never resolve
//! to project files.

use super::{FileId, ProjectIndex};

/// Extensions probed during resolution, in priority order.
const RESOLVE_EXTENSIONS: [&str; 8] = ["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Returns true for specifiers that address project files by relative path.
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Resolve `specifier` as written in `from_path` (root-relative) to an
/// indexed file. Returns `None` for package specifiers and for relative
/// specifiers that match nothing; the caller decides whether that is a
/// dropped external edge or an orphan.
pub fn resolve(index: &ProjectIndex, from_path: &str, specifier: &str) -> Option<FileId> {
    if !is_relative(specifier) {
        return None;
    }

    let base = join_relative(parent_dir(from_path), specifier)?;

    // Literal hit first: the specifier may already carry an extension.
    if let Some(id) = index.lookup(&base) {
        return Some(id);
    }

    for ext in RESOLVE_EXTENSIONS {
        if let Some(id) = index.lookup(&format!("{base}.{ext}")) {
            return Some(id);
        }
    }

    let index_base = if base.is_empty() {
        "index".to_string()
    } else {
        format!("{base}/index")
    };
    for ext in RESOLVE_EXTENSIONS {
        if let Some(id) = index.lookup(&format!("{index_base}.{ext}")) {
            return Some(id);
        }
    }

    None
}

/// Directory part of a root-relative slash path ("" for root-level files).
fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Joins a relative specifier onto a directory, normalizing `.` and `..`
/// components. Returns `None` when the specifier escapes the project root.
fn join_relative(dir: &str, specifier: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();

    for component in specifier.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    Some(parts.join("/"))
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
    fn test_is_relative() {
        assert!(is_relative("./a"));
        assert!(is_relative("../a/b"));
        assert!(is_relative("."));
        assert!(!is_relative("react"));
        assert!(!is_relative("@scope/pkg"));
    }

    #[test]
    fn test_resolves_sibling_with_extension_probe() {
        let (_dir, index) = indexed(&[
            ("src/a.ts", "export const a = 1;"),
            ("src/b.ts", "export const b = 1;"),
        ]);
        let b = index.lookup("src/b.ts").unwrap();
        assert_eq!(resolve(&index, "src/a.ts", "./b"), Some(b));
    }

    #[test]
    fn test_resolves_literal_extension() {
        let (_dir, index) = indexed(&[
            ("a.ts", "export const a = 1;"),
            ("b.ts", "export const b = 1;"),
        ]);
        let b = index.lookup("b.ts").unwrap();
        assert_eq!(resolve(&index, "a.ts", "./b.ts"), Some(b));
    }

    #[test]
    fn test_resolves_directory_index() {
        let (_dir, index) = indexed(&[
            ("src/a.ts", "export const a = 1;"),
            ("src/util/index.ts", "export const u = 1;"),
        ]);
        let util = index.lookup("src/util/index.ts").unwrap();
        assert_eq!(resolve(&index, "src/a.ts", "./util"), Some(util));
    }

    #[test]
    fn test_resolves_parent_traversal() {
        let (_dir, index) = indexed(&[
            ("src/deep/a.ts", "export const a = 1;"),
            ("src/b.ts", "export const b = 1;"),
        ]);
        let b = index.lookup("src/b.ts").unwrap();
        assert_eq!(resolve(&index, "src/deep/a.ts", "../b"), Some(b));
    }

    #[test]
    fn test_package_specifier_never_resolves() {
        let (_dir, index) = indexed(&[("react.ts", "export const trap = 1;")]);
        assert_eq!(resolve(&index, "react.ts", "react"), None);
    }

    #[test]
    fn test_escaping_root_fails() {
        let (_dir, index) = indexed(&[("a.ts", "export const a = 1;")]);
        assert_eq!(resolve(&index, "a.ts", "../../outside"), None);
    }

    #[test]
    fn test_unresolvable_relative_is_none() {
        let (_dir, index) = indexed(&[("a.ts", "export const a = 1;")]);
        assert_eq!(resolve(&index, "a.ts", "./ghost"), None);
    }
}
