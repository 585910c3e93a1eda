//! Import statement extraction for JavaScript/TypeScript.
//!
//! Walks a parsed tree and collects ES6 `import` statements, CommonJS
//! `require()` calls, and dynamic `import()` expressions.

use tree_sitter::{Node, Tree, TreeCursor};

/// The kind of import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// ES6 import statement: `import ... from 'module'`
    ES6,
    /// CommonJS require: `const x = require('module')`
    CommonJS,
    /// Dynamic import: `import('module')`
    DynamicImport,
}

/// An individual import specifier within an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSpecifier {
    /// Default import: `import foo from 'module'`
    Default(String),
    /// Named import: `import { foo } from 'module'` or `import { foo as bar } from 'module'`
    Named { imported: String, local: String },
    /// Namespace import: `import * as foo from 'module'`
    Namespace(String),
    /// Side-effect import: `import 'module'` (no specifiers)
    SideEffect,
    /// Entire module (CommonJS style): `const mod = require('module')`
    Entire(String),
}

impl ImportSpecifier {
    /// Returns the exported name that is being imported (the original name
    /// in the source module). Namespace and whole-module imports pull in
    /// everything and carry no single name.
    pub fn imported_name(&self) -> Option<&str> {
        match self {
            ImportSpecifier::Default(_) => Some("default"),
            ImportSpecifier::Named { imported, .. } => Some(imported),
            ImportSpecifier::Namespace(_) => None,
            ImportSpecifier::SideEffect => None,
            ImportSpecifier::Entire(_) => None,
        }
    }

    /// Returns the local name (the name used in the importing file).
    pub fn local_name(&self) -> Option<&str> {
        match self {
            ImportSpecifier::Default(name) => Some(name),
            ImportSpecifier::Named { local, .. } => Some(local),
            ImportSpecifier::Namespace(name) => Some(name),
            ImportSpecifier::SideEffect => None,
            ImportSpecifier::Entire(name) => Some(name),
        }
    }
}

/// Represents a single import statement in a source file.
#[derive(Debug, Clone)]
pub struct Import {
    /// The module specifier (e.g., "react", "./utils", "@scope/package")
    pub source: String,
    /// The specifiers being imported
    pub specifiers: Vec<ImportSpecifier>,
    /// The kind of import
    pub kind: ImportKind,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

impl Import {
    /// Returns true if this import targets an npm package rather than a
    /// relative/absolute path.
    pub fn is_package_import(&self) -> bool {
        !self.source.starts_with('.') && !self.source.starts_with('/')
    }

    /// Names this statement pulls out of the target module, as they appear
    /// on a dependency edge. Namespace/whole-module imports contribute `*`;
    /// side-effect imports contribute nothing.
    pub fn edge_names(&self) -> Vec<String> {
        self.specifiers
            .iter()
            .filter_map(|spec| match spec {
                ImportSpecifier::Default(_) => Some("default".to_string()),
                ImportSpecifier::Named { imported, .. } => Some(imported.clone()),
                ImportSpecifier::Namespace(_) | ImportSpecifier::Entire(_) => {
                    Some("*".to_string())
                }
                ImportSpecifier::SideEffect => None,
            })
            .collect()
    }

    /// Returns true if this is a side-effect only import.
    pub fn is_side_effect_only(&self) -> bool {
        self.specifiers.len() == 1 && matches!(self.specifiers[0], ImportSpecifier::SideEffect)
    }
}

/// Extract all imports from a parsed tree.
pub fn extract_imports(tree: &Tree, source: &str) -> Vec<Import> {
    let mut imports = Vec::new();
    let mut cursor = tree.root_node().walk();
    visit_node(&mut cursor, source, &mut imports);
    imports
}

/// Recursively visit nodes to find imports.
fn visit_node(cursor: &mut TreeCursor, source: &str, imports: &mut Vec<Import>) {
    let node = cursor.node();

    match node.kind() {
        "import_statement" => {
            if let Some(import) = parse_es6_import(&node, source) {
                imports.push(import);
            }
        }
        "call_expression" => {
            // Check for require() or dynamic import()
            if let Some(import) = parse_require_or_dynamic_import(&node, source) {
                imports.push(import);
            }
        }
        _ => {}
    }

    if cursor.goto_first_child() {
        loop {
            visit_node(cursor, source, imports);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

/// Parse an ES6 import statement.
fn parse_es6_import(node: &Node, source: &str) -> Option<Import> {
    let mut source_module = String::new();
    let mut specifiers = Vec::new();
    let line = node.start_position().row + 1;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "string" => {
                source_module = extract_string_value(&child, source)?;
            }
            "import_clause" => {
                parse_import_clause(&child, source, &mut specifiers);
            }
            _ => {}
        }
    }

    // Side-effect import if no specifiers
    if specifiers.is_empty() && !source_module.is_empty() {
        specifiers.push(ImportSpecifier::SideEffect);
    }

    if source_module.is_empty() {
        return None;
    }

    Some(Import {
        source: source_module,
        specifiers,
        kind: ImportKind::ES6,
        line,
    })
}

/// Parse the import clause (everything between 'import' and 'from').
fn parse_import_clause(node: &Node, source: &str, specifiers: &mut Vec<ImportSpecifier>) {
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                // Default import: import foo from 'module'
                if let Some(name) = node_text(&child, source) {
                    specifiers.push(ImportSpecifier::Default(name.to_string()));
                }
            }
            "namespace_import" => {
                // Namespace import: import * as foo from 'module'
                if let Some(name) = find_namespace_name(&child, source) {
                    specifiers.push(ImportSpecifier::Namespace(name));
                }
            }
            "named_imports" => {
                // Named imports: import { foo, bar as baz } from 'module'
                parse_named_imports(&child, source, specifiers);
            }
            _ => {}
        }
    }
}

/// Find the local name in a namespace import (import * as NAME).
fn find_namespace_name(node: &Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "identifier" {
            return node_text(&child, source).map(|s| s.to_string());
        }
    }
    None
}

/// Parse named imports: { foo, bar as baz, default as qux }
fn parse_named_imports(node: &Node, source: &str, specifiers: &mut Vec<ImportSpecifier>) {
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        if child.kind() == "import_specifier" {
            if let Some(spec) = parse_import_specifier(&child, source) {
                specifiers.push(spec);
            }
        }
    }
}

/// Parse a single import specifier: foo or foo as bar
fn parse_import_specifier(node: &Node, source: &str) -> Option<ImportSpecifier> {
    let mut cursor = node.walk();
    let mut imported = None;
    let mut local = None;

    for child in node.children(&mut cursor) {
        if child.kind() == "identifier" {
            let name = node_text(&child, source)?;
            if imported.is_none() {
                imported = Some(name.to_string());
            } else {
                local = Some(name.to_string());
            }
        }
    }

    let imported = imported?;
    let local = local.unwrap_or_else(|| imported.clone());

    Some(ImportSpecifier::Named { imported, local })
}

/// Parse require() calls or dynamic import().
fn parse_require_or_dynamic_import(node: &Node, source: &str) -> Option<Import> {
    let line = node.start_position().row + 1;

    let func_node = node.child_by_field_name("function")?;
    let func_name = node_text(&func_node, source)?;

    let (kind, is_require) = match func_name {
        "require" => (ImportKind::CommonJS, true),
        "import" => (ImportKind::DynamicImport, false),
        _ => return None,
    };

    let args_node = node.child_by_field_name("arguments")?;
    let mut args_cursor = args_node.walk();

    for child in args_node.children(&mut args_cursor) {
        if child.kind() == "string" {
            let source_module = extract_string_value(&child, source)?;

            // For CommonJS require, try to find the variable name
            let specifiers = if is_require {
                find_require_variable_name(node, source)
                    .map(|name| vec![ImportSpecifier::Entire(name)])
                    .unwrap_or_else(|| vec![ImportSpecifier::SideEffect])
            } else {
                vec![ImportSpecifier::SideEffect]
            };

            return Some(Import {
                source: source_module,
                specifiers,
                kind,
                line,
            });
        }
    }

    None
}

/// Find the variable name in `const x = require('...')`.
fn find_require_variable_name(call_node: &Node, source: &str) -> Option<String> {
    let parent = call_node.parent()?;

    match parent.kind() {
        "variable_declarator" => {
            let name_node = parent.child_by_field_name("name")?;
            match name_node.kind() {
                "identifier" => node_text(&name_node, source).map(|s| s.to_string()),
                // Destructuring require is treated as whole-module usage
                _ => None,
            }
        }
        _ => None,
    }
}

/// Extract the text content of a node.
pub(crate) fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}

/// Extract string value (removes quotes).
fn extract_string_value(node: &Node, source: &str) -> Option<String> {
    let text = node_text(node, source)?;
    let trimmed = text
        .trim_start_matches(['"', '\'', '`'])
        .trim_end_matches(['"', '\'', '`']);
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SourceLanguage;
    use tree_sitter::Parser;

    fn parse(source: &str, language: SourceLanguage) -> Vec<Import> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        extract_imports(&tree, source)
    }

    fn parse_js(source: &str) -> Vec<Import> {
        parse(source, SourceLanguage::JavaScript)
    }

    fn parse_ts(source: &str) -> Vec<Import> {
        parse(source, SourceLanguage::TypeScript)
    }

    // ===== ES6 Import Tests =====

    #[test]
    fn test_default_import() {
        let imports = parse_js(r#"import React from 'react';"#);

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].source, "react");
        assert_eq!(imports[0].kind, ImportKind::ES6);
        assert!(matches!(
            &imports[0].specifiers[0],
            ImportSpecifier::Default(name) if name == "React"
        ));
    }

    #[test]
    fn test_named_imports() {
        let imports = parse_js(r#"import { useState, useEffect } from 'react';"#);

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].specifiers.len(), 2);

        let names: Vec<_> = imports[0]
            .specifiers
            .iter()
            .filter_map(|s| s.imported_name())
            .collect();
        assert!(names.contains(&"useState"));
        assert!(names.contains(&"useEffect"));
    }

    #[test]
    fn test_named_import_with_alias() {
        let imports = parse_js(r#"import { useState as state } from 'react';"#);

        assert!(matches!(
            &imports[0].specifiers[0],
            ImportSpecifier::Named { imported, local }
                if imported == "useState" && local == "state"
        ));
    }

    #[test]
    fn test_namespace_import() {
        let imports = parse_js(r#"import * as helpers from './helpers';"#);

        assert_eq!(imports[0].source, "./helpers");
        assert!(matches!(
            &imports[0].specifiers[0],
            ImportSpecifier::Namespace(name) if name == "helpers"
        ));
        assert_eq!(imports[0].edge_names(), vec!["*"]);
    }

    #[test]
    fn test_side_effect_import() {
        let imports = parse_js(r#"import './styles.css';"#);

        assert_eq!(imports[0].source, "./styles.css");
        assert!(imports[0].is_side_effect_only());
        assert!(imports[0].edge_names().is_empty());
    }

    #[test]
    fn test_import_line_numbers() {
        let imports = parse_js("const x = 1;\nimport a from './a';\n");
        assert_eq!(imports[0].line, 2);
    }

    // ===== CommonJS Tests =====

    #[test]
    fn test_require_simple() {
        let imports = parse_js(r#"const utils = require('./utils');"#);

        assert_eq!(imports[0].source, "./utils");
        assert_eq!(imports[0].kind, ImportKind::CommonJS);
        assert!(matches!(
            &imports[0].specifiers[0],
            ImportSpecifier::Entire(name) if name == "utils"
        ));
    }

    #[test]
    fn test_require_without_assignment() {
        let imports = parse_js(r#"require('./polyfills');"#);

        assert_eq!(imports[0].kind, ImportKind::CommonJS);
        assert!(imports[0].is_side_effect_only());
    }

    // ===== Dynamic Import Tests =====

    #[test]
    fn test_dynamic_import() {
        let imports = parse_js(r#"const mod = await import('./lazy');"#);

        assert_eq!(imports[0].source, "./lazy");
        assert_eq!(imports[0].kind, ImportKind::DynamicImport);
    }

    // ===== Specifier classification =====

    #[test]
    fn test_package_vs_relative() {
        let imports = parse_js("import a from 'react';\nimport b from './local';\n");
        assert!(imports[0].is_package_import());
        assert!(!imports[1].is_package_import());
    }

    #[test]
    fn test_typescript_type_import() {
        let imports = parse_ts(r#"import type { FC } from 'react';"#);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].source, "react");
    }

    #[test]
    fn test_edge_names_mixed() {
        let imports = parse_js(r#"import React, { useState } from 'react';"#);
        let names = imports[0].edge_names();
        assert!(names.contains(&"default".to_string()));
        assert!(names.contains(&"useState".to_string()));
    }
}
