//! Exported declaration extraction for JavaScript/TypeScript.
//!
//! Walks a parsed tree and collects every `export` statement: declarations,
//! named clauses, defaults, and re-exports, with 1-based source positions.

use tree_sitter::{Node, Tree, TreeCursor};

use super::imports::node_text;

/// The declaration kind behind an exported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Function,
    Class,
    Variable,
    Interface,
    TypeAlias,
    Enum,
    /// `export default ...`
    Default,
    /// `export { x } from './y'` or `export * from './y'`
    ReExport,
    /// `export { x }` referring to a local declaration
    Named,
}

impl ExportKind {
    /// Short label used in JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Function => "function",
            ExportKind::Class => "class",
            ExportKind::Variable => "variable",
            ExportKind::Interface => "interface",
            ExportKind::TypeAlias => "type",
            ExportKind::Enum => "enum",
            ExportKind::Default => "default",
            ExportKind::ReExport => "re-export",
            ExportKind::Named => "named",
        }
    }

    /// Kinds the syntactic reference oracle cannot answer for; callers fall
    /// back to the conservative treated-as-used branch.
    pub fn outside_reference_oracle(&self) -> bool {
        matches!(self, ExportKind::Default | ExportKind::ReExport)
    }
}

/// A single exported declaration.
#[derive(Debug, Clone)]
pub struct ExportedSymbol {
    /// The exported surface name (`*` for `export * from`).
    pub name: String,
    /// 1-based declaration line.
    pub line: usize,
    /// 1-based declaration column.
    pub col: usize,
    /// Declaration kind.
    pub kind: ExportKind,
}

/// Extract all exported declarations from a parsed tree.
pub fn extract_exports(tree: &Tree, source: &str) -> Vec<ExportedSymbol> {
    let mut exports = Vec::new();
    let mut cursor = tree.root_node().walk();
    visit_node(&mut cursor, source, &mut exports);
    exports
}

fn visit_node(cursor: &mut TreeCursor, source: &str, exports: &mut Vec<ExportedSymbol>) {
    let node = cursor.node();

    if node.kind() == "export_statement" {
        parse_export_statement(&node, source, exports);
    }

    if cursor.goto_first_child() {
        loop {
            visit_node(cursor, source, exports);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

fn parse_export_statement(node: &Node, source: &str, exports: &mut Vec<ExportedSymbol>) {
    let has_default = has_keyword_child(node, "default");
    let has_source = node.child_by_field_name("source").is_some();

    if let Some(declaration) = node.child_by_field_name("declaration") {
        parse_declaration(&declaration, source, has_default, exports);
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "export_clause" => {
                parse_export_clause(&child, source, has_source, exports);
            }
            "namespace_export" => {
                // export * as ns from './x'
                if let Some(name_node) = first_identifier(&child) {
                    exports.push(symbol_at(&name_node, source, ExportKind::ReExport));
                }
            }
            "*" => {
                // export * from './x' has no named surface
                exports.push(ExportedSymbol {
                    name: "*".to_string(),
                    line: node.start_position().row + 1,
                    col: node.start_position().column + 1,
                    kind: ExportKind::ReExport,
                });
            }
            _ => {}
        }
    }

    // export default <expression>; no declaration child to name it
    if has_default && node.child_by_field_name("declaration").is_none() {
        let already_named = exports
            .iter()
            .any(|e| e.line == node.start_position().row + 1 && e.kind == ExportKind::Default);
        if !already_named {
            exports.push(ExportedSymbol {
                name: "default".to_string(),
                line: node.start_position().row + 1,
                col: node.start_position().column + 1,
                kind: ExportKind::Default,
            });
        }
    }
}

/// Handle `export <declaration>` and `export default <declaration>`.
fn parse_declaration(
    declaration: &Node,
    source: &str,
    has_default: bool,
    exports: &mut Vec<ExportedSymbol>,
) {
    let kind = match declaration.kind() {
        "function_declaration" | "generator_function_declaration" => ExportKind::Function,
        "class_declaration" | "abstract_class_declaration" => ExportKind::Class,
        "lexical_declaration" | "variable_declaration" => ExportKind::Variable,
        "interface_declaration" => ExportKind::Interface,
        "type_alias_declaration" => ExportKind::TypeAlias,
        "enum_declaration" => ExportKind::Enum,
        _ => ExportKind::Named,
    };
    let kind = if has_default { ExportKind::Default } else { kind };

    if matches!(
        declaration.kind(),
        "lexical_declaration" | "variable_declaration"
    ) {
        let mut cursor = declaration.walk();
        for declarator in declaration.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            if let Some(name_node) = declarator.child_by_field_name("name") {
                collect_binding_identifiers(&name_node, source, kind, exports);
            }
        }
        return;
    }

    if let Some(name_node) = declaration.child_by_field_name("name") {
        exports.push(symbol_at(&name_node, source, kind));
    } else if has_default {
        // export default function () {} is anonymous
        exports.push(ExportedSymbol {
            name: "default".to_string(),
            line: declaration.start_position().row + 1,
            col: declaration.start_position().column + 1,
            kind: ExportKind::Default,
        });
    }
}

/// Handle `export { a, b as c }` with or without a source module.
fn parse_export_clause(
    clause: &Node,
    source: &str,
    has_source: bool,
    exports: &mut Vec<ExportedSymbol>,
) {
    let kind = if has_source {
        ExportKind::ReExport
    } else {
        ExportKind::Named
    };

    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        if child.kind() != "export_specifier" {
            continue;
        }
        // The surface name is the alias when present, else the local name.
        let surface = child
            .child_by_field_name("alias")
            .or_else(|| child.child_by_field_name("name"));
        if let Some(name_node) = surface {
            exports.push(symbol_at(&name_node, source, kind));
        }
    }
}

/// Collect binding identifiers out of a declarator name, descending into
/// destructuring patterns. Default-value expressions are not bindings and
/// are skipped.
fn collect_binding_identifiers(
    node: &Node,
    source: &str,
    kind: ExportKind,
    exports: &mut Vec<ExportedSymbol>,
) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            exports.push(symbol_at(node, source, kind));
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_binding_identifiers(&left, source, kind, exports);
            }
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_binding_identifiers(&value, source, kind, exports);
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_binding_identifiers(&child, source, kind, exports);
            }
        }
    }
}

fn symbol_at(name_node: &Node, source: &str, kind: ExportKind) -> ExportedSymbol {
    ExportedSymbol {
        name: node_text(name_node, source).unwrap_or_default().to_string(),
        line: name_node.start_position().row + 1,
        col: name_node.start_position().column + 1,
        kind,
    }
}

fn has_keyword_child(node: &Node, keyword: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == keyword);
    found
}

fn first_identifier<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == "identifier");
    found
}
