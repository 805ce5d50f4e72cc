//! Tree-sitter parser implementation
//!
//! This is where the tree-sitter dependency lives. Everything downstream
//! works on the language-neutral `ParsedTree`.

use tree_sitter::{Parser as TSParser, Tree};

use super::parsed_tree::{ParseError, ParsedTree};
use super::syntax_node::{SyntaxKind, SyntaxNode};
use crate::shared::models::{CodemendError, Result, Span};

/// Parser trait - abstraction over the parsing implementation
pub trait Parser: Send + Sync {
    /// Parse source code into a ParsedTree
    fn parse(&self, source: &str, file_path: &str) -> Result<ParsedTree>;

    /// Check if this parser supports the given file extension
    fn supports_extension(&self, ext: &str) -> bool;

    /// Get supported language name
    fn language_name(&self) -> &'static str;
}

/// Tree-sitter based parser
pub struct TreeSitterParser {
    language: TreeSitterLanguage,
}

/// Supported tree-sitter languages
#[derive(Debug, Clone, Copy)]
pub enum TreeSitterLanguage {
    Python,
}

impl TreeSitterParser {
    /// Create a Python parser
    pub fn python() -> Self {
        Self {
            language: TreeSitterLanguage::Python,
        }
    }

    fn get_ts_language(&self) -> tree_sitter::Language {
        match self.language {
            TreeSitterLanguage::Python => tree_sitter_python::language(),
        }
    }

    /// Convert tree-sitter tree to our domain model
    fn convert_tree(&self, tree: &Tree, source: &str, file_path: &str) -> ParsedTree {
        let root_node = tree.root_node();
        let root = self.convert_node(&root_node, source);

        let mut errors = Vec::new();
        self.collect_errors(&root_node, &mut errors);

        ParsedTree::new(
            root,
            source.to_string(),
            file_path.to_string(),
            self.language_name().to_string(),
        )
        .with_errors(errors)
    }

    /// Convert a tree-sitter node to SyntaxNode
    fn convert_node(&self, node: &tree_sitter::Node, source: &str) -> SyntaxNode {
        let kind = self.map_node_kind(node.kind());
        let span = node_span(node);

        let text = if node.child_count() == 0 {
            Some(source.get(node.byte_range()).unwrap_or("").to_string())
        } else {
            None
        };

        let children: Vec<SyntaxNode> = (0..node.child_count())
            .filter_map(|i| node.child(i))
            .filter(|c| !c.is_extra()) // Skip comments, etc.
            .map(|c| self.convert_node(&c, source))
            .collect();

        SyntaxNode::new(kind, span)
            .with_raw_kind(node.kind())
            .with_children(children)
            .with_text(text.unwrap_or_default())
    }

    /// Map tree-sitter node kind to our SyntaxKind
    fn map_node_kind(&self, ts_kind: &str) -> SyntaxKind {
        match ts_kind {
            // Definitions
            "function_definition" => SyntaxKind::FunctionDef,
            "class_definition" => SyntaxKind::ClassDef,
            "lambda" => SyntaxKind::LambdaDef,

            // Declarations
            "parameter" | "default_parameter" | "typed_parameter" => SyntaxKind::ParameterDecl,
            "import_statement" | "import_from_statement" => SyntaxKind::ImportDecl,

            // Expressions
            "call" => SyntaxKind::CallExpr,
            "identifier" => SyntaxKind::NameExpr,
            "attribute" => SyntaxKind::AttributeExpr,
            "string" | "integer" | "float" | "true" | "false" | "none" => SyntaxKind::LiteralExpr,
            "binary_operator" | "comparison_operator" | "boolean_operator" => {
                SyntaxKind::BinaryExpr
            }
            "unary_operator" | "not_operator" => SyntaxKind::UnaryExpr,
            "conditional_expression" => SyntaxKind::ConditionalExpr,

            // Statements
            "assignment" => SyntaxKind::AssignmentStmt,
            "expression_statement" => SyntaxKind::ExpressionStmt,
            "return_statement" => SyntaxKind::ReturnStmt,
            "if_statement" => SyntaxKind::IfStmt,
            "for_statement" => SyntaxKind::ForStmt,
            "while_statement" => SyntaxKind::WhileStmt,
            "try_statement" => SyntaxKind::TryStmt,
            "with_statement" => SyntaxKind::WithStmt,

            // Control flow
            "break_statement" => SyntaxKind::BreakStmt,
            "continue_statement" => SyntaxKind::ContinueStmt,
            "raise_statement" => SyntaxKind::RaiseStmt,
            "elif_clause" => SyntaxKind::ElifClause,
            "except_clause" => SyntaxKind::ExceptClause,

            // Other
            "block" | "module" => SyntaxKind::Block,
            "comment" => SyntaxKind::Comment,
            "decorator" => SyntaxKind::Decorator,

            // Unknown
            other => SyntaxKind::Other(other.to_string()),
        }
    }

    /// Collect parse errors
    fn collect_errors(&self, node: &tree_sitter::Node, errors: &mut Vec<ParseError>) {
        if node.is_error() || node.is_missing() {
            errors.push(ParseError {
                message: format!("Parse error at {:?}", node.kind()),
                span: node_span(node),
            });
        }

        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.collect_errors(&child, errors);
            }
        }
    }
}

fn node_span(node: &tree_sitter::Node) -> Span {
    Span::new(
        node.start_position().row as u32 + 1,
        node.start_position().column as u32,
        node.end_position().row as u32 + 1,
        node.end_position().column as u32,
        node.start_byte() as u32,
        node.end_byte() as u32,
    )
}

impl Parser for TreeSitterParser {
    fn parse(&self, source: &str, file_path: &str) -> Result<ParsedTree> {
        let mut parser = TSParser::new();
        parser
            .set_language(&self.get_ts_language())
            .map_err(|e| CodemendError::parse(format!("Failed to set language: {}", e)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| CodemendError::parse("Failed to parse source code"))?;

        Ok(self.convert_tree(&tree, source, file_path))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        match self.language {
            TreeSitterLanguage::Python => matches!(ext, "py" | "pyi"),
        }
    }

    fn language_name(&self) -> &'static str {
        match self.language {
            TreeSitterLanguage::Python => "python",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_function() {
        let parser = TreeSitterParser::python();
        let source = "def hello():\n    pass";
        let result = parser.parse(source, "test.py");

        assert!(result.is_ok());
        let tree = result.unwrap();
        assert!(!tree.has_errors);
    }

    #[test]
    fn test_parse_records_byte_offsets() {
        let parser = TreeSitterParser::python();
        let source = "x = eval(\"2+2\")\n";
        let tree = parser.parse(source, "test.py").unwrap();

        let call = tree
            .root
            .preorder()
            .find(|n| n.kind == SyntaxKind::CallExpr)
            .expect("call node");
        assert_eq!(tree.text_for_span(&call.span), "eval(\"2+2\")");

        let callee = &call.children[0];
        assert_eq!(callee.kind, SyntaxKind::NameExpr);
        assert_eq!(tree.text_for_span(&callee.span), "eval");
    }

    #[test]
    fn test_parse_broken_source_collects_errors() {
        let parser = TreeSitterParser::python();
        let source = "def broken(:\n";
        let tree = parser.parse(source, "broken.py").unwrap();
        assert!(tree.has_errors);
        assert!(!tree.errors.is_empty());
    }

    #[test]
    fn test_supported_extensions() {
        let parser = TreeSitterParser::python();
        assert!(parser.supports_extension("py"));
        assert!(parser.supports_extension("pyi"));
        assert!(!parser.supports_extension("rs"));
    }
}
