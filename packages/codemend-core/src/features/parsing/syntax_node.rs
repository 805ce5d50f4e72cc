//! Language-neutral syntax node representation
//!
//! Abstracts tree-sitter nodes for use in graph building and detection.

use crate::shared::models::Span;

/// Syntax node kind (language-neutral)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxKind {
    // Definitions
    FunctionDef,
    ClassDef,
    LambdaDef,

    // Declarations
    ParameterDecl,
    ImportDecl,

    // Expressions
    CallExpr,
    NameExpr,
    AttributeExpr,
    LiteralExpr,
    BinaryExpr,
    UnaryExpr,
    ConditionalExpr,

    // Statements
    AssignmentStmt,
    ExpressionStmt,
    ReturnStmt,
    IfStmt,
    ForStmt,
    WhileStmt,
    TryStmt,
    WithStmt,

    // Control flow
    BreakStmt,
    ContinueStmt,
    RaiseStmt,
    ElifClause,
    ExceptClause,

    // Other
    Block,
    Comment,
    Decorator,

    // Unknown/Other
    Other(String),
}

impl SyntaxKind {
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDef | SyntaxKind::ClassDef | SyntaxKind::LambdaDef
        )
    }

    /// Does this node start its own function scope?
    pub fn is_function_like(&self) -> bool {
        matches!(self, SyntaxKind::FunctionDef | SyntaxKind::LambdaDef)
    }

    /// Is this a statement for size-measurement purposes?
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            SyntaxKind::ExpressionStmt
                | SyntaxKind::ReturnStmt
                | SyntaxKind::IfStmt
                | SyntaxKind::ForStmt
                | SyntaxKind::WhileStmt
                | SyntaxKind::TryStmt
                | SyntaxKind::WithStmt
                | SyntaxKind::BreakStmt
                | SyntaxKind::ContinueStmt
                | SyntaxKind::RaiseStmt
                | SyntaxKind::ImportDecl
                | SyntaxKind::FunctionDef
                | SyntaxKind::ClassDef
        )
    }

    /// Does this node open an extra branch for cyclomatic counting?
    pub fn is_branch_point(&self) -> bool {
        matches!(
            self,
            SyntaxKind::IfStmt
                | SyntaxKind::ElifClause
                | SyntaxKind::ForStmt
                | SyntaxKind::WhileStmt
                | SyntaxKind::ExceptClause
                | SyntaxKind::ConditionalExpr
        )
    }
}

/// Language-neutral syntax node
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub text: Option<String>,
    pub children: Vec<SyntaxNode>,

    /// Original tree-sitter kind (for debugging and precise matching)
    pub raw_kind: Option<String>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: Span) -> Self {
        Self {
            kind,
            span,
            text: None,
            children: Vec::new(),
            raw_kind: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_raw_kind(mut self, raw_kind: impl Into<String>) -> Self {
        self.raw_kind = Some(raw_kind.into());
        self
    }

    /// Find first child of given kind
    pub fn find_child(&self, kind: &SyntaxKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| &c.kind == kind)
    }

    /// Find all children of given kind
    pub fn find_children(&self, kind: &SyntaxKind) -> Vec<&SyntaxNode> {
        self.children.iter().filter(|c| &c.kind == kind).collect()
    }

    /// Find all direct children with the given raw tree-sitter kind
    pub fn children_with_raw_kind(&self, raw: &str) -> Vec<&SyntaxNode> {
        self.children
            .iter()
            .filter(|c| c.raw_kind.as_deref() == Some(raw))
            .collect()
    }

    /// Get text content (leaves only; interior nodes return "")
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Concatenated text of all leaves under this node
    pub fn flat_text(&self) -> String {
        let mut out = String::new();
        for node in self.preorder() {
            if node.children.is_empty() {
                out.push_str(node.text());
            }
        }
        out
    }

    /// Depth-first preorder traversal over this node and all descendants
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// Preorder iterator over a syntax tree
pub struct Preorder<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse so the leftmost child is visited first
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
