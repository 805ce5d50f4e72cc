//! Parsing: language-neutral syntax trees over tree-sitter

pub mod parsed_tree;
pub mod parser;
pub mod syntax_node;

pub use parsed_tree::{ParseError, ParsedTree};
pub use parser::{Parser, TreeSitterParser};
pub use syntax_node::{Preorder, SyntaxKind, SyntaxNode};
