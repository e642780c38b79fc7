//! Syntax layer: the MDX grammar, the arena CST it produces, and text
//! reversion over that tree.

pub mod cst;
pub mod parser;
pub mod revert;

pub use cst::{Cst, CstBuilder, CstNode, NodeId, Span, TokenKind};
pub use parser::{parse, MdxParser, Rule};
pub use revert::revert;
