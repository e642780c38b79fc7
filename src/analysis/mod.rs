//! Primary analysis: CST → [`crate::ast::QueryStatement`].
//!
//! The extractor locates the axes, the filter context and the cube source;
//! the set-expression analyzer turns each top-level `set` subtree into a
//! [`crate::ast::SetExpression`]. Both are read-only traversals of the CST.

pub mod extractor;
pub mod set_expression;

pub use extractor::{
    analyze_statement, extract_column_axis, extract_cube_source, extract_row_axis, extract_where,
};
pub use set_expression::{analyze_member, analyze_set, SetView};

use crate::diagnostics::{to_error_source, ErrorReporting, SourceArc};
use crate::syntax::{Cst, NodeId};

impl ErrorReporting for Cst {
    fn error_source(&self) -> SourceArc {
        to_error_source(self.name(), self.source())
    }
}

/// Text of an `IDENTIFIER` leaf with `]]` escapes resolved.
pub(crate) fn identifier_text(cst: &Cst, leaf: NodeId) -> String {
    cst.token_text(leaf).replace("]]", "]")
}
