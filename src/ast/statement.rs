//! Statement-level AST: axes, filter context and cube source.

use serde::{Deserialize, Serialize};

use super::set_expression::{Member, SetExpression};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Rows,
    Columns,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Rows => "rows",
            Axis::Columns => "columns",
        }
    }
}

/// What one reporting axis selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisStatement {
    pub axis: Axis,
    /// Whether empty rows/columns are suppressed (`NON EMPTY`).
    pub non_empty: bool,
    /// Top-level set expressions, in document order.
    pub set_expressions: Vec<SetExpression>,
}

impl AxisStatement {
    /// The statement for an axis the query does not mention.
    pub fn empty(axis: Axis) -> Self {
        Self {
            axis,
            non_empty: false,
            set_expressions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set_expressions.is_empty()
    }
}

/// Filter context (`WHERE` slicer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WhereStatement {
    pub members: Vec<Member>,
}

/// Compact AST of a cube-select statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStatement {
    pub cube: String,
    pub rows: AxisStatement,
    pub columns: AxisStatement,
    #[serde(rename = "where")]
    pub where_clause: WhereStatement,
}
