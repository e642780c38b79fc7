//! AST produced by the axis/where extractor and the set-expression analyzer.
//!
//! Values are immutable once built. Nodes that came from the CST keep a
//! [`crate::syntax::NodeId`] back-reference for reversion; it is excluded from
//! equality and from the serialised form.

pub mod set_expression;
pub mod statement;

pub use set_expression::{Function, Literal, LiteralValue, Member, SetExpression};
pub use statement::{Axis, AxisStatement, QueryStatement, WhereStatement};
