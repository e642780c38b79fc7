//! # mdxalchemy
//!
//! Analysis of MDX cube-select statements.
//!
//! One parse feeds two independent passes:
//!
//! - [`analysis`] turns the CST into a compact [`QueryStatement`] (axes,
//!   filter context, cube) that serialises to the JSON contract in [`export`];
//! - [`algebra`] builds a type-checked hierarchy-set [`StatementBuilder`] that
//!   can re-emit the query as MDX.
//!
//! ```no_run
//! use mdxalchemy::GrammarEngine;
//!
//! let engine = GrammarEngine::default();
//! let statement = engine.analyze("SELECT {[A].[A].Members} ON COLUMNS FROM [Cube]")?;
//! assert_eq!(statement.cube, "Cube");
//! # Ok::<(), mdxalchemy::MdxError>(())
//! ```

pub mod algebra;
pub mod analysis;
pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod export;
pub mod syntax;

pub use algebra::StatementBuilder;
pub use ast::{
    Axis, AxisStatement, Function, Literal, LiteralValue, Member, QueryStatement, SetExpression,
    WhereStatement,
};
pub use config::{AnalyzerConfig, SchemaLevel};
pub use diagnostics::{ErrorType, MdxError};
pub use engine::GrammarEngine;
pub use syntax::{revert, Cst, NodeId};

/// Analyze `text` with the default configuration.
pub fn analyze(text: &str) -> Result<QueryStatement, MdxError> {
    GrammarEngine::default().analyze(text)
}

/// Transform `text` with the default configuration.
pub fn transform(text: &str) -> Result<StatementBuilder, MdxError> {
    GrammarEngine::default().transform(text)
}
