//! Axis/Where Extractor
//!
//! Pure functions over the `query_statement` node. Each returns a `Result`;
//! an absent clause is a value (empty axis, empty filter), never an error.

use tracing::debug;

use super::analyze_member;
use super::identifier_text;
use super::set_expression::analyze_set;
use crate::ast::{Axis, AxisStatement, QueryStatement, WhereStatement};
use crate::config::AnalyzerConfig;
use crate::diagnostics::{ErrorReporting, MdxError};
use crate::syntax::{Cst, NodeId, Rule, TokenKind};

/// Analyze the whole statement under the CST root.
pub fn analyze_statement(cst: &Cst, config: &AnalyzerConfig) -> Result<QueryStatement, MdxError> {
    let root = cst.root();
    let statement = cst
        .structural_children(root)
        .next()
        .filter(|id| cst.rule(*id) == Some(Rule::query_statement))
        .ok_or_else(|| cst.structural_invariant("root has no query statement", cst.span(root)))?;

    let query = QueryStatement {
        cube: extract_cube_source(cst, statement)?,
        rows: extract_row_axis(cst, statement, config)?,
        columns: extract_column_axis(cst, statement, config)?,
        where_clause: extract_where(cst, statement)?,
    };

    debug!(
        cube = %query.cube,
        rows = query.rows.set_expressions.len(),
        columns = query.columns.set_expressions.len(),
        filters = query.where_clause.members.len(),
        "analyzed statement"
    );
    Ok(query)
}

pub fn extract_row_axis(
    cst: &Cst,
    statement: NodeId,
    config: &AnalyzerConfig,
) -> Result<AxisStatement, MdxError> {
    extract_axis(cst, statement, Axis::Rows, config)
}

pub fn extract_column_axis(
    cst: &Cst,
    statement: NodeId,
    config: &AnalyzerConfig,
) -> Result<AxisStatement, MdxError> {
    extract_axis(cst, statement, Axis::Columns, config)
}

/// Members of the filter context, document order.
pub fn extract_where(cst: &Cst, statement: NodeId) -> Result<WhereStatement, MdxError> {
    let filters: Vec<NodeId> = cst
        .find_all(statement, Rule::where_statement)
        .into_iter()
        .filter(|id| cst.find_first(*id, Rule::member).is_some())
        .collect();

    let filter = match filters.as_slice() {
        [] => return Ok(WhereStatement::default()),
        [filter] => *filter,
        [_, second, ..] => {
            return Err(cst.structural_invariant(
                format!("expected one filter context, found {}", filters.len()),
                cst.span(*second),
            ))
        }
    };

    let members = cst
        .find_all(filter, Rule::member)
        .into_iter()
        .map(|member| analyze_member(cst, member))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WhereStatement { members })
}

/// Name of the queried cube.
pub fn extract_cube_source(cst: &Cst, statement: NodeId) -> Result<String, MdxError> {
    cst.find_first(statement, Rule::cube_source)
        .and_then(|source| cst.find_first(source, Rule::name))
        .and_then(|name| cst.tokens_of(name, TokenKind::Identifier).first().copied())
        .map(|leaf| identifier_text(cst, leaf))
        .ok_or_else(|| cst.structural_invariant("statement has no cube source", cst.span(statement)))
}

// ============================================================================
// AXES
// ============================================================================

fn extract_axis(
    cst: &Cst,
    statement: NodeId,
    axis: Axis,
    config: &AnalyzerConfig,
) -> Result<AxisStatement, MdxError> {
    let marker = match axis {
        Axis::Rows => Rule::on_rows,
        Axis::Columns => Rule::on_columns,
    };
    let candidates: Vec<NodeId> = cst
        .find_all(statement, Rule::axis_statement)
        .into_iter()
        .filter(|id| cst.structural_children(*id).any(|c| cst.rule(c) == Some(marker)))
        .collect();

    let node = match candidates.as_slice() {
        [] => return Ok(AxisStatement::empty(axis)),
        [node] => *node,
        [_, second, ..] => {
            return Err(cst.structural_invariant(
                format!("{} axis is defined {} times", axis.as_str(), candidates.len()),
                cst.span(*second),
            ))
        }
    };

    let set_expressions = cst
        .find_outermost(node, Rule::set)
        .into_iter()
        .map(|set| analyze_set(cst, set, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AxisStatement {
        axis,
        non_empty: cst.find_first(node, Rule::non_empty).is_some(),
        set_expressions,
    })
}
