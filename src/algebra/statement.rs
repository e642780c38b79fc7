//! Statement builder: the executable form of a query.

use std::fmt;

use super::hierarchy_set::MdxSet;
use super::member::Tuple;
use crate::ast::set_expression::escape;

/// Set placed on one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSelection {
    pub set: MdxSet,
    pub non_empty: bool,
}

impl AxisSelection {
    fn to_mdx(&self, axis: u8) -> String {
        let prefix = if self.non_empty { "NON EMPTY " } else { "" };
        format!("{prefix}{} ON {axis}", self.set.to_mdx())
    }
}

/// Cube, optional column and row sets, and a filter tuple that is empty when
/// the query has no `WHERE`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementBuilder {
    pub cube: String,
    pub columns: Option<AxisSelection>,
    pub rows: Option<AxisSelection>,
    pub where_clause: Tuple,
}

impl StatementBuilder {
    pub fn new(cube: impl Into<String>) -> Self {
        Self {
            cube: cube.into(),
            columns: None,
            rows: None,
            where_clause: Tuple::empty(),
        }
    }

    pub fn columns(mut self, set: MdxSet, non_empty: bool) -> Self {
        self.columns = Some(AxisSelection { set, non_empty });
        self
    }

    pub fn rows(mut self, set: MdxSet, non_empty: bool) -> Self {
        self.rows = Some(AxisSelection { set, non_empty });
        self
    }

    pub fn where_tuple(mut self, tuple: Tuple) -> Self {
        self.where_clause = tuple;
        self
    }

    /// Re-emit the statement. Columns are axis 0, rows axis 1.
    pub fn to_mdx(&self) -> String {
        let axes: Vec<String> = [(&self.columns, 0u8), (&self.rows, 1u8)]
            .into_iter()
            .filter_map(|(selection, axis)| selection.as_ref().map(|s| s.to_mdx(axis)))
            .collect();

        let mut mdx = String::from("SELECT\n");
        if !axes.is_empty() {
            mdx.push_str(&axes.join(",\n"));
            mdx.push('\n');
        }
        mdx.push_str(&format!("FROM [{}]", escape(&self.cube)));
        if !self.where_clause.is_empty() {
            mdx.push_str(&format!("\nWHERE {}", self.where_clause.to_mdx()));
        }
        mdx
    }
}

impl fmt::Display for StatementBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mdx())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{HierarchySet, Member};

    #[test]
    fn renders_full_statement() {
        let builder = StatementBuilder::new("Sales")
            .columns(
                HierarchySet::AllMembers {
                    dimension: "A".into(),
                    hierarchy: "A".into(),
                }
                .into(),
                true,
            )
            .where_tuple(Tuple::new(vec![Member::new("X", "X", "1")]));
        assert_eq!(
            builder.to_mdx(),
            "SELECT\nNON EMPTY {[A].[A].MEMBERS} ON 0\nFROM [Sales]\nWHERE ([X].[X].[1])"
        );
    }

    #[test]
    fn empty_where_is_omitted() {
        assert_eq!(StatementBuilder::new("C").to_mdx(), "SELECT\nFROM [C]");
    }
}
