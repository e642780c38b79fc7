//! Semantic Transformer
//!
//! Bottom-up construction of the hierarchy-set algebra from the CST. Each
//! grammar rule maps to one constructor; operands are checked as they are
//! consumed and a mismatch names the operator, the 1-based operand position
//! and the expected type.

use tracing::{debug, trace};

use super::hierarchy_set::{HierarchySet, MdxSet, OrderDirection};
use super::member::{Member, Tuple, TuplesSet};
use super::statement::{AxisSelection, StatementBuilder};
use crate::analysis::set_expression::unquote;
use crate::analysis::{extract_cube_source, identifier_text};
use crate::config::AnalyzerConfig;
use crate::diagnostics::{ErrorReporting, MdxError};
use crate::syntax::{revert, Cst, NodeId, Rule, TokenKind};

// Levels outside this range would saturate when cast.
const I64_LOWER: f64 = i64::MIN as f64;
const I64_UPPER: f64 = -(i64::MIN as f64);

/// Build the [`StatementBuilder`] for a parsed statement.
pub fn transform(cst: &Cst, config: &AnalyzerConfig) -> Result<StatementBuilder, MdxError> {
    Transformer::new(cst, config).statement()
}

/// Value produced for a subtree before the consuming operator has checked it.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    /// Bracketed names; a member or a hierarchy depending on position.
    Reference(Vec<String>),
    Tuple(Tuple),
    Set(MdxSet),
    String(String),
    Number(f64),
}

impl Operand {
    fn kind(&self) -> &'static str {
        match self {
            Operand::Reference(_) => "member reference",
            Operand::Tuple(_) => "tuple",
            Operand::Set(set) => set.kind(),
            Operand::String(_) => "string",
            Operand::Number(_) => "number",
        }
    }
}

/// An operand together with the node it came from.
struct Param {
    node: NodeId,
    operand: Operand,
}

pub struct Transformer<'a> {
    cst: &'a Cst,
    config: &'a AnalyzerConfig,
}

impl<'a> Transformer<'a> {
    pub fn new(cst: &'a Cst, config: &'a AnalyzerConfig) -> Self {
        Self { cst, config }
    }

    // ========================================================================
    // STATEMENT
    // ========================================================================

    pub fn statement(&self) -> Result<StatementBuilder, MdxError> {
        let cst = self.cst;
        let root = cst.root();
        let statement = cst
            .structural_children(root)
            .next()
            .filter(|id| cst.rule(*id) == Some(Rule::query_statement))
            .ok_or_else(|| cst.structural_invariant("root has no query statement", cst.span(root)))?;

        let mut builder = StatementBuilder::new(extract_cube_source(cst, statement)?);

        for node in cst.structural_children(statement) {
            match cst.rule(node) {
                Some(Rule::axis_statement) => self.axis(node, &mut builder)?,
                Some(Rule::where_statement) => builder.where_clause = self.where_tuple(node)?,
                _ => {}
            }
        }

        debug!(
            cube = %builder.cube,
            rows = builder.rows.is_some(),
            columns = builder.columns.is_some(),
            "transformed statement"
        );
        Ok(builder)
    }

    fn axis(&self, node: NodeId, builder: &mut StatementBuilder) -> Result<(), MdxError> {
        let mut non_empty = false;
        let mut set_node = None;
        let mut rows = None;
        for child in self.cst.structural_children(node) {
            match self.cst.rule(child) {
                Some(Rule::non_empty) => non_empty = true,
                Some(Rule::axis_set) => set_node = Some(child),
                Some(Rule::on_rows) => rows = Some(true),
                Some(Rule::on_columns) => rows = Some(false),
                _ => {}
            }
        }
        let (Some(set_node), Some(rows)) = (set_node, rows) else {
            return Err(self
                .cst
                .structural_invariant("axis without a set or position", self.cst.span(node)));
        };

        let set = self.collection("axis", set_node, 0)?;
        let slot = if rows {
            &mut builder.rows
        } else {
            &mut builder.columns
        };
        if slot.is_some() {
            return Err(self.cst.structural_invariant(
                format!("{} axis is defined twice", if rows { "rows" } else { "columns" }),
                self.cst.span(node),
            ));
        }
        *slot = Some(AxisSelection { set, non_empty });
        Ok(())
    }

    fn where_tuple(&self, node: NodeId) -> Result<Tuple, MdxError> {
        let Some(child) = self.cst.structural_children(node).next() else {
            return Ok(Tuple::empty());
        };
        let param = Param {
            node: child,
            operand: self.operand(child, 0)?,
        };
        match param.operand {
            Operand::Tuple(tuple) => Ok(tuple),
            _ => Ok(Tuple::new(vec![self.expect_member("WHERE", 1, param)?])),
        }
    }

    // ========================================================================
    // OPERANDS
    // ========================================================================

    fn operand(&self, node: NodeId, depth: usize) -> Result<Operand, MdxError> {
        if depth > self.config.max_depth {
            return Err(self.cst.structural_invariant(
                format!("set expression nested deeper than {}", self.config.max_depth),
                self.cst.span(node),
            ));
        }

        match self.cst.rule(node) {
            Some(Rule::set) | Some(Rule::function) => {
                let inner = self.cst.structural_children(node).next().ok_or_else(|| {
                    self.cst
                        .structural_invariant("empty set expression", self.cst.span(node))
                })?;
                self.operand(inner, depth)
            }
            Some(Rule::member) => Ok(Operand::Reference(self.names(node))),
            Some(Rule::member_with_expression) => self.member_expression(node).map(Operand::Set),
            Some(Rule::literals) => self.scalar(node),
            Some(rule) => self.call(node, rule, depth),
            None => Err(self
                .cst
                .structural_invariant("token where an operand was expected", self.cst.span(node))),
        }
    }

    fn parameters(&self, node: NodeId, depth: usize) -> Result<Vec<Param>, MdxError> {
        self.cst
            .structural_children(node)
            .map(|child| {
                Ok(Param {
                    node: child,
                    operand: self.operand(child, depth + 1)?,
                })
            })
            .collect()
    }

    fn names(&self, member: NodeId) -> Vec<String> {
        self.cst
            .tokens_of(member, TokenKind::Identifier)
            .into_iter()
            .map(|leaf| identifier_text(self.cst, leaf))
            .collect()
    }

    fn scalar(&self, node: NodeId) -> Result<Operand, MdxError> {
        let token = self
            .cst
            .first_token(node)
            .ok_or_else(|| self.cst.structural_invariant("literal without a token", self.cst.span(node)))?;
        let text = self.cst.token_text(token);
        match self.cst.token_kind(token) {
            Some(TokenKind::String) => Ok(Operand::String(unquote(text))),
            Some(TokenKind::Numeric) => text.parse::<f64>().map(Operand::Number).map_err(|_| {
                self.cst
                    .structural_invariant(format!("'{text}' is not a number"), self.cst.span(token))
            }),
            _ => Err(self
                .cst
                .structural_invariant(format!("'{text}' is not a literal"), self.cst.span(token))),
        }
    }

    /// Braced list (axis set or `{...}`): tuples and members make a
    /// [`TuplesSet`], a single set stands for itself, several sets are
    /// concatenated keeping duplicates.
    fn collection(&self, operator: &str, node: NodeId, depth: usize) -> Result<MdxSet, MdxError> {
        let params = self.parameters(node, depth)?;

        let all_tuples = params
            .iter()
            .all(|p| matches!(p.operand, Operand::Reference(_) | Operand::Tuple(_)));
        if all_tuples {
            let tuples = params
                .into_iter()
                .enumerate()
                .map(|(i, p)| self.expect_tuple(operator, i + 1, p))
                .collect::<Result<Vec<_>, _>>()?;
            return TuplesSet::from_tuples(tuples).map(MdxSet::Tuples).ok_or_else(|| {
                self.cst
                    .structural_invariant("empty set list", self.cst.span(node))
            });
        }

        let mut sets = params
            .into_iter()
            .enumerate()
            .map(|(i, p)| self.expect_set(operator, i + 1, p));
        let Some(first) = sets.next() else {
            return Err(self.cst.structural_invariant("empty set list", self.cst.span(node)));
        };
        sets.try_fold(first?, |left, right: Result<MdxSet, MdxError>| -> Result<MdxSet, MdxError> {
            Ok(MdxSet::Hierarchy(HierarchySet::Union {
                left: Box::new(left),
                right: Box::new(right?),
                allow_duplicates: true,
            }))
        })
    }

    // ========================================================================
    // OPERATORS
    // ========================================================================

    fn call(&self, node: NodeId, rule: Rule, depth: usize) -> Result<Operand, MdxError> {
        let operator = self.operator_name(node, rule);
        trace!(%operator, "building operator");

        let set = match rule {
            Rule::tuple => {
                let members = self
                    .parameters(node, depth)?
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| self.expect_member(&operator, i + 1, p))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(Operand::Tuple(Tuple::new(members)));
            }
            Rule::set_list => return self.collection(&operator, node, depth).map(Operand::Set),
            Rule::range_set => {
                let [start, end] = self.exact::<2>(&operator, node, depth)?;
                HierarchySet::Range {
                    start: self.expect_member(&operator, 1, start)?,
                    end: self.expect_member(&operator, 2, end)?,
                }
            }
            Rule::union_set => {
                let [left, right] = self.exact::<2>(&operator, node, depth)?;
                HierarchySet::Union {
                    left: Box::new(self.expect_set(&operator, 1, left)?),
                    right: Box::new(self.expect_set(&operator, 2, right)?),
                    allow_duplicates: false,
                }
            }
            Rule::except_set => {
                let [left, right] = self.exact::<2>(&operator, node, depth)?;
                HierarchySet::Except {
                    left: Box::new(self.expect_set(&operator, 1, left)?),
                    right: Box::new(self.expect_set(&operator, 2, right)?),
                }
            }
            Rule::descendants_set => {
                if self.has_token(node, TokenKind::Flag)
                    || self.cst.structural_children(node).count() > 1
                {
                    return Err(self.unsupported(
                        &operator,
                        "parameterized DESCENDANTS is not supported",
                        node,
                    ));
                }
                let [set] = self.exact::<1>(&operator, node, depth)?;
                HierarchySet::Descendants {
                    set: Box::new(self.expect_set(&operator, 1, set)?),
                }
            }
            Rule::filter_by_pattern => {
                let [set, pattern] = self.exact::<2>(&operator, node, depth)?;
                HierarchySet::FilterByPattern {
                    set: Box::new(self.expect_hierarchy_set(&operator, 1, set)?),
                    pattern: self.expect_string(&operator, 2, pattern)?,
                }
            }
            Rule::filter_by_level => {
                let [set, level] = self.exact::<2>(&operator, node, depth)?;
                HierarchySet::FilterByLevel {
                    set: Box::new(self.expect_hierarchy_set(&operator, 1, set)?),
                    level: self.expect_integer(&operator, 2, level)?,
                }
            }
            Rule::drill_down_member => self.drill_down(&operator, node, depth)?,
            Rule::drill_up_member => {
                return Err(self.unsupported(
                    &operator,
                    "drill up is not supported by the execution API",
                    node,
                ))
            }
            Rule::subset_to_set => {
                let [hierarchy, subset] = self.exact::<2>(&operator, node, depth)?;
                let (dimension, hierarchy) = self.expect_hierarchy(&operator, 1, hierarchy)?;
                HierarchySet::SubsetToSet {
                    dimension,
                    hierarchy,
                    subset: self.expect_string(&operator, 2, subset)?,
                }
            }
            Rule::subset_all => {
                let [hierarchy] = self.exact::<1>(&operator, node, depth)?;
                let (dimension, hierarchy) = self.expect_hierarchy(&operator, 1, hierarchy)?;
                HierarchySet::SubsetAll {
                    dimension,
                    hierarchy,
                }
            }
            Rule::order_by_cell_value => self.order(&operator, node, depth)?,
            Rule::other_function => {
                return Err(self.unsupported(&operator, "function is not supported", node))
            }
            _ => return Err(self.unsupported(&operator, "rule has no constructor", node)),
        };
        Ok(Operand::Set(MdxSet::Hierarchy(set)))
    }

    fn member_expression(&self, node: NodeId) -> Result<MdxSet, MdxError> {
        let mut member = None;
        let mut qualifier = None;
        for child in self.cst.structural_children(node) {
            match self.cst.rule(child) {
                Some(Rule::member) => member = Some(child),
                Some(Rule::member_expression) => {
                    qualifier = self.cst.structural_children(child).next()
                }
                _ => {}
            }
        }
        let (Some(member), Some(qualifier)) = (member, qualifier) else {
            return Err(self
                .cst
                .structural_invariant("incomplete member expression", self.cst.span(node)));
        };

        let names = self.names(member);
        let param = Param {
            node: member,
            operand: Operand::Reference(names.clone()),
        };
        let set = match self.cst.rule(qualifier) {
            Some(Rule::all_members) => {
                let (dimension, hierarchy) = self.expect_hierarchy("MEMBERS", 1, param)?;
                HierarchySet::AllMembers {
                    dimension,
                    hierarchy,
                }
            }
            Some(Rule::children) => HierarchySet::Children {
                member: self.expect_member("CHILDREN", 1, param)?,
            },
            Some(Rule::default_member) => {
                let (dimension, hierarchy) = if names.len() == 3 {
                    let member = self.expect_member("DEFAULTMEMBER", 1, param)?;
                    (member.dimension, member.hierarchy)
                } else {
                    self.expect_hierarchy("DEFAULTMEMBER", 1, param)?
                };
                HierarchySet::DefaultMember {
                    dimension,
                    hierarchy,
                }
            }
            _ => {
                let name = revert(self.cst, qualifier).trim().to_uppercase();
                return Err(self.unsupported(&name, "member qualifier is not supported", node));
            }
        };
        Ok(MdxSet::Hierarchy(set))
    }

    fn drill_down(&self, operator: &str, node: NodeId, depth: usize) -> Result<HierarchySet, MdxError> {
        let mut params = self.parameters(node, depth)?.into_iter();
        let Some(first) = params.next() else {
            return Err(self.arity(operator, node, 1, 0));
        };
        let set = Box::new(self.expect_set(operator, 1, first)?);
        let other = match (self.has_token(node, TokenKind::All), params.next()) {
            (true, None) => None,
            (false, Some(other)) => Some(Box::new(self.expect_set(operator, 2, other)?)),
            _ => {
                let found = self.cst.structural_children(node).count();
                return Err(self.arity(operator, node, 2, found));
            }
        };
        Ok(HierarchySet::DrillDown {
            set,
            other,
            recursive: self.has_token(node, TokenKind::Recursive),
        })
    }

    fn order(&self, operator: &str, node: NodeId, depth: usize) -> Result<HierarchySet, MdxError> {
        let [set, tuple] = self.exact::<2>(operator, node, depth)?;
        let cube = self
            .token(node, TokenKind::CubeQualifier)
            .map(|text| unbracket(&text))
            .ok_or_else(|| self.cst.structural_invariant("ORDER without a cube", self.cst.span(node)))?;
        let order = match self.token(node, TokenKind::OrderDirection) {
            Some(text) => OrderDirection::parse(&text).ok_or_else(|| {
                self.cst.malformed_operand(
                    operator,
                    4,
                    "order direction",
                    &text,
                    self.cst.span(node),
                )
            })?,
            None => OrderDirection::default(),
        };
        Ok(HierarchySet::OrderByCellValue {
            set: Box::new(self.expect_set(operator, 1, set)?),
            cube,
            tuple: self.expect_tuple(operator, 3, tuple)?,
            order,
        })
    }

    // ========================================================================
    // OPERAND CHECKS
    // ========================================================================

    fn exact<const N: usize>(
        &self,
        operator: &str,
        node: NodeId,
        depth: usize,
    ) -> Result<[Param; N], MdxError> {
        self.parameters(node, depth)?
            .try_into()
            .map_err(|params: Vec<Param>| self.arity(operator, node, N, params.len()))
    }

    fn expect_member(&self, operator: &str, position: usize, param: Param) -> Result<Member, MdxError> {
        match param.operand {
            Operand::Reference(names) => match names.as_slice() {
                [dimension, element] => Ok(Member::new(dimension, dimension, element)),
                [dimension, hierarchy, element] => Ok(Member::new(dimension, hierarchy, element)),
                _ => Err(self.cst.malformed_member(
                    &revert(self.cst, param.node),
                    names.len(),
                    self.cst.span(param.node),
                )),
            },
            other => Err(self.mismatch(operator, position, "member", &other, param.node)),
        }
    }

    /// `[dimension]` or `[dimension].[hierarchy]`.
    fn expect_hierarchy(
        &self,
        operator: &str,
        position: usize,
        param: Param,
    ) -> Result<(String, String), MdxError> {
        match &param.operand {
            Operand::Reference(names) => match names.as_slice() {
                [dimension] => Ok((dimension.clone(), dimension.clone())),
                [dimension, hierarchy] => Ok((dimension.clone(), hierarchy.clone())),
                _ => Err(self.cst.malformed_operand(
                    operator,
                    position,
                    "hierarchy reference",
                    &format!("{} identifiers", names.len()),
                    self.cst.span(param.node),
                )),
            },
            other => Err(self.mismatch(operator, position, "hierarchy reference", other, param.node)),
        }
    }

    /// A tuple; a lone member is promoted to a 1-tuple.
    fn expect_tuple(&self, operator: &str, position: usize, param: Param) -> Result<Tuple, MdxError> {
        match param.operand {
            Operand::Tuple(tuple) => Ok(tuple),
            Operand::Reference(_) => Ok(Tuple::new(vec![self.expect_member(operator, position, param)?])),
            other => Err(self.mismatch(operator, position, "tuple", &other, param.node)),
        }
    }

    /// Any set; members and tuples are promoted to a [`TuplesSet`].
    fn expect_set(&self, operator: &str, position: usize, param: Param) -> Result<MdxSet, MdxError> {
        match param.operand {
            Operand::Set(set) => Ok(set),
            Operand::Reference(_) | Operand::Tuple(_) => {
                let node = param.node;
                let tuple = self.expect_tuple(operator, position, param)?;
                TuplesSet::from_tuples(vec![tuple])
                    .map(MdxSet::Tuples)
                    .ok_or_else(|| self.cst.structural_invariant("empty tuple", self.cst.span(node)))
            }
            other => Err(self.mismatch(operator, position, "set", &other, param.node)),
        }
    }

    fn expect_hierarchy_set(
        &self,
        operator: &str,
        position: usize,
        param: Param,
    ) -> Result<HierarchySet, MdxError> {
        match param.operand {
            Operand::Set(MdxSet::Hierarchy(set)) => Ok(set),
            other => Err(self.mismatch(operator, position, "hierarchy set", &other, param.node)),
        }
    }

    fn expect_string(&self, operator: &str, position: usize, param: Param) -> Result<String, MdxError> {
        match param.operand {
            Operand::String(text) => Ok(text),
            other => Err(self.mismatch(operator, position, "string", &other, param.node)),
        }
    }

    fn expect_integer(&self, operator: &str, position: usize, param: Param) -> Result<i64, MdxError> {
        match param.operand {
            Operand::Number(n) if n.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&n) => {
                Ok(n as i64)
            }
            Operand::Number(n) => Err(self.cst.malformed_operand(
                operator,
                position,
                "integer",
                &format!("number {n}"),
                self.cst.span(param.node),
            )),
            other => Err(self.mismatch(operator, position, "integer", &other, param.node)),
        }
    }

    // ========================================================================
    // UTILITIES
    // ========================================================================

    /// Keyword that names a call in diagnostics.
    fn operator_name(&self, node: NodeId, rule: Rule) -> String {
        match rule {
            Rule::tuple => "tuple".to_string(),
            Rule::set_list => "set".to_string(),
            Rule::range_set => "range".to_string(),
            _ => self
                .cst
                .first_token(node)
                .map(|token| self.cst.token_text(token).to_uppercase())
                .unwrap_or_else(|| format!("{rule:?}")),
        }
    }

    fn has_token(&self, node: NodeId, kind: TokenKind) -> bool {
        self.cst
            .token_children(node)
            .any(|leaf| self.cst.token_kind(leaf) == Some(kind))
    }

    fn token(&self, node: NodeId, kind: TokenKind) -> Option<String> {
        self.cst
            .token_children(node)
            .find(|leaf| self.cst.token_kind(*leaf) == Some(kind))
            .map(|leaf| self.cst.token_text(leaf).to_string())
    }

    fn mismatch(
        &self,
        operator: &str,
        position: usize,
        expected: &str,
        actual: &Operand,
        node: NodeId,
    ) -> MdxError {
        self.cst
            .malformed_operand(operator, position, expected, actual.kind(), self.cst.span(node))
    }

    fn arity(&self, operator: &str, node: NodeId, expected: usize, found: usize) -> MdxError {
        self.cst.structural_invariant(
            format!("{operator} takes {expected} operand(s), found {found}"),
            self.cst.span(node),
        )
    }

    fn unsupported(&self, name: &str, reason: &str, node: NodeId) -> MdxError {
        self.cst
            .unsupported_operator(name, reason, &revert(self.cst, node), self.cst.span(node))
    }
}

/// `[Sales]` → `Sales`, resolving `]]`.
fn unbracket(text: &str) -> String {
    text.strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text)
        .replace("]]", "]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;
    use crate::syntax::parse;

    fn build(text: &str) -> Result<StatementBuilder, MdxError> {
        let cst = parse(text, "test").unwrap();
        transform(&cst, &AnalyzerConfig::default())
    }

    fn columns(text: &str) -> MdxSet {
        build(text).unwrap().columns.unwrap().set
    }

    #[test]
    fn all_members_uses_hierarchy_position() {
        assert_eq!(
            columns("SELECT {[A].[H].Members} ON 0 FROM [C]"),
            MdxSet::Hierarchy(HierarchySet::AllMembers {
                dimension: "A".into(),
                hierarchy: "H".into(),
            })
        );
    }

    #[test]
    fn braced_members_make_tuples_set() {
        match columns("SELECT {[A].[x], [A].[H].[y]} ON 0 FROM [C]") {
            MdxSet::Tuples(set) => {
                assert_eq!(set.dimension, "A");
                assert_eq!(set.hierarchy, "A");
                assert_eq!(set.tuples.len(), 2);
                assert_eq!(set.tuples[1].members[0], Member::new("A", "H", "y"));
            }
            other => panic!("expected tuples set, got {other:?}"),
        }
    }

    #[test]
    fn union_never_allows_duplicates() {
        match columns("SELECT {UNION({[A].[A].Members}, {[B].[B].Members})} ON 0 FROM [C]") {
            MdxSet::Hierarchy(HierarchySet::Union {
                allow_duplicates, ..
            }) => assert!(!allow_duplicates),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn several_sets_are_concatenated() {
        match columns("SELECT {[A].[A].Members, [B].[B].Members} ON 0 FROM [C]") {
            MdxSet::Hierarchy(HierarchySet::Union {
                allow_duplicates, ..
            }) => assert!(allow_duplicates),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn filter_by_level_coerces_integer() {
        match columns("SELECT {TM1FILTERBYLEVEL({[A].[A].Members}, 0)} ON 0 FROM [C]") {
            MdxSet::Hierarchy(HierarchySet::FilterByLevel { level, .. }) => assert_eq!(level, 0),
            other => panic!("expected level filter, got {other:?}"),
        }
    }

    #[test]
    fn fractional_level_names_position() {
        let err = build("SELECT {TM1FILTERBYLEVEL({[A].[A].Members}, 1.5)} ON 0 FROM [C]").unwrap_err();
        match err {
            MdxError::MalformedOperandType {
                operator,
                position,
                expected,
                ..
            } => {
                assert_eq!(operator, "TM1FILTERBYLEVEL");
                assert_eq!(position, 2);
                assert_eq!(expected, "integer");
            }
            other => panic!("expected operand error, got {other:?}"),
        }
    }

    #[test]
    fn pattern_filter_needs_hierarchy_set() {
        let err = build("SELECT {TM1FILTERBYPATTERN({[A].[x]}, 'a*')} ON 0 FROM [C]").unwrap_err();
        match err {
            MdxError::MalformedOperandType {
                position, actual, ..
            } => {
                assert_eq!(position, 1);
                assert_eq!(actual, "tuples set");
            }
            other => panic!("expected operand error, got {other:?}"),
        }
    }

    #[test]
    fn drill_down_all_is_unbounded() {
        match columns("SELECT {TM1DRILLDOWNMEMBER({[A].[A].[x]}, ALL, RECURSIVE)} ON 0 FROM [C]") {
            MdxSet::Hierarchy(HierarchySet::DrillDown {
                other, recursive, ..
            }) => {
                assert!(other.is_none());
                assert!(recursive);
            }
            other => panic!("expected drill down, got {other:?}"),
        }
    }

    #[test]
    fn drill_down_with_other_set() {
        match columns("SELECT {TM1DRILLDOWNMEMBER({[A].[A].[x]}, {[A].[A].[y]})} ON 0 FROM [C]") {
            MdxSet::Hierarchy(HierarchySet::DrillDown {
                other, recursive, ..
            }) => {
                assert!(other.is_some());
                assert!(!recursive);
            }
            other => panic!("expected drill down, got {other:?}"),
        }
    }

    #[test]
    fn parameterized_descendants_is_unsupported() {
        let err = build("SELECT {DESCENDANTS({[A].[A].[x]}, 2)} ON 0 FROM [C]").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::UnsupportedOperator);
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let err = build(
            "SELECT {TM1FILTERBYLEVEL({[A].[A].Members}, 99999999999999999999999)} ON 0 FROM [C]",
        )
        .unwrap_err();
        match err {
            MdxError::MalformedOperandType {
                position, expected, ..
            } => {
                assert_eq!(position, 2);
                assert_eq!(expected, "integer");
            }
            other => panic!("expected operand error, got {other:?}"),
        }
    }

    #[test]
    fn depth_limit_is_enforced() {
        let cst = parse(
            "SELECT {UNION(UNION({[A].[B]}, {[A].[C]}), {[A].[D]})} ON 0 FROM [C]",
            "test",
        )
        .unwrap();
        let config = AnalyzerConfig {
            max_depth: 1,
            ..AnalyzerConfig::default()
        };
        let err = transform(&cst, &config).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::StructuralInvariant);
        assert!(transform(&cst, &AnalyzerConfig::default()).is_ok());
    }

    #[test]
    fn qualifier_sharing_a_keyword_prefix_is_unsupported() {
        let err = build("SELECT {[A].[A].[x].ChildrenCount} ON 0 FROM [C]").unwrap_err();
        match err {
            MdxError::UnsupportedOperator { name, .. } => assert_eq!(name, "CHILDRENCOUNT"),
            other => panic!("expected unsupported operator, got {other:?}"),
        }
    }

    #[test]
    fn unknown_qualifier_is_unsupported() {
        let err = build("SELECT {[A].[A].[x].Parent} ON 0 FROM [C]").unwrap_err();
        match err {
            MdxError::UnsupportedOperator { name, .. } => assert_eq!(name, "PARENT"),
            other => panic!("expected unsupported operator, got {other:?}"),
        }
    }

    #[test]
    fn subset_takes_hierarchy_and_name() {
        assert_eq!(
            columns("SELECT {TM1SUBSETTOSET([Region].[Region], \"Europe\")} ON 0 FROM [C]"),
            MdxSet::Hierarchy(HierarchySet::SubsetToSet {
                dimension: "Region".into(),
                hierarchy: "Region".into(),
                subset: "Europe".into(),
            })
        );
        assert_eq!(
            columns("SELECT {TM1SUBSETALL([Region])} ON 0 FROM [C]"),
            MdxSet::Hierarchy(HierarchySet::SubsetAll {
                dimension: "Region".into(),
                hierarchy: "Region".into(),
            })
        );
    }

    #[test]
    fn order_reads_cube_and_direction() {
        let set = columns(
            "SELECT {ORDER({[A].[A].Members}, [Sales]].EU].([M].[M].[Value]), BDESC)} ON 0 FROM [C]",
        );
        match set {
            MdxSet::Hierarchy(HierarchySet::OrderByCellValue {
                cube, tuple, order, ..
            }) => {
                assert_eq!(cube, "Sales].EU");
                assert_eq!(tuple.members, vec![Member::new("M", "M", "Value")]);
                assert_eq!(order, OrderDirection::BDesc);
            }
            other => panic!("expected order, got {other:?}"),
        }
    }

    #[test]
    fn where_defaults_to_empty_tuple() {
        let builder = build("SELECT {[A].[A].Members} ON 0 FROM [C]").unwrap();
        assert!(builder.where_clause.is_empty());
        assert!(builder.rows.is_none());
    }

    #[test]
    fn where_member_becomes_tuple() {
        let builder = build("SELECT {[A].[A].Members} ON 0 FROM [C] WHERE [X].[1]").unwrap();
        assert_eq!(builder.where_clause.members, vec![Member::new("X", "X", "1")]);
    }

    #[test]
    fn unbracket_resolves_escapes() {
        assert_eq!(unbracket("[a]]b]"), "a]b");
    }
}
