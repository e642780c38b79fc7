//! Set-Expression Analyzer
//!
//! Classifies a set-bearing subtree by its leading grammar production and
//! builds the matching [`SetExpression`] variant. Classification goes through
//! the closed [`SetTag`] enum; anything the analyzer does not model ends in an
//! explicit [`MdxError::UnknownSetExpression`].

use tracing::trace;

use crate::analysis::identifier_text;
use crate::ast::{Function, Literal, LiteralValue, Member, SetExpression};
use crate::config::{AnalyzerConfig, SchemaLevel};
use crate::diagnostics::{ErrorReporting, MdxError};
use crate::syntax::{revert, Cst, NodeId, Rule, TokenKind};

/// How a subtree is presented to the analyzer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetView {
    /// A `set` node; its first structural child decides the variant.
    Node(NodeId),
    /// A function parameter that is not itself a `set` (a bare `member`,
    /// `literals` or `tuple`), treated as a set with this single child.
    Wrapped(NodeId),
}

impl SetView {
    pub fn id(self) -> NodeId {
        match self {
            SetView::Node(id) | SetView::Wrapped(id) => id,
        }
    }
}

/// Productions the analyzer knows how to turn into a set expression.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SetTag {
    Member(NodeId),
    MemberWithExpression(NodeId),
    /// Call node (`union_set`, `tuple`, `other_function`, ...).
    Function(NodeId),
    Literals(NodeId),
    Unknown(NodeId),
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Analyze a `set` node.
pub fn analyze_set(
    cst: &Cst,
    set_node: NodeId,
    config: &AnalyzerConfig,
) -> Result<SetExpression, MdxError> {
    SetAnalyzer { cst, config }.analyze(SetView::Node(set_node), 0)
}

/// Build a [`Member`] from a `member` node: 2 identifiers are
/// `[dimension].[element]`, 3 are `[dimension].[hierarchy].[element]`.
pub fn analyze_member(cst: &Cst, member_node: NodeId) -> Result<Member, MdxError> {
    let names: Vec<String> = cst
        .tokens_of(member_node, TokenKind::Identifier)
        .into_iter()
        .map(|leaf| identifier_text(cst, leaf))
        .collect();

    let (dimension, hierarchy, element) = match names.as_slice() {
        [dimension, element] => (dimension.clone(), dimension.clone(), element.clone()),
        [dimension, hierarchy, element] => (dimension.clone(), hierarchy.clone(), element.clone()),
        _ => {
            return Err(cst.malformed_member(
                &revert(cst, member_node),
                names.len(),
                cst.span(member_node),
            ))
        }
    };

    Ok(Member {
        dimension,
        hierarchy,
        element,
        expression: None,
        origin: member_node,
    })
}

// ============================================================================
// ANALYZER
// ============================================================================

struct SetAnalyzer<'a> {
    cst: &'a Cst,
    config: &'a AnalyzerConfig,
}

impl SetAnalyzer<'_> {
    fn analyze(&self, view: SetView, depth: usize) -> Result<SetExpression, MdxError> {
        let origin = view.id();
        if depth > self.config.max_depth {
            return Err(self.cst.structural_invariant(
                format!("set expression nested deeper than {}", self.config.max_depth),
                self.cst.span(origin),
            ));
        }

        let tag = self.classify(view);
        trace!(?tag, depth, "analyzing set expression");

        if self.config.schema == SchemaLevel::Minimal {
            if let SetTag::Function(node) | SetTag::Literals(node) = tag {
                return Err(self.unknown(node, origin));
            }
        }

        match tag {
            SetTag::Member(node) => {
                let member = analyze_member(self.cst, node)?;
                Ok(SetExpression::Member(Member { origin, ..member }))
            }
            SetTag::MemberWithExpression(node) => self.member_with_expression(node, origin),
            SetTag::Function(call) => self.function(call, origin, depth),
            SetTag::Literals(node) => self.literal(node, origin),
            SetTag::Unknown(node) => Err(self.unknown(node, origin)),
        }
    }

    fn classify(&self, view: SetView) -> SetTag {
        let head = match view {
            SetView::Node(id) => match self.cst.structural_children(id).next() {
                Some(child) => child,
                None => return SetTag::Unknown(id),
            },
            SetView::Wrapped(id) => id,
        };

        match self.cst.rule(head) {
            Some(Rule::member) => SetTag::Member(head),
            Some(Rule::member_with_expression) => SetTag::MemberWithExpression(head),
            Some(Rule::literals) => SetTag::Literals(head),
            Some(Rule::function) => match self.cst.structural_children(head).next() {
                Some(call) => SetTag::Function(call),
                None => SetTag::Unknown(head),
            },
            Some(rule) if is_call_rule(rule) => SetTag::Function(head),
            _ => SetTag::Unknown(head),
        }
    }

    fn member_with_expression(&self, node: NodeId, origin: NodeId) -> Result<SetExpression, MdxError> {
        let mut inner = None;
        let mut expression = None;
        for child in self.cst.structural_children(node) {
            match self.cst.rule(child) {
                Some(Rule::member) => inner = Some(child),
                Some(Rule::member_expression) => expression = Some(revert(self.cst, child)),
                _ => {}
            }
        }

        let Some(inner) = inner else {
            return Err(self.cst.structural_invariant(
                "member expression without a member",
                self.cst.span(node),
            ));
        };
        let member = analyze_member(self.cst, inner)?;
        Ok(SetExpression::Member(Member {
            expression,
            origin,
            ..member
        }))
    }

    fn function(&self, call: NodeId, origin: NodeId, depth: usize) -> Result<SetExpression, MdxError> {
        let name = self.function_name(call);
        let parameters = self
            .cst
            .structural_children(call)
            .map(|child| {
                let view = if self.cst.rule(child) == Some(Rule::set) {
                    SetView::Node(child)
                } else {
                    SetView::Wrapped(child)
                };
                self.analyze(view, depth + 1)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SetExpression::Function(Function {
            name,
            parameters,
            origin,
        }))
    }

    fn function_name(&self, call: NodeId) -> String {
        match self.cst.rule(call) {
            Some(Rule::other_function) => self
                .cst
                .token_children(call)
                .find(|leaf| self.cst.token_kind(*leaf) == Some(TokenKind::FunctionName))
                .map(|leaf| self.cst.token_text(leaf).to_uppercase())
                .unwrap_or_default(),
            Some(rule) => format!("{rule:?}"),
            None => String::new(),
        }
    }

    fn literal(&self, node: NodeId, origin: NodeId) -> Result<SetExpression, MdxError> {
        let Some(token) = self.cst.first_token(node) else {
            return Err(self.cst.structural_invariant("literal without a token", self.cst.span(node)));
        };
        let text = self.cst.token_text(token);

        let data = match self.cst.token_kind(token) {
            Some(TokenKind::String) => LiteralValue::String(unquote(text)),
            Some(TokenKind::Numeric) => {
                let number = text.parse::<serde_json::Number>().map_err(|_| {
                    self.cst
                        .structural_invariant(format!("'{text}' is not a number"), self.cst.span(token))
                })?;
                LiteralValue::Number(number)
            }
            _ => return Err(self.unknown(token, origin)),
        };

        Ok(SetExpression::Literal(Literal { data, origin }))
    }

    fn unknown(&self, tagged: NodeId, origin: NodeId) -> MdxError {
        let tag = match (self.cst.rule(tagged), self.cst.token_kind(tagged)) {
            (Some(rule), _) => format!("{rule:?}"),
            (None, Some(kind)) => format!("{kind:?}"),
            (None, None) => "unknown".to_string(),
        };
        self.cst
            .unknown_set_expression(&tag, &revert(self.cst, origin), self.cst.span(origin))
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn is_call_rule(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::union_set
            | Rule::except_set
            | Rule::descendants_set
            | Rule::filter_by_pattern
            | Rule::filter_by_level
            | Rule::drill_down_member
            | Rule::drill_up_member
            | Rule::subset_to_set
            | Rule::subset_all
            | Rule::order_by_cell_value
            | Rule::range_set
            | Rule::tuple
            | Rule::set_list
            | Rule::other_function
    )
}

/// Strips the surrounding quotes of a string token and collapses doubled
/// quote characters.
pub(crate) fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let Some(quote) = chars.next() else {
        return String::new();
    };
    if text.len() < 2 || !text.ends_with(quote) {
        return text.to_string();
    }
    let inner = &text[quote.len_utf8()..text.len() - quote.len_utf8()];
    let doubled: String = [quote, quote].iter().collect();
    inner.replace(&doubled, &quote.to_string())
}
