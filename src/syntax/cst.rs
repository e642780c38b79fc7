//! Concrete syntax tree for MDX statements.
//!
//! The tree is stored as an arena: every node is addressed by a [`NodeId`] and
//! the leaves tile the source text, so any subtree can be turned back into the
//! exact substring it was parsed from (see [`crate::syntax::revert`]).
//!
//! ## Invariants
//! - Leaves appear in document order and never overlap.
//! - Every byte of the parsed input is covered by exactly one leaf.
//! - Node ids are only meaningful for the `Cst` that produced them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::parser::Rule;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Byte range into the parsed text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index of a node inside a [`Cst`] arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kinds of leaf token.
///
/// Named kinds come from UPPERCASE grammar rules; `Anonymous` and `Whitespace`
/// cover keywords, punctuation and layout the grammar matches inline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    Numeric,
    String,
    All,
    Recursive,
    OrderDirection,
    CubeQualifier,
    FunctionName,
    Flag,
    Comment,
    Anonymous,
    Whitespace,
}

impl TokenKind {
    /// Maps a token-producing grammar rule to its kind.
    pub fn from_rule(rule: Rule) -> Option<Self> {
        let kind = match rule {
            Rule::IDENTIFIER => TokenKind::Identifier,
            Rule::NUMERIC => TokenKind::Numeric,
            Rule::STRING => TokenKind::String,
            Rule::ALL => TokenKind::All,
            Rule::RECURSIVE => TokenKind::Recursive,
            Rule::ORDER_DIRECTION => TokenKind::OrderDirection,
            Rule::CUBE_QUALIFIER => TokenKind::CubeQualifier,
            Rule::FUNCTION_NAME => TokenKind::FunctionName,
            Rule::FLAG => TokenKind::Flag,
            Rule::COMMENT => TokenKind::Comment,
            _ => return None,
        };
        Some(kind)
    }

    /// Layout tokens carry no meaning beyond reproducing the source.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// A single arena entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CstNode {
    /// Structural node labelled by the grammar rule that produced it.
    Branch {
        rule: Rule,
        children: Vec<NodeId>,
        span: Span,
    },
    /// Leaf token; its text is `source[span]`.
    Leaf { kind: TokenKind, span: Span },
}

impl CstNode {
    pub fn span(&self) -> Span {
        match self {
            CstNode::Branch { span, .. } | CstNode::Leaf { span, .. } => *span,
        }
    }
}

/// An immutable concrete syntax tree plus the text it was parsed from.
#[derive(Debug, Clone)]
pub struct Cst {
    name: String,
    source: Arc<str>,
    nodes: Vec<CstNode>,
    root: NodeId,
}

// ============================================================================
// PUBLIC API
// ============================================================================

impl Cst {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The complete text the tree was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name used when rendering diagnostics for this tree.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self, id: NodeId) -> &CstNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span()
    }

    /// Grammar rule of a structural node, `None` for leaves.
    pub fn rule(&self, id: NodeId) -> Option<Rule> {
        match self.node(id) {
            CstNode::Branch { rule, .. } => Some(*rule),
            CstNode::Leaf { .. } => None,
        }
    }

    /// Token kind of a leaf, `None` for structural nodes.
    pub fn token_kind(&self, id: NodeId) -> Option<TokenKind> {
        match self.node(id) {
            CstNode::Leaf { kind, .. } => Some(*kind),
            CstNode::Branch { .. } => None,
        }
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.node(id), CstNode::Leaf { .. })
    }

    /// Source text of a leaf. Structural nodes yield an empty string; use
    /// [`crate::syntax::revert`] to reconstruct their text.
    pub fn token_text(&self, id: NodeId) -> &str {
        match self.node(id) {
            CstNode::Leaf { span, .. } => &self.source[span.start..span.end],
            CstNode::Branch { .. } => "",
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            CstNode::Branch { children, .. } => children,
            CstNode::Leaf { .. } => &[],
        }
    }

    /// Children that are structural nodes, skipping every leaf token.
    pub fn structural_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| !self.is_leaf(*child))
    }

    /// Leaf children that are not whitespace or comments.
    pub fn token_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().copied().filter(move |child| {
            self.token_kind(*child)
                .map(|kind| !kind.is_trivia())
                .unwrap_or(false)
        })
    }

    /// Pre-order walk over `id` and everything beneath it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            cst: self,
            stack: vec![id],
        }
    }

    /// Every structural node labelled `rule` at or below `id`, document order.
    pub fn find_all(&self, id: NodeId, rule: Rule) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|node| self.rule(*node) == Some(rule))
            .collect()
    }

    /// First structural node labelled `rule` at or below `id`.
    pub fn find_first(&self, id: NodeId, rule: Rule) -> Option<NodeId> {
        self.descendants(id)
            .find(|node| self.rule(*node) == Some(rule))
    }

    /// Outermost nodes labelled `rule` below `id`: once a match is found its
    /// subtree is not searched any further.
    pub fn find_outermost(&self, id: NodeId, rule: Rule) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.rule(node) == Some(rule) {
                found.push(node);
                continue;
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        found
    }

    /// Leaves of `kind` at or below `id`, document order.
    pub fn tokens_of(&self, id: NodeId, kind: TokenKind) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|node| self.token_kind(*node) == Some(kind))
            .collect()
    }

    /// First leaf under `id` that is not whitespace or a comment.
    pub fn first_token(&self, id: NodeId) -> Option<NodeId> {
        self.descendants(id).find(|node| {
            self.token_kind(*node)
                .map(|kind| !kind.is_trivia())
                .unwrap_or(false)
        })
    }
}

/// Iterator returned by [`Cst::descendants`].
pub struct Descendants<'a> {
    cst: &'a Cst,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.cst.children(node).iter().rev().copied());
        Some(node)
    }
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

/// Incremental arena builder.
///
/// The parser uses it to lower pest pairs; tests use it to build trees the
/// grammar itself would never produce. Leaves pushed through [`CstBuilder::token`]
/// append their text to the source in call order.
#[derive(Debug, Default)]
pub struct CstBuilder {
    text: String,
    nodes: Vec<CstNode>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing source text; spans passed to
    /// [`CstBuilder::leaf`] refer into it.
    pub fn with_source(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            nodes: Vec::new(),
        }
    }

    /// Adds a leaf covering `span` of the existing source text.
    pub fn leaf(&mut self, kind: TokenKind, span: Span) -> NodeId {
        self.push(CstNode::Leaf { kind, span })
    }

    /// Appends `text` to the source and adds a leaf covering it.
    pub fn token(&mut self, kind: TokenKind, text: &str) -> NodeId {
        let start = self.text.len();
        self.text.push_str(text);
        self.leaf(kind, Span::new(start, self.text.len()))
    }

    /// Adds a structural node over already-built children. Its span runs from
    /// the first child's start to the last child's end.
    pub fn branch(&mut self, rule: Rule, children: Vec<NodeId>) -> NodeId {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => Span::new(
                self.nodes[first.index()].span().start,
                self.nodes[last.index()].span().end,
            ),
            _ => Span::new(self.text.len(), self.text.len()),
        };
        self.branch_with_span(rule, children, span)
    }

    pub fn branch_with_span(&mut self, rule: Rule, children: Vec<NodeId>, span: Span) -> NodeId {
        self.push(CstNode::Branch {
            rule,
            children,
            span,
        })
    }

    /// Seals the arena with `root` as its entry point.
    pub fn finish(self, name: impl Into<String>, root: NodeId) -> Cst {
        Cst {
            name: name.into(),
            source: Arc::from(self.text),
            nodes: self.nodes,
            root,
        }
    }

    fn push(&mut self, node: CstNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

impl fmt::Display for Cst {
    /// Indented dump: one line per structural node, leaves shown with their
    /// kind and text. Whitespace leaves are omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match self.node(id) {
                CstNode::Branch { rule, children, .. } => {
                    writeln!(f, "{indent}{rule:?}")?;
                    for child in children.iter().rev() {
                        stack.push((*child, depth + 1));
                    }
                }
                CstNode::Leaf {
                    kind: TokenKind::Whitespace,
                    ..
                } => {}
                CstNode::Leaf { kind, .. } => {
                    writeln!(f, "{indent}{kind:?} {:?}", self.token_text(id))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> Cst {
        let mut b = CstBuilder::new();
        let open = b.token(TokenKind::Anonymous, "[");
        let ident = b.token(TokenKind::Identifier, "Cube");
        let close = b.token(TokenKind::Anonymous, "]");
        let name = b.branch(Rule::name, vec![open, ident, close]);
        let source = b.branch(Rule::cube_source, vec![name]);
        b.finish("test", source)
    }

    #[test]
    fn builder_spans_cover_children() {
        let cst = small_tree();
        assert_eq!(cst.span(cst.root()), Span::new(0, 6));
        assert_eq!(cst.source(), "[Cube]");
    }

    #[test]
    fn descendants_are_pre_order() {
        let cst = small_tree();
        let rules: Vec<_> = cst
            .descendants(cst.root())
            .filter_map(|id| cst.rule(id))
            .collect();
        assert_eq!(rules, vec![Rule::cube_source, Rule::name]);
    }

    #[test]
    fn tokens_of_kind() {
        let cst = small_tree();
        let idents = cst.tokens_of(cst.root(), TokenKind::Identifier);
        assert_eq!(idents.len(), 1);
        assert_eq!(cst.token_text(idents[0]), "Cube");
    }

    #[test]
    fn structural_children_skip_leaves() {
        let cst = small_tree();
        let name = cst.find_first(cst.root(), Rule::name).unwrap();
        assert_eq!(cst.structural_children(name).count(), 0);
        assert_eq!(cst.children(name).len(), 3);
    }
}
