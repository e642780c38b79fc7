//! MDX Parser - grammar-driven CST provider
//!
//! Turns query text into a [`Cst`]. The pest parse tree is lowered into the
//! arena so that text the grammar matches inline (keywords, punctuation,
//! whitespace) becomes explicit leaves and every subtree can be reverted to
//! its exact source.

use pest::error::{Error, InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::{debug, trace};

use super::cst::{Cst, CstBuilder, NodeId, Span, TokenKind};
use crate::diagnostics::{to_error_source, ErrorContext, MdxError};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct MdxParser;

const MAX_TOKEN_PREVIEW: usize = 32;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse MDX text into a concrete syntax tree.
///
/// `name` labels the source in diagnostics (a file name, or `"query"`).
pub fn parse(text: &str, name: &str) -> Result<Cst, MdxError> {
    let mut pairs =
        MdxParser::parse(Rule::mdx, text).map_err(|e| convert_parse_error(e, text, name))?;

    let Some(root) = pairs.next() else {
        return Err(internal_error("parser produced no root node", text, name));
    };

    let mut lowering = Lowering {
        builder: CstBuilder::with_source(text),
        input: text,
    };
    let root_id = lowering.lower(root);
    let cst = lowering.builder.finish(name, root_id);

    let statements = cst.structural_children(cst.root()).count();
    if statements != 1 {
        return Err(internal_error(
            &format!("root node has {statements} statement children, expected 1"),
            text,
            name,
        ));
    }

    debug!(nodes = cst.len(), source = name, "parsed MDX statement");
    Ok(cst)
}

// ============================================================================
// LOWERING
// ============================================================================

struct Lowering<'i> {
    builder: CstBuilder,
    input: &'i str,
}

impl<'i> Lowering<'i> {
    fn lower(&mut self, pair: Pair<'i, Rule>) -> NodeId {
        let rule = pair.as_rule();
        let span = get_span(&pair);

        if let Some(kind) = TokenKind::from_rule(rule) {
            return self.builder.leaf(kind, span);
        }

        let mut children = Vec::new();
        let mut cursor = span.start;
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::EOI {
                continue;
            }
            let inner_span = get_span(&inner);
            self.gap(cursor, inner_span.start, &mut children);
            children.push(self.lower(inner));
            cursor = inner_span.end;
        }
        self.gap(cursor, span.end, &mut children);

        trace!(?rule, start = span.start, end = span.end, "lowered node");
        self.builder.branch_with_span(rule, children, span)
    }

    /// Splits text matched inline by a rule into anonymous leaves: runs of
    /// whitespace, runs of word characters, and single punctuation marks.
    fn gap(&mut self, start: usize, end: usize, children: &mut Vec<NodeId>) {
        let text = &self.input[start..end];
        let mut chars = text.char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            let class = CharClass::of(c);
            let mut stop = offset + c.len_utf8();
            if class != CharClass::Punct {
                while let Some(&(next, d)) = chars.peek() {
                    if CharClass::of(d) != class {
                        break;
                    }
                    stop = next + d.len_utf8();
                    chars.next();
                }
            }
            let kind = match class {
                CharClass::Space => TokenKind::Whitespace,
                CharClass::Word | CharClass::Punct => TokenKind::Anonymous,
            };
            children.push(
                self.builder
                    .leaf(kind, Span::new(start + offset, start + stop)),
            );
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CharClass {
    Space,
    Word,
    Punct,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            CharClass::Space
        } else if c.is_alphanumeric() || c == '_' {
            CharClass::Word
        } else {
            CharClass::Punct
        }
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

/// Text at `pos` up to the next whitespace, for error messages.
fn offending_token(text: &str, pos: usize) -> String {
    let rest = text.get(pos..).unwrap_or("");
    let token: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace())
        .take(MAX_TOKEN_PREVIEW)
        .collect();
    if token.is_empty() {
        rest.chars()
            .next()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "<end of input>".to_string())
    } else {
        token
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, text: &str, name: &str) -> MdxError {
    let pos = match error.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    let (line, column) = match error.line_col {
        LineColLocation::Pos(lc) => lc,
        LineColLocation::Span(lc, _) => lc,
    };
    let token = offending_token(text, pos);
    let end = (pos + token.len()).min(text.len());
    debug!(line, column, %token, "syntax error");

    MdxError::Syntax {
        ctx: ErrorContext::with_source_and_span(to_error_source(name, text), Span::new(pos, end))
            .with_help(error.variant.message().into_owned()),
        token,
        line,
        column,
        raw_text: text.to_string(),
    }
}

fn internal_error(cause: &str, text: &str, name: &str) -> MdxError {
    MdxError::InternalParser {
        cause: cause.to_string(),
        raw_text: text.to_string(),
        ctx: ErrorContext {
            source: Some(to_error_source(name, text)),
            span: None,
            help: Some(
                "Copy the query and this message into an issue if the MDX is valid.".to_string(),
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;
    use crate::syntax::revert;

    const QUERY: &str = "SELECT {[A].[A].Members} ON COLUMNS FROM [Cube]";

    #[test]
    fn root_reverts_to_input() {
        let cst = parse(QUERY, "test").unwrap();
        assert_eq!(revert(&cst, cst.root()), QUERY);
    }

    #[test]
    fn surrounding_whitespace_is_kept() {
        let text = "\n  SELECT {[A].[A].Members} ON 0 FROM [Cube]  \n";
        let cst = parse(text, "test").unwrap();
        assert_eq!(revert(&cst, cst.root()), text);
    }

    #[test]
    fn root_has_single_statement_child() {
        let cst = parse(QUERY, "test").unwrap();
        let children: Vec<_> = cst.structural_children(cst.root()).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(cst.rule(children[0]), Some(Rule::query_statement));
    }

    #[test]
    fn identifiers_are_leaves() {
        let cst = parse(QUERY, "test").unwrap();
        let texts: Vec<_> = cst
            .tokens_of(cst.root(), TokenKind::Identifier)
            .into_iter()
            .map(|id| cst.token_text(id).to_string())
            .collect();
        assert_eq!(texts, vec!["A", "A", "Cube"]);
    }

    #[test]
    fn comments_are_preserved() {
        let text = "SELECT {[A].[B]} ON 0 -- axis\nFROM [Cube]";
        let cst = parse(text, "test").unwrap();
        assert_eq!(cst.tokens_of(cst.root(), TokenKind::Comment).len(), 1);
        assert_eq!(revert(&cst, cst.root()), text);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert!(parse("select {[A].[B]} on columns from [Cube]", "test").is_ok());
    }

    #[test]
    fn qualifier_keywords_need_a_word_boundary() {
        let cst = parse("SELECT {[A].[A].[x].ChildrenCount} ON 0 FROM [Cube]", "test").unwrap();
        assert_eq!(cst.find_all(cst.root(), Rule::member_qualifier).len(), 1);
        assert!(cst.find_all(cst.root(), Rule::children).is_empty());

        let cst = parse("SELECT {[A].[A].Children} ON 0 FROM [Cube]", "test").unwrap();
        assert_eq!(cst.find_all(cst.root(), Rule::children).len(), 1);
    }

    #[test]
    fn malformed_input_is_a_syntax_error() {
        let err = parse("SELECT {[A].[B] ON COLUMNS FROM [Cube]", "test").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Syntax);
        match err {
            MdxError::Syntax {
                line, raw_text, ..
            } => {
                assert_eq!(line, 1);
                assert!(raw_text.starts_with("SELECT"));
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_input_reports_end_of_input() {
        let err = parse("SELECT {[A].[B]} ON COLUMNS FROM", "test").unwrap_err();
        match err {
            MdxError::Syntax { token, .. } => assert_eq!(token, "<end of input>"),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn offending_token_stops_at_whitespace() {
        assert_eq!(offending_token("ab cd", 0), "ab");
        assert_eq!(offending_token("ab cd", 2), " ");
        assert_eq!(offending_token("ab", 2), "<end of input>");
    }
}
