//! Text reversion: rebuilds the exact source text matched by a CST subtree.

use super::cst::{Cst, CstNode, NodeId};

/// Concatenates the text of every leaf under `node`, in document order.
///
/// Because leaves tile the parsed input, the result is byte-for-byte the
/// substring the grammar matched, whitespace and comments included.
pub fn revert(cst: &Cst, node: NodeId) -> String {
    match cst.node(node) {
        CstNode::Leaf { .. } => cst.token_text(node).to_string(),
        CstNode::Branch { children, .. } => children
            .iter()
            .map(|child| revert(cst, *child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, Rule};

    #[test]
    fn subtree_matches_source_slice() {
        let text = "SELECT { TM1FILTERBYPATTERN( {[A].[A].Members} , \"x*\" ) } ON 0 FROM [C]";
        let cst = parse(text, "test").unwrap();
        for id in cst.descendants(cst.root()) {
            let span = cst.span(id);
            assert_eq!(revert(&cst, id), &text[span.start..span.end]);
        }
    }

    #[test]
    fn member_reverts_without_surrounding_layout() {
        let cst = parse("SELECT {  [D] . [E]  } ON 0 FROM [C]", "test").unwrap();
        let member = cst.find_first(cst.root(), Rule::member).unwrap();
        assert_eq!(revert(&cst, member), "[D] . [E]");
    }
}
