//! Set expressions: the tagged variants an axis or function parameter can be.

use serde::{Deserialize, Serialize};

use crate::syntax::{revert, Cst, NodeId};

/// A set-bearing subtree, classified by what it starts with.
///
/// Serialises as `{"type": "member" | "function" | "literal", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SetExpression {
    Member(Member),
    Function(Function),
    Literal(Literal),
}

impl SetExpression {
    /// CST node this expression was built from.
    pub fn origin(&self) -> NodeId {
        match self {
            SetExpression::Member(m) => m.origin,
            SetExpression::Function(f) => f.origin,
            SetExpression::Literal(l) => l.origin,
        }
    }

    /// Exact source text of the expression.
    pub fn source_text(&self, cst: &Cst) -> String {
        revert(cst, self.origin())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SetExpression::Member(_) => "member",
            SetExpression::Function(_) => "function",
            SetExpression::Literal(_) => "literal",
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            SetExpression::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            SetExpression::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            SetExpression::Literal(l) => Some(l),
            _ => None,
        }
    }
}

/// One element of one hierarchy of one dimension.
///
/// `origin` is a back-reference for reversion only; it takes no part in
/// equality and is not serialised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub dimension: String,
    pub hierarchy: String,
    pub element: String,
    /// Qualifier attached to the member, e.g. `Members` in `[D].[H].Members`.
    pub expression: Option<String>,
    #[serde(skip)]
    pub origin: NodeId,
}

impl Member {
    pub fn new(
        dimension: impl Into<String>,
        hierarchy: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        Self {
            dimension: dimension.into(),
            hierarchy: hierarchy.into(),
            element: element.into(),
            expression: None,
            origin: NodeId::default(),
        }
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.hierarchy == other.hierarchy
            && self.element == other.element
            && self.expression == other.expression
    }
}

/// A set function applied to nested set expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<SetExpression>,
    #[serde(skip)]
    pub origin: NodeId,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.parameters == other.parameters
    }
}

/// A scalar token that is not decomposed further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Literal {
    pub data: LiteralValue,
    #[serde(skip)]
    pub origin: NodeId,
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// Scalar payload of a [`Literal`]. Numbers keep their textual integer-ness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Number(serde_json::Number),
    String(String),
}

impl LiteralValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            LiteralValue::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => n.as_f64(),
            LiteralValue::String(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Number(_) => "number",
            LiteralValue::String(_) => "string",
        }
    }
}

/// Doubles closing brackets so a name can be re-emitted inside `[...]`.
pub(crate) fn escape(name: &str) -> String {
    name.replace(']', "]]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_serialises_with_null_expression() {
        let expr = SetExpression::Member(Member::new("D", "H", "E"));
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({
                "type": "member",
                "data": {"dimension": "D", "hierarchy": "H", "element": "E", "expression": null}
            })
        );
    }

    #[test]
    fn literal_keeps_integer_numbers() {
        let literal = SetExpression::Literal(Literal {
            data: LiteralValue::Number("2".parse().unwrap()),
            origin: NodeId(4),
        });
        assert_eq!(
            serde_json::to_value(&literal).unwrap(),
            json!({"type": "literal", "data": {"data": 2}})
        );
    }

    #[test]
    fn equality_ignores_origin() {
        let mut a = Member::new("D", "D", "E");
        let b = Member::new("D", "D", "E");
        a.origin = NodeId(17);
        assert_eq!(a, b);
    }
}
