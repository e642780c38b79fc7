//! Members, tuples and tuple sets of the hierarchy-set algebra.

use crate::ast::set_expression::escape;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub dimension: String,
    pub hierarchy: String,
    pub element: String,
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
        }
    }

    /// `[dimension].[hierarchy].[element]`
    pub fn to_mdx(&self) -> String {
        format!(
            "{}.[{}]",
            hierarchy_name(&self.dimension, &self.hierarchy),
            escape(&self.element)
        )
    }
}

/// One coordinate: at most one member per dimension, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tuple {
    pub members: Vec<Member>,
}

impl Tuple {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn to_mdx(&self) -> String {
        let members: Vec<String> = self.members.iter().map(Member::to_mdx).collect();
        format!("({})", members.join(","))
    }
}

/// Ordered tuples, labelled with the dimension and hierarchy of the first
/// tuple's first member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuplesSet {
    pub dimension: String,
    pub hierarchy: String,
    pub tuples: Vec<Tuple>,
}

impl TuplesSet {
    /// `None` when there is no first member to take the labels from.
    pub fn from_tuples(tuples: Vec<Tuple>) -> Option<Self> {
        let first = tuples.first()?.members.first()?;
        Some(Self {
            dimension: first.dimension.clone(),
            hierarchy: first.hierarchy.clone(),
            tuples,
        })
    }

    pub fn to_mdx(&self) -> String {
        let tuples: Vec<String> = self.tuples.iter().map(Tuple::to_mdx).collect();
        format!("{{{}}}", tuples.join(","))
    }
}

/// `[dimension].[hierarchy]`
pub(crate) fn hierarchy_name(dimension: &str, hierarchy: &str) -> String {
    format!("[{}].[{}]", escape(dimension), escape(hierarchy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuples_set_takes_labels_from_first_member() {
        let set = TuplesSet::from_tuples(vec![
            Tuple::new(vec![Member::new("A", "H", "1"), Member::new("B", "B", "2")]),
            Tuple::new(vec![Member::new("A", "H", "3")]),
        ])
        .unwrap();
        assert_eq!(set.dimension, "A");
        assert_eq!(set.hierarchy, "H");
    }

    #[test]
    fn empty_tuples_set_has_no_labels() {
        assert!(TuplesSet::from_tuples(vec![]).is_none());
        assert!(TuplesSet::from_tuples(vec![Tuple::empty()]).is_none());
    }

    #[test]
    fn renders_mdx() {
        let tuple = Tuple::new(vec![Member::new("A", "A", "x]y"), Member::new("B", "C", "z")]);
        assert_eq!(tuple.to_mdx(), "([A].[A].[x]]y],[B].[C].[z])");
    }
}
