//! Hierarchy-set operators and their MDX rendering.

use std::fmt;

use super::member::{hierarchy_name, Member, Tuple, TuplesSet};

/// Any set an operator accepts: a named operator or a literal tuple list.
#[derive(Debug, Clone, PartialEq)]
pub enum MdxSet {
    Hierarchy(HierarchySet),
    Tuples(TuplesSet),
}

impl MdxSet {
    pub fn to_mdx(&self) -> String {
        match self {
            MdxSet::Hierarchy(set) => set.to_mdx(),
            MdxSet::Tuples(set) => set.to_mdx(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MdxSet::Hierarchy(_) => "hierarchy set",
            MdxSet::Tuples(_) => "tuples set",
        }
    }
}

impl From<HierarchySet> for MdxSet {
    fn from(set: HierarchySet) -> Self {
        MdxSet::Hierarchy(set)
    }
}

impl From<TuplesSet> for MdxSet {
    fn from(set: TuplesSet) -> Self {
        MdxSet::Tuples(set)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
    BAsc,
    BDesc,
}

impl OrderDirection {
    /// Case-insensitive keyword lookup.
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "ASC" => Some(OrderDirection::Asc),
            "DESC" => Some(OrderDirection::Desc),
            "BASC" => Some(OrderDirection::BAsc),
            "BDESC" => Some(OrderDirection::BDesc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
            OrderDirection::BAsc => "BASC",
            OrderDirection::BDesc => "BDESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HierarchySet {
    AllMembers {
        dimension: String,
        hierarchy: String,
    },
    Children {
        member: Member,
    },
    Descendants {
        set: Box<MdxSet>,
    },
    DefaultMember {
        dimension: String,
        hierarchy: String,
    },
    /// Positional: `start` first.
    Range {
        start: Member,
        end: Member,
    },
    Union {
        left: Box<MdxSet>,
        right: Box<MdxSet>,
        allow_duplicates: bool,
    },
    Except {
        left: Box<MdxSet>,
        right: Box<MdxSet>,
    },
    FilterByPattern {
        set: Box<HierarchySet>,
        pattern: String,
    },
    FilterByLevel {
        set: Box<HierarchySet>,
        level: i64,
    },
    /// `other: None` drills every member (`ALL`).
    DrillDown {
        set: Box<MdxSet>,
        other: Option<Box<MdxSet>>,
        recursive: bool,
    },
    SubsetToSet {
        dimension: String,
        hierarchy: String,
        subset: String,
    },
    SubsetAll {
        dimension: String,
        hierarchy: String,
    },
    OrderByCellValue {
        set: Box<MdxSet>,
        cube: String,
        tuple: Tuple,
        order: OrderDirection,
    },
}

impl HierarchySet {
    pub fn to_mdx(&self) -> String {
        match self {
            HierarchySet::AllMembers {
                dimension,
                hierarchy,
            } => format!("{{{}.MEMBERS}}", hierarchy_name(dimension, hierarchy)),
            HierarchySet::Children { member } => format!("{{{}.CHILDREN}}", member.to_mdx()),
            HierarchySet::Descendants { set } => format!("{{DESCENDANTS({})}}", set.to_mdx()),
            HierarchySet::DefaultMember {
                dimension,
                hierarchy,
            } => format!("{{{}.DEFAULTMEMBER}}", hierarchy_name(dimension, hierarchy)),
            HierarchySet::Range { start, end } => {
                format!("{{{}:{}}}", start.to_mdx(), end.to_mdx())
            }
            // Braced concatenation keeps duplicates; UNION drops them.
            HierarchySet::Union {
                left,
                right,
                allow_duplicates: true,
            } => format!("{{{},{}}}", left.to_mdx(), right.to_mdx()),
            HierarchySet::Union { left, right, .. } => {
                format!("{{UNION({},{})}}", left.to_mdx(), right.to_mdx())
            }
            HierarchySet::Except { left, right } => {
                format!("{{EXCEPT({},{})}}", left.to_mdx(), right.to_mdx())
            }
            HierarchySet::FilterByPattern { set, pattern } => format!(
                "{{TM1FILTERBYPATTERN({},{})}}",
                set.to_mdx(),
                quote(pattern)
            ),
            HierarchySet::FilterByLevel { set, level } => {
                format!("{{TM1FILTERBYLEVEL({},{level})}}", set.to_mdx())
            }
            HierarchySet::DrillDown {
                set,
                other,
                recursive,
            } => format!(
                "{{TM1DRILLDOWNMEMBER({},{}{})}}",
                set.to_mdx(),
                other
                    .as_ref()
                    .map(|o| o.to_mdx())
                    .unwrap_or_else(|| "ALL".to_string()),
                if *recursive { ",RECURSIVE" } else { "" }
            ),
            HierarchySet::SubsetToSet {
                dimension,
                hierarchy,
                subset,
            } => format!(
                "{{TM1SUBSETTOSET({},{})}}",
                hierarchy_name(dimension, hierarchy),
                quote(subset)
            ),
            HierarchySet::SubsetAll {
                dimension,
                hierarchy,
            } => format!("{{TM1SUBSETALL({})}}", hierarchy_name(dimension, hierarchy)),
            HierarchySet::OrderByCellValue {
                set,
                cube,
                tuple,
                order,
            } => format!(
                "{{ORDER({},[{}].{},{})}}",
                set.to_mdx(),
                cube.replace(']', "]]"),
                tuple.to_mdx(),
                order.as_str()
            ),
        }
    }
}

impl fmt::Display for HierarchySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mdx())
    }
}

/// Single-quoted MDX string literal.
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(dimension: &str) -> HierarchySet {
        HierarchySet::AllMembers {
            dimension: dimension.into(),
            hierarchy: dimension.into(),
        }
    }

    #[test]
    fn renders_pattern_filter() {
        let set = HierarchySet::FilterByPattern {
            set: Box::new(all("Region")),
            pattern: "It's*".into(),
        };
        assert_eq!(
            set.to_mdx(),
            "{TM1FILTERBYPATTERN({[Region].[Region].MEMBERS},'It''s*')}"
        );
    }

    #[test]
    fn renders_drill_down_all() {
        let set = HierarchySet::DrillDown {
            set: Box::new(all("A").into()),
            other: None,
            recursive: true,
        };
        assert_eq!(
            set.to_mdx(),
            "{TM1DRILLDOWNMEMBER({[A].[A].MEMBERS},ALL,RECURSIVE)}"
        );
    }

    #[test]
    fn renders_order() {
        let set = HierarchySet::OrderByCellValue {
            set: Box::new(all("A").into()),
            cube: "Sales".into(),
            tuple: Tuple::new(vec![Member::new("M", "M", "Value")]),
            order: OrderDirection::default(),
        };
        assert_eq!(
            set.to_mdx(),
            "{ORDER({[A].[A].MEMBERS},[Sales].([M].[M].[Value]),ASC)}"
        );
    }

    #[test]
    fn union_with_duplicates_renders_as_list() {
        let set = HierarchySet::Union {
            left: Box::new(all("A").into()),
            right: Box::new(all("B").into()),
            allow_duplicates: true,
        };
        assert_eq!(set.to_mdx(), "{{[A].[A].MEMBERS},{[B].[B].MEMBERS}}");
    }

    #[test]
    fn order_direction_is_case_insensitive() {
        assert_eq!(OrderDirection::parse("bdesc"), Some(OrderDirection::BDesc));
        assert_eq!(OrderDirection::parse("up"), None);
    }
}
