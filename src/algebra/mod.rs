//! Hierarchy-set algebra and the semantic transformer that builds it.
//!
//! The transformer is a second, independent pass over the CST. It produces a
//! [`StatementBuilder`] whose operands are type-checked as they are built; the
//! builder can render itself back to MDX.

pub mod hierarchy_set;
pub mod member;
pub mod statement;
pub mod transform;

pub use hierarchy_set::{HierarchySet, MdxSet, OrderDirection};
pub use member::{Member, Tuple, TuplesSet};
pub use statement::{AxisSelection, StatementBuilder};
pub use transform::{transform, Transformer};
