#![forbid(unsafe_code)]

//! Shared hierarchy model for linked node-link and treemap views.
//!
//! A [`HierarchyTree`] is built once per dataset from a nested JSON record. Nodes live in an
//! arena and are addressed by [`NodeId`]; parent/child links are indices, never references.
//! Expand/collapse only moves ids between a node's `children` and `hidden_children`, so the
//! data (names, aggregate values, depths) is fixed for the lifetime of the tree.

pub mod collapse;
pub mod error;
pub mod record;
pub mod tree;

pub use collapse::Toggle;
pub use error::{Error, Result};
pub use record::{FieldAccessor, ValueAccessor, field};
pub use tree::{HierarchyTree, NodeId, RenderKey, TreeNode, compare_names};
