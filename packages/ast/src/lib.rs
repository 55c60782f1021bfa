//! # jqgen AST
//!
//! Structural model of a jq expression under construction.
//!
//! A document is a [`Pipeline`] of [`Node`]s. Array and object nodes hold
//! further pipelines ("branches"), so the tree alternates between pipelines
//! and nodes all the way down. [`Path`] addresses any node or branch in it.

pub mod node;
pub mod path;

pub use node::{pipeline_node_count, Node, NodeKind, ObjectItems, Pipeline};
pub use path::{resolve, resolve_mut, Path, Selector, Target, TargetMut};
