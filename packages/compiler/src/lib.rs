//! # jqgen Compiler
//!
//! Turns a jq tree into expression text. Compilation is pure: the same tree
//! always yields byte-identical output and nothing outside the tree is
//! consulted. Empty segments are elided at every level, so an array or
//! object whose branches are all empty contributes nothing to its parent.

mod compiler;
mod options;

pub use compiler::{compile_node, compile_node_with, compile_pipeline, compile_pipeline_with};
pub use options::CompileOptions;
