//! # Selection Preview
//!
//! Computes the expression contributed by one node together with its
//! ancestors. The tree is pruned down to the chain of containers leading to
//! the selected node: every container keeps its shape (so brackets and
//! braces still show up) but only the branch on the path stays populated,
//! and sibling segments of each pipeline on the way are dropped.
//!
//! ```text
//! . | [.x, .y] | {k: .z}      select .x      →   [.x]
//! ```

use jqgen_ast::{Node, ObjectItems, Path, Pipeline, Selector};
use jqgen_compiler::compile_pipeline;

/// Build the ancestor-only tree for `path`
///
/// Returns `None` for the root path, or when `path` does not resolve.
/// A path that ends on a branch keeps that branch whole.
pub fn extract_ancestor_chain(root: &Pipeline, path: &Path) -> Option<Pipeline> {
    if path.is_empty() {
        return None;
    }
    prune_pipeline(root, path.selectors())
}

/// Compiled expression of the ancestor chain of `path`
pub fn selection_expression(root: &Pipeline, path: &Path) -> Option<String> {
    extract_ancestor_chain(root, path).map(|pruned| compile_pipeline(&pruned))
}

fn prune_pipeline(pipeline: &[Node], selectors: &[Selector]) -> Option<Pipeline> {
    let (first, rest) = selectors.split_first()?;
    let Selector::PipelineIndex(index) = first else {
        return None;
    };
    let node = pipeline.get(*index)?;

    if rest.is_empty() {
        return Some(vec![node.clone()]);
    }

    Some(vec![prune_node(node, rest)?])
}

fn prune_node(node: &Node, selectors: &[Selector]) -> Option<Node> {
    let (first, rest) = selectors.split_first()?;

    match (node, first) {
        (Node::Array { items }, Selector::ArrayBranch(branch)) => {
            let branch = prune_branch(items.get(*branch)?, rest)?;
            Some(Node::array(vec![branch]))
        }
        (Node::Object { items }, Selector::ObjectKey(key)) => {
            let branch = prune_branch(items.get(key)?, rest)?;
            let mut pruned = ObjectItems::new();
            pruned.insert(key.clone(), branch);
            Some(Node::Object { items: pruned })
        }
        _ => None,
    }
}

fn prune_branch(branch: &Pipeline, rest: &[Selector]) -> Option<Pipeline> {
    if rest.is_empty() {
        Some(branch.clone())
    } else {
        prune_pipeline(branch, rest)
    }
}

/// Single-node selection
///
/// Toggling the selected path again clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    selected: Option<Path>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `path`, or clear the selection if it is already selected
    ///
    /// Returns whether something is selected afterwards.
    pub fn toggle(&mut self, path: Path) -> bool {
        if self.selected.as_ref() == Some(&path) {
            self.selected = None;
            false
        } else {
            self.selected = Some(path);
            true
        }
    }

    /// Select `path` unconditionally
    pub fn select(&mut self, path: Path) {
        self.selected = Some(path);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn path(&self) -> Option<&Path> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selected.as_ref() == Some(path)
    }

    /// Preview expression of the selection, `None` when nothing is selected
    pub fn expression(&self, root: &Pipeline) -> Option<String> {
        selection_expression(root, self.selected.as_ref()?)
    }
}
