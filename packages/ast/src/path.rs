//! # Path Algebra
//!
//! Addresses into a jq tree. A path is plain data: it holds no references,
//! so every lookup re-resolves from the root and a path computed before a
//! mutation may point somewhere else (or nowhere) afterwards.
//!
//! ```text
//! [PipelineIndex(0), ArrayBranch(1), PipelineIndex(2)]
//!   root[0] → array branch 1 → node 2 of that branch
//! ```
//!
//! Node paths alternate `PipelineIndex` with a branch selector
//! (`ArrayBranch` or `ObjectKey`). A path that ends on a branch selector
//! addresses the branch pipeline itself; the empty path addresses the root.

use crate::node::{Node, Pipeline};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selector {
    /// Position of a node inside a pipeline
    PipelineIndex(usize),
    /// Branch of an array node
    ArrayBranch(usize),
    /// Entry of an object node
    ObjectKey(String),
}

impl Selector {
    /// Whether this selector descends into a container's items
    pub fn is_branch(&self) -> bool {
        !matches!(self, Selector::PipelineIndex(_))
    }
}

/// Address of a node or pipeline in the tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Selector>);

impl Path {
    /// The empty path, addressing the root pipeline
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path to a top-level node
    pub fn node(index: usize) -> Self {
        Self(vec![Selector::PipelineIndex(index)])
    }

    /// Descend into array branch `branch`
    pub fn branch(mut self, branch: usize) -> Self {
        self.0.push(Selector::ArrayBranch(branch));
        self
    }

    /// Descend into object entry `key`
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Selector::ObjectKey(key.into()));
        self
    }

    /// Select node `index` of the current pipeline
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Selector::PipelineIndex(index));
        self
    }

    pub fn push(&mut self, selector: Selector) {
        self.0.push(selector);
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Selector> {
        self.0.last()
    }

    /// Split into the container path and the terminal selector
    pub fn split_last(&self) -> Option<(Path, &Selector)> {
        let (last, parent) = self.0.split_last()?;
        Some((Path(parent.to_vec()), last))
    }

    pub fn parent(&self) -> Option<Path> {
        self.split_last().map(|(parent, _)| parent)
    }

    /// Whether the path ends on a node rather than on a pipeline
    pub fn is_node_path(&self) -> bool {
        matches!(self.last(), Some(Selector::PipelineIndex(_)))
    }

    /// Whether `self` is `other` or one of its ancestors
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<Selector>> for Path {
    fn from(selectors: Vec<Selector>) -> Self {
        Self(selectors)
    }
}

impl FromIterator<Selector> for Path {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }

        for (i, selector) in self.0.iter().enumerate() {
            match selector {
                Selector::PipelineIndex(index) if i == 0 => write!(f, "{}", index)?,
                Selector::PipelineIndex(index) => write!(f, ".{}", index)?,
                Selector::ArrayBranch(branch) => write!(f, ".items[{}]", branch)?,
                Selector::ObjectKey(key) => write!(f, ".items[{:?}]", key)?,
            }
        }
        Ok(())
    }
}

/// What a path resolved to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target<'a> {
    Node(&'a Node),
    Pipeline(&'a Pipeline),
}

/// Mutable counterpart of [`Target`]
#[derive(Debug)]
pub enum TargetMut<'a> {
    Node(&'a mut Node),
    Pipeline(&'a mut Pipeline),
}

/// Walk `path` from `root`
///
/// Returns `None` when an index is out of range, a key is missing, or a
/// selector does not fit the container it is applied to.
pub fn resolve<'a>(root: &'a Pipeline, path: &Path) -> Option<Target<'a>> {
    let mut target = Target::Pipeline(root);

    for selector in path.selectors() {
        target = match (target, selector) {
            (Target::Pipeline(pipeline), Selector::PipelineIndex(index)) => {
                Target::Node(pipeline.get(*index)?)
            }
            (Target::Node(Node::Array { items }), Selector::ArrayBranch(branch)) => {
                Target::Pipeline(items.get(*branch)?)
            }
            (Target::Node(Node::Object { items }), Selector::ObjectKey(key)) => {
                Target::Pipeline(items.get(key)?)
            }
            _ => return None,
        };
    }

    Some(target)
}

/// Walk `path` from `root` with mutable access
pub fn resolve_mut<'a>(root: &'a mut Pipeline, path: &Path) -> Option<TargetMut<'a>> {
    let mut target = TargetMut::Pipeline(root);

    for selector in path.selectors() {
        target = match (target, selector) {
            (TargetMut::Pipeline(pipeline), Selector::PipelineIndex(index)) => {
                TargetMut::Node(pipeline.get_mut(*index)?)
            }
            (TargetMut::Node(Node::Array { items }), Selector::ArrayBranch(branch)) => {
                TargetMut::Pipeline(items.get_mut(*branch)?)
            }
            (TargetMut::Node(Node::Object { items }), Selector::ObjectKey(key)) => {
                TargetMut::Pipeline(items.get_mut(key)?)
            }
            _ => return None,
        };
    }

    Some(target)
}

pub fn node<'a>(root: &'a Pipeline, path: &Path) -> Option<&'a Node> {
    match resolve(root, path)? {
        Target::Node(node) => Some(node),
        Target::Pipeline(_) => None,
    }
}

pub fn node_mut<'a>(root: &'a mut Pipeline, path: &Path) -> Option<&'a mut Node> {
    match resolve_mut(root, path)? {
        TargetMut::Node(node) => Some(node),
        TargetMut::Pipeline(_) => None,
    }
}

pub fn pipeline<'a>(root: &'a Pipeline, path: &Path) -> Option<&'a Pipeline> {
    match resolve(root, path)? {
        Target::Pipeline(pipeline) => Some(pipeline),
        Target::Node(_) => None,
    }
}

pub fn pipeline_mut<'a>(root: &'a mut Pipeline, path: &Path) -> Option<&'a mut Pipeline> {
    match resolve_mut(root, path)? {
        TargetMut::Pipeline(pipeline) => Some(pipeline),
        TargetMut::Node(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pipeline {
        vec![
            Node::filter("."),
            Node::array(vec![vec![Node::filter(".a")], vec![]]),
            Node::object([("k", vec![Node::filter(".k"), Node::filter("length")])]),
        ]
    }

    #[test]
    fn test_resolve_nodes_and_branches() {
        let root = sample();

        assert_eq!(node(&root, &Path::node(0)), Some(&Node::filter(".")));
        assert_eq!(
            node(&root, &Path::node(1).branch(0).index(0)),
            Some(&Node::filter(".a"))
        );
        assert_eq!(
            node(&root, &Path::node(2).key("k").index(1)),
            Some(&Node::filter("length"))
        );

        let branch = pipeline(&root, &Path::node(1).branch(1)).unwrap();
        assert!(branch.is_empty());

        assert!(matches!(resolve(&root, &Path::root()), Some(Target::Pipeline(p)) if p.len() == 3));
    }

    #[test]
    fn test_resolve_rejects_mismatched_selectors() {
        let root = sample();

        // Key into an array
        assert!(resolve(&root, &Path::node(1).key("a")).is_none());
        // Branch index into an object
        assert!(resolve(&root, &Path::node(2).branch(0)).is_none());
        // Descend into a filter
        assert!(resolve(&root, &Path::node(0).branch(0)).is_none());
        // Out of range
        assert!(resolve(&root, &Path::node(7)).is_none());
        assert!(resolve(&root, &Path::node(1).branch(5)).is_none());
        // Missing key
        assert!(resolve(&root, &Path::node(2).key("missing")).is_none());
        // Branch selector straight on a pipeline
        assert!(resolve(&root, &Path::root().branch(0)).is_none());
    }

    #[test]
    fn test_resolve_mut_edits_in_place() {
        let mut root = sample();

        if let Some(Node::Filter { value }) = node_mut(&mut root, &Path::node(1).branch(0).index(0)) {
            *value = ".b".to_string();
        }
        pipeline_mut(&mut root, &Path::node(1).branch(1))
            .unwrap()
            .push(Node::filter(".c"));

        assert_eq!(
            node(&root, &Path::node(1).branch(0).index(0)),
            Some(&Node::filter(".b"))
        );
        assert_eq!(
            node(&root, &Path::node(1).branch(1).index(0)),
            Some(&Node::filter(".c"))
        );
    }

    #[test]
    fn test_split_last() {
        let path = Path::node(3).key("name").index(1);
        let (parent, last) = path.split_last().unwrap();

        assert_eq!(parent, Path::node(3).key("name"));
        assert_eq!(last, &Selector::PipelineIndex(1));
        assert!(path.is_node_path());
        assert!(!parent.is_node_path());
        assert!(Path::root().split_last().is_none());
        assert!(parent.is_prefix_of(&path));
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::root().to_string(), "<root>");
        assert_eq!(Path::node(0).branch(1).index(2).to_string(), "0.items[1].2");
        assert_eq!(Path::node(0).key("k").index(0).to_string(), "0.items[\"k\"].0");
    }

    #[test]
    fn test_path_serializes_as_selector_list() {
        let path = Path::node(0).key("k").index(1);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "pipelineIndex": 0 }, { "objectKey": "k" }, { "pipelineIndex": 1 }])
        );
    }
}
