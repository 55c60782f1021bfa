//! # Tree Mutations
//!
//! Structural edits on a jq tree, each addressed by a [`Path`].
//!
//! ## Semantics
//!
//! Every mutation either applies completely or leaves the tree untouched.
//! [`Mutation::apply`] reports why an edit did not fit the tree; the
//! document layer turns that into a silent no-op, since callers only issue
//! edits against the tree they last rendered.
//!
//! ### InsertSibling
//! - Node path: new node right after the referenced one (clamped to the
//!   end, so index 0 of an empty branch works)
//! - Array branch path: new one-node branch right after the referenced one
//! - Object key path: new one-node entry under a fresh key (the key in the
//!   path is ignored, object entries are not positional)
//! - Empty path: new node at the front of the root pipeline
//!
//! ### RemoveNode / RemoveBranch
//! - Later siblings shift down, no gaps remain
//! - Removing an object entry keeps the order of the other keys
//!
//! ### AddProperty
//! - Existing key: the branch is replaced in place (last write wins)

use jqgen_ast::path::{self, Path, Selector};
use jqgen_ast::{Node, NodeKind, ObjectItems, Pipeline};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Prefix for keys synthesized when inserting into an object
pub const DEFAULT_FRESH_KEY_PREFIX: &str = "newProperty";

/// Path-addressed structural edits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Overwrite the text of a filter node
    SetFilterValue { path: Path, value: String },

    /// Insert a default node of `kind` next to `path`
    InsertSibling { path: Path, kind: NodeKind },

    /// Append an empty branch to the array node at `path`
    AppendBranch { path: Path },

    /// Remove the node at `path` from its pipeline
    RemoveNode { path: Path },

    /// Remove a whole array branch or object entry
    RemoveBranch { path: Path },

    /// Add `key -> [""]` to the object node at `path`
    AddProperty { path: Path, key: String },

    /// Rename the object entry at `path`, keeping its position
    RenameProperty { path: Path, new_key: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Nothing found at {0}")]
    NodeNotFound(Path),

    #[error("Selector at the end of {0} does not fit its container")]
    PathMismatch(Path),

    #[error("Node at {0} is not a filter")]
    NotAFilter(Path),

    #[error("Node at {0} is not an array")]
    NotAnArray(Path),

    #[error("Node at {0} is not an object")]
    NotAnObject(Path),

    #[error("Property name must not be empty")]
    EmptyKey,

    #[error("Property already exists: {0}")]
    DuplicateKey(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl Mutation {
    /// Apply using the default fresh-key prefix
    pub fn apply(&self, root: &mut Pipeline) -> Result<(), MutationError> {
        self.apply_with_prefix(root, DEFAULT_FRESH_KEY_PREFIX)
    }

    /// Apply, naming synthesized object keys `{prefix}{n}`
    pub fn apply_with_prefix(
        &self,
        root: &mut Pipeline,
        fresh_key_prefix: &str,
    ) -> Result<(), MutationError> {
        match self {
            Mutation::SetFilterValue { path, value } => Self::apply_set_value(root, path, value),

            Mutation::InsertSibling { path, kind } => {
                Self::apply_insert(root, path, *kind, fresh_key_prefix)
            }

            Mutation::AppendBranch { path } => Self::apply_append_branch(root, path),

            Mutation::RemoveNode { path } => Self::apply_remove_node(root, path),

            Mutation::RemoveBranch { path } => Self::apply_remove_branch(root, path),

            Mutation::AddProperty { path, key } => Self::apply_add_property(root, path, key),

            Mutation::RenameProperty { path, new_key } => {
                Self::apply_rename_property(root, path, new_key)
            }
        }
    }

    /// Validate without touching `root`
    pub fn validate(&self, root: &Pipeline) -> Result<(), MutationError> {
        let mut scratch = root.clone();
        self.apply(&mut scratch)
    }

    /// Return the edited tree as a new value; `root` is left as it was
    ///
    /// An edit that does not fit yields an unchanged copy.
    pub fn applied_to(&self, root: &Pipeline) -> Pipeline {
        let mut next = root.clone();
        match self.apply(&mut next) {
            Ok(()) => next,
            Err(err) => {
                debug!(mutation = self.name(), error = %err, "Mutation ignored");
                root.clone()
            }
        }
    }

    /// Path the mutation is addressed to
    pub fn path(&self) -> &Path {
        match self {
            Mutation::SetFilterValue { path, .. }
            | Mutation::InsertSibling { path, .. }
            | Mutation::AppendBranch { path }
            | Mutation::RemoveNode { path }
            | Mutation::RemoveBranch { path }
            | Mutation::AddProperty { path, .. }
            | Mutation::RenameProperty { path, .. } => path,
        }
    }

    /// Where the node or branch at `selected` lives once this mutation has
    /// applied
    ///
    /// Returns `None` when the mutation removed or replaced it. Only
    /// meaningful for a mutation that did apply.
    pub fn rebase(&self, selected: &Path) -> Option<Path> {
        match self {
            Mutation::SetFilterValue { .. } | Mutation::AppendBranch { .. } => Some(selected.clone()),

            Mutation::InsertSibling { path: target, .. } => {
                let Some((parent, last)) = target.split_last() else {
                    // Front of the root: every top-level index moves up
                    return Some(shift_step(selected, &Path::root(), |step| match step {
                        Selector::PipelineIndex(i) => Some(Selector::PipelineIndex(i + 1)),
                        _ => None,
                    }));
                };
                Some(shift_step(selected, &parent, |step| match (last, step) {
                    (Selector::PipelineIndex(at), Selector::PipelineIndex(i)) if i > at => {
                        Some(Selector::PipelineIndex(i + 1))
                    }
                    (Selector::ArrayBranch(at), Selector::ArrayBranch(i)) if i > at => {
                        Some(Selector::ArrayBranch(i + 1))
                    }
                    _ => None,
                }))
            }

            Mutation::RemoveNode { path: target } | Mutation::RemoveBranch { path: target } => {
                let Some((parent, last)) = target.split_last() else {
                    return Some(selected.clone());
                };
                if target.is_prefix_of(selected) {
                    return None;
                }
                Some(shift_step(selected, &parent, |step| match (last, step) {
                    (Selector::PipelineIndex(at), Selector::PipelineIndex(i)) if i > at => {
                        Some(Selector::PipelineIndex(i - 1))
                    }
                    (Selector::ArrayBranch(at), Selector::ArrayBranch(i)) if i > at => {
                        Some(Selector::ArrayBranch(i - 1))
                    }
                    _ => None,
                }))
            }

            Mutation::AddProperty { path: target, key } => {
                // An existing entry under `key` is replaced wholesale
                if target.clone().key(key.clone()).is_prefix_of(selected) {
                    None
                } else {
                    Some(selected.clone())
                }
            }

            Mutation::RenameProperty { path: target, new_key } => {
                let Some((parent, _)) = target.split_last() else {
                    return Some(selected.clone());
                };
                if !target.is_prefix_of(selected) {
                    return Some(selected.clone());
                }
                Some(shift_step(selected, &parent, |_| {
                    Some(Selector::ObjectKey(new_key.clone()))
                }))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetFilterValue { .. } => "set_filter_value",
            Mutation::InsertSibling { .. } => "insert_sibling",
            Mutation::AppendBranch { .. } => "append_branch",
            Mutation::RemoveNode { .. } => "remove_node",
            Mutation::RemoveBranch { .. } => "remove_branch",
            Mutation::AddProperty { .. } => "add_property",
            Mutation::RenameProperty { .. } => "rename_property",
        }
    }

    fn apply_set_value(root: &mut Pipeline, node_path: &Path, value: &str) -> Result<(), MutationError> {
        match path::node_mut(root, node_path) {
            Some(Node::Filter { value: current }) => {
                *current = value.to_string();
                Ok(())
            }
            Some(_) => Err(MutationError::NotAFilter(node_path.clone())),
            None => Err(MutationError::NodeNotFound(node_path.clone())),
        }
    }

    fn apply_insert(
        root: &mut Pipeline,
        target: &Path,
        kind: NodeKind,
        fresh_key_prefix: &str,
    ) -> Result<(), MutationError> {
        let Some((parent, last)) = target.split_last() else {
            root.insert(0, kind.default_node());
            return Ok(());
        };

        match last {
            Selector::PipelineIndex(index) => {
                let pipeline = path::pipeline_mut(root, &parent)
                    .ok_or_else(|| MutationError::NodeNotFound(parent.clone()))?;
                let at = insertion_point(*index, pipeline.len());
                pipeline.insert(at, kind.default_node());
                Ok(())
            }

            Selector::ArrayBranch(branch) => match path::node_mut(root, &parent) {
                Some(Node::Array { items }) => {
                    let at = insertion_point(*branch, items.len());
                    items.insert(at, vec![kind.default_node()]);
                    Ok(())
                }
                Some(_) => Err(MutationError::NotAnArray(parent)),
                None => Err(MutationError::NodeNotFound(parent)),
            },

            Selector::ObjectKey(_) => match path::node_mut(root, &parent) {
                Some(Node::Object { items }) => {
                    let key = fresh_key(items, fresh_key_prefix);
                    debug!(key = %key, "Inserting object entry under fresh key");
                    items.insert(key, vec![kind.default_node()]);
                    Ok(())
                }
                Some(_) => Err(MutationError::NotAnObject(parent)),
                None => Err(MutationError::NodeNotFound(parent)),
            },
        }
    }

    fn apply_append_branch(root: &mut Pipeline, array_path: &Path) -> Result<(), MutationError> {
        match path::node_mut(root, array_path) {
            Some(Node::Array { items }) => {
                items.push(Vec::new());
                Ok(())
            }
            Some(_) => Err(MutationError::NotAnArray(array_path.clone())),
            None => Err(MutationError::NodeNotFound(array_path.clone())),
        }
    }

    fn apply_remove_node(root: &mut Pipeline, node_path: &Path) -> Result<(), MutationError> {
        let Some((parent, Selector::PipelineIndex(index))) = node_path.split_last() else {
            return Err(MutationError::InvalidStructure(format!(
                "{} does not address a node",
                node_path
            )));
        };

        let pipeline = path::pipeline_mut(root, &parent)
            .ok_or_else(|| MutationError::NodeNotFound(node_path.clone()))?;

        if *index >= pipeline.len() {
            return Err(MutationError::NodeNotFound(node_path.clone()));
        }

        pipeline.remove(*index);
        Ok(())
    }

    fn apply_remove_branch(root: &mut Pipeline, branch_path: &Path) -> Result<(), MutationError> {
        let Some((parent, last)) = branch_path.split_last() else {
            return Err(MutationError::InvalidStructure(
                "Cannot remove the root pipeline".to_string(),
            ));
        };

        match (path::node_mut(root, &parent), last) {
            (Some(Node::Array { items }), Selector::ArrayBranch(branch)) => {
                if *branch >= items.len() {
                    return Err(MutationError::NodeNotFound(branch_path.clone()));
                }
                items.remove(*branch);
                Ok(())
            }
            (Some(Node::Object { items }), Selector::ObjectKey(key)) => items
                .shift_remove(key)
                .map(|_| ())
                .ok_or_else(|| MutationError::NodeNotFound(branch_path.clone())),
            (Some(_), Selector::PipelineIndex(_)) => Err(MutationError::InvalidStructure(format!(
                "{} addresses a node, not a branch",
                branch_path
            ))),
            (Some(_), _) => Err(MutationError::PathMismatch(branch_path.clone())),
            (None, _) => Err(MutationError::NodeNotFound(parent)),
        }
    }

    fn apply_add_property(root: &mut Pipeline, object_path: &Path, key: &str) -> Result<(), MutationError> {
        if key.is_empty() {
            return Err(MutationError::EmptyKey);
        }

        match path::node_mut(root, object_path) {
            Some(Node::Object { items }) => {
                let previous = items.insert(key.to_string(), vec![Node::filter("")]);
                if previous.is_some() {
                    debug!(key = %key, "Property existed, branch replaced");
                }
                Ok(())
            }
            Some(_) => Err(MutationError::NotAnObject(object_path.clone())),
            None => Err(MutationError::NodeNotFound(object_path.clone())),
        }
    }

    fn apply_rename_property(root: &mut Pipeline, entry_path: &Path, new_key: &str) -> Result<(), MutationError> {
        let Some((parent, Selector::ObjectKey(old_key))) = entry_path.split_last() else {
            return Err(MutationError::InvalidStructure(format!(
                "{} does not address an object entry",
                entry_path
            )));
        };

        if new_key.is_empty() {
            return Err(MutationError::EmptyKey);
        }

        let items = match path::node_mut(root, &parent) {
            Some(Node::Object { items }) => items,
            Some(_) => return Err(MutationError::NotAnObject(parent)),
            None => return Err(MutationError::NodeNotFound(parent)),
        };

        if old_key == new_key {
            return if items.contains_key(old_key) {
                Ok(())
            } else {
                Err(MutationError::NodeNotFound(entry_path.clone()))
            };
        }

        if items.contains_key(new_key) {
            return Err(MutationError::DuplicateKey(new_key.to_string()));
        }

        let (position, _, branch) = items
            .shift_remove_full(old_key)
            .ok_or_else(|| MutationError::NodeNotFound(entry_path.clone()))?;
        items.shift_insert(position, new_key.to_string(), branch);
        Ok(())
    }
}

/// Replace the selector of `selected` sitting right below `parent`
///
/// Paths outside `parent` come back unchanged, as do steps `step` declines.
fn shift_step(
    selected: &Path,
    parent: &Path,
    step: impl Fn(&Selector) -> Option<Selector>,
) -> Path {
    let depth = parent.len();
    if selected.len() <= depth || !parent.is_prefix_of(selected) {
        return selected.clone();
    }

    let mut selectors = selected.selectors().to_vec();
    if let Some(moved) = step(&selectors[depth]) {
        selectors[depth] = moved;
    }
    Path::from(selectors)
}

/// Slot right after `index`, clamped to the end of the sequence
fn insertion_point(index: usize, len: usize) -> usize {
    index.saturating_add(1).min(len)
}

/// `{prefix}{count + 1}`, bumped past keys that are already taken
fn fresh_key(items: &ObjectItems, prefix: &str) -> String {
    let mut n = items.len() + 1;
    loop {
        let key = format!("{}{}", prefix, n);
        if !items.contains_key(&key) {
            return key;
        }
        n += 1;
    }
}

/// What happened to a mutation handed to a document
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The tree changed; carries the new document version
    Applied { version: u64 },

    /// The edit did not fit the tree and was dropped
    Ignored(MutationError),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }
}
