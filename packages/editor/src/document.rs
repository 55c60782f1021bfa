//! # Document Handle
//!
//! The one live jq tree of an editing session.
//!
//! A Document owns its root pipeline and a version counter. The version
//! moves forward on every accepted change, so callers can tell whether the
//! compiled expression they hold is still current.
//!
//! ## Lifecycle
//!
//! ```text
//! Create → Edit → Compile → (Evaluate)
//!   ↓       ↓        ↓          ↓
//! Root  Mutations   jq text   sandbox
//! ```

use crate::mutations::{Mutation, MutationError, MutationOutcome, DEFAULT_FRESH_KEY_PREFIX};
use crate::EditorError;
use jqgen_ast::{path, Node, Path, Pipeline, Target};
use jqgen_compiler::{compile_node, compile_pipeline};
use tracing::debug;

/// Editable jq tree
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Current version number (increments on each applied change)
    pub version: u64,

    root: Pipeline,

    fresh_key_prefix: String,
}

impl Document {
    /// Document holding a single identity filter (`.`)
    pub fn new() -> Self {
        Self::from_root(vec![Node::filter(".")])
    }

    /// Document with an empty root pipeline
    pub fn empty() -> Self {
        Self::from_root(Vec::new())
    }

    pub fn from_root(root: Pipeline) -> Self {
        Self {
            version: 0,
            root,
            fresh_key_prefix: DEFAULT_FRESH_KEY_PREFIX.to_string(),
        }
    }

    /// Load a tree exchanged as JSON
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let root: Pipeline = serde_json::from_str(json)?;
        Ok(Self::from_root(root))
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn with_fresh_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fresh_key_prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Pipeline {
        &self.root
    }

    pub fn resolve(&self, path: &Path) -> Option<Target<'_>> {
        path::resolve(&self.root, path)
    }

    pub fn node(&self, path: &Path) -> Option<&Node> {
        path::node(&self.root, path)
    }

    /// Apply a mutation; edits that do not fit the tree are dropped
    pub fn apply(&mut self, mutation: &Mutation) -> MutationOutcome {
        match self.try_apply(mutation) {
            Ok(version) => MutationOutcome::Applied { version },
            Err(err) => {
                debug!(
                    mutation = mutation.name(),
                    path = %mutation.path(),
                    error = %err,
                    "Mutation ignored"
                );
                MutationOutcome::Ignored(err)
            }
        }
    }

    /// Apply a mutation, reporting why it did not fit
    pub fn try_apply(&mut self, mutation: &Mutation) -> Result<u64, MutationError> {
        mutation.apply_with_prefix(&mut self.root, &self.fresh_key_prefix)?;
        self.version += 1;
        Ok(self.version)
    }

    /// Swap in a whole tree (undo), returning the previous one
    pub fn restore(&mut self, root: Pipeline) -> Pipeline {
        self.version += 1;
        std::mem::replace(&mut self.root, root)
    }

    /// Compiled expression of the whole tree
    pub fn expression(&self) -> String {
        compile_pipeline(&self.root)
    }

    /// Compiled text of the single node at `path`, as shown beside it
    pub fn node_expression(&self, path: &Path) -> Option<String> {
        self.node(path).map(compile_node)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jqgen_ast::NodeKind;

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.version, 0);
        assert_eq!(doc.root(), &vec![Node::filter(".")]);
        assert_eq!(doc.expression(), ".");
    }

    #[test]
    fn test_version_only_moves_on_applied_mutations() {
        let mut doc = Document::new();

        let ignored = doc.apply(&Mutation::RemoveNode { path: Path::node(3) });
        assert!(!ignored.is_applied());
        assert_eq!(doc.version, 0);

        let applied = doc.apply(&Mutation::SetFilterValue {
            path: Path::node(0),
            value: ".name".to_string(),
        });
        assert_eq!(applied, MutationOutcome::Applied { version: 1 });
        assert_eq!(doc.expression(), ".name");
    }

    #[test]
    fn test_fresh_key_prefix() {
        let mut doc = Document::from_root(vec![Node::object([("a", vec![])])])
            .with_fresh_key_prefix("field");

        doc.apply(&Mutation::InsertSibling {
            path: Path::node(0).key("a"),
            kind: NodeKind::Filter,
        });

        assert!(doc.resolve(&Path::node(0).key("field2")).is_some());
    }

    #[test]
    fn test_json_exchange() {
        let doc = Document::from_json(
            r#"[{"type": "filter", "value": ".items[]"}, {"type": "array", "items": [[{"type": "filter", "value": ".id"}]]}]"#,
        )
        .unwrap();

        assert_eq!(doc.expression(), ".items[] | [.id]");
        assert_eq!(doc.node_expression(&Path::node(1)).as_deref(), Some("[.id]"));

        let again = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(again.root(), doc.root());
    }
}
