//! # Edit Session Management
//!
//! Tracks editing state for one user.
//!
//! An EditSession owns the document, its undo history, the current
//! selection and the sample input the expression is evaluated against. It
//! recompiles after every accepted change and hands out evaluation requests
//! stamped with a generation, so a slow evaluation that finishes after the
//! user has moved on cannot overwrite newer output.

use crate::sandbox::{render_output, EvaluationError, EvaluationRequest, EvaluationTicket, Sandbox};
use crate::{Document, EditorConfig, EditorError, Mutation, MutationOutcome, Selection, UndoStack};
use jqgen_ast::Path;
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Single edit session
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    document: Document,

    history: UndoStack,

    selection: Selection,

    /// Raw sample document text, parsed on each evaluation
    input: String,

    /// Rendered result of the latest accepted evaluation
    output: Option<String>,

    /// Bumped whenever the active expression or the input may have changed
    generation: u64,

    config: EditorConfig,
}

impl EditSession {
    /// Create new edit session with the default configuration
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_config(id, document, EditorConfig::default())
    }

    pub fn with_config(id: impl Into<String>, document: Document, config: EditorConfig) -> Self {
        Self {
            id: id.into(),
            document: document.with_fresh_key_prefix(config.fresh_key_prefix.clone()),
            history: UndoStack::with_max_levels(config.undo_levels),
            selection: Selection::new(),
            input: String::new(),
            output: None,
            generation: 0,
            config,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Apply a mutation through the undo history
    #[instrument(skip(self, mutation), fields(session = %self.id, mutation = mutation.name()))]
    pub fn apply(&mut self, mutation: Mutation) -> MutationOutcome {
        let outcome = self.history.apply(&mutation, &mut self.document);

        if outcome.is_applied() {
            self.rebase_selection(&mutation);
            self.after_tree_change();
            debug!(version = self.document.version, expression = %self.full_expression(), "Recompiled");
        }

        outcome
    }

    /// Group the mutations applied until [`EditSession::end_batch`] into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Undo the last step; the selection is dropped since the restored tree
    /// may number its nodes differently
    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.document);
        if undone {
            self.selection.clear();
            self.after_tree_change();
        }
        undone
    }

    /// Redo the last undone step; drops the selection like [`EditSession::undo`]
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let redone = self.history.redo(&mut self.document)?;
        if redone {
            self.selection.clear();
            self.after_tree_change();
        }
        Ok(redone)
    }

    /// Select the node or branch at `path`, or deselect it if it is already
    /// selected
    ///
    /// Branch paths (an array branch or an object entry) preview the whole
    /// branch inside its ancestors. The root path and paths that do not
    /// resolve are ignored.
    pub fn toggle_selection(&mut self, path: Path) -> Option<&Path> {
        if path.is_empty() || self.document.resolve(&path).is_none() {
            debug!(path = %path, "Ignoring selection of unresolvable path");
            return self.selection.path();
        }

        self.selection.toggle(path);
        self.generation += 1;
        self.selection.path()
    }

    pub fn clear_selection(&mut self) {
        if self.selection.path().is_some() {
            self.selection.clear();
            self.generation += 1;
        }
    }

    pub fn selected_path(&self) -> Option<&Path> {
        self.selection.path()
    }

    /// Compiled expression of the whole tree
    pub fn full_expression(&self) -> String {
        self.document.expression()
    }

    /// Preview of the selected node's ancestor chain
    pub fn selected_expression(&self) -> Option<String> {
        self.selection.expression(self.document.root())
    }

    /// What gets evaluated: the selection preview if any, else the full expression
    pub fn active_expression(&self) -> String {
        self.selected_expression()
            .unwrap_or_else(|| self.full_expression())
    }

    /// Replace the sample input document text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.generation += 1;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Snapshot of the current input and active expression
    pub fn request_evaluation(&self) -> EvaluationRequest {
        EvaluationRequest {
            ticket: EvaluationTicket {
                generation: self.generation,
            },
            input: self.input.clone(),
            expression: self.active_expression(),
        }
    }

    /// Store an evaluation result unless it has been superseded
    ///
    /// Returns whether the result was accepted.
    pub fn complete_evaluation(
        &mut self,
        ticket: EvaluationTicket,
        result: Result<Value, EvaluationError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                session = %self.id,
                stale = ticket.generation,
                current = self.generation,
                "Discarding superseded evaluation"
            );
            return false;
        }

        if let Err(err) = &result {
            debug!(session = %self.id, error = %err, "Evaluation failed");
        }

        self.output = Some(render_output(&result, &self.config));
        true
    }

    /// Evaluate the active expression synchronously and store the output
    pub fn evaluate_with(&mut self, sandbox: &dyn Sandbox) -> &str {
        let request = self.request_evaluation();
        let result = request.run(sandbox);
        self.complete_evaluation(request.ticket, result);
        self.output.as_deref().unwrap_or_default()
    }

    /// Carry the selected path across `mutation` so it keeps pointing at the
    /// same node
    fn rebase_selection(&mut self, mutation: &Mutation) {
        let Some(selected) = self.selection.path() else {
            return;
        };

        match mutation.rebase(selected) {
            Some(rebased) if &rebased == selected => {}
            Some(rebased) => {
                debug!(session = %self.id, from = %selected, to = %rebased, "Selection moved");
                self.selection.select(rebased);
            }
            None => {
                info!(session = %self.id, "Selected node was removed, clearing selection");
                self.selection.clear();
            }
        }
    }

    fn after_tree_change(&mut self) {
        self.generation += 1;

        let stale = self
            .selection
            .path()
            .is_some_and(|selected| self.document.resolve(selected).is_none());
        if stale {
            info!(session = %self.id, "Selected node no longer exists, clearing selection");
            self.selection.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jqgen_ast::{Node, NodeKind};
    use serde_json::json;

    fn echo_expression(_document: &Value, expression: &str) -> Result<Value, EvaluationError> {
        Ok(Value::String(expression.to_string()))
    }

    #[test]
    fn test_session_creation() {
        let session = EditSession::new("client-1", Document::new());

        assert_eq!(session.id, "client-1");
        assert_eq!(session.full_expression(), ".");
        assert!(session.selected_path().is_none());
        assert!(session.output().is_none());
    }

    #[test]
    fn test_selection_switches_active_expression() {
        let root = vec![Node::filter("."), Node::array(vec![vec![Node::filter(".x")]])];
        let mut session = EditSession::new("client-1", Document::from_root(root));
        let path = Path::node(1).branch(0).index(0);

        session.toggle_selection(path.clone());
        assert_eq!(session.active_expression(), "[.x]");
        assert_eq!(session.full_expression(), ". | [.x]");

        session.toggle_selection(path);
        assert_eq!(session.active_expression(), ". | [.x]");
    }

    #[test]
    fn test_unresolvable_selection_is_ignored() {
        let mut session = EditSession::new("client-1", Document::new());
        assert!(session.toggle_selection(Path::node(4)).is_none());
        assert!(session.toggle_selection(Path::root()).is_none());
    }

    #[test]
    fn test_branch_selection_previews_whole_branch() {
        let root = vec![
            Node::filter("."),
            Node::object([("k", vec![Node::filter(".z"), Node::filter("length")])]),
        ];
        let mut session = EditSession::new("client-1", Document::from_root(root));

        session.toggle_selection(Path::node(1).key("k"));
        assert_eq!(session.active_expression(), "{k: .z | length}");

        // Renaming the entry carries the selection along
        session.apply(Mutation::RenameProperty {
            path: Path::node(1).key("k"),
            new_key: "size".to_string(),
        });
        assert_eq!(session.selected_path(), Some(&Path::node(1).key("size")));
        assert_eq!(session.active_expression(), "{size: .z | length}");
    }

    #[test]
    fn test_selection_cleared_when_node_removed() {
        let root = vec![Node::filter("."), Node::filter(".a")];
        let mut session = EditSession::new("client-1", Document::from_root(root));

        session.toggle_selection(Path::node(1));
        session.apply(Mutation::RemoveNode { path: Path::node(1) });

        assert!(session.selected_path().is_none());
    }

    #[test]
    fn test_stale_evaluation_is_discarded() {
        let mut session = EditSession::new("client-1", Document::new());
        session.set_input("{}");

        let stale = session.request_evaluation();
        session.apply(Mutation::SetFilterValue {
            path: Path::node(0),
            value: ".a".to_string(),
        });
        let fresh = session.request_evaluation();

        assert!(session.complete_evaluation(fresh.ticket, Ok(json!("fresh"))));
        assert!(!session.complete_evaluation(stale.ticket, Ok(json!("stale"))));
        assert_eq!(session.output(), Some("\"fresh\""));
    }

    #[test]
    fn test_evaluate_with_sandbox() {
        let mut session = EditSession::new("client-1", Document::new());
        session.apply(Mutation::InsertSibling {
            path: Path::node(0),
            kind: NodeKind::Filter,
        });
        session.apply(Mutation::SetFilterValue {
            path: Path::node(1),
            value: "keys".to_string(),
        });

        // No input yet: the document cannot be parsed
        assert_eq!(session.evaluate_with(&echo_expression), "invalid JSON or expression");

        session.set_input(r#"{"a": 1}"#);
        assert_eq!(session.evaluate_with(&echo_expression), "\". | keys\"");
    }

    #[test]
    fn test_fresh_key_prefix_from_config() {
        let config = EditorConfig {
            fresh_key_prefix: "field".to_string(),
            ..EditorConfig::default()
        };
        let root = vec![Node::object([("a", vec![])])];
        let mut session = EditSession::with_config("client-1", Document::from_root(root), config);

        session.apply(Mutation::InsertSibling {
            path: Path::node(0).key("a"),
            kind: NodeKind::Filter,
        });

        assert!(session.document().resolve(&Path::node(0).key("field2")).is_some());
    }
}
