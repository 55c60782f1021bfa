//! # jqgen Editor
//!
//! Structural editing engine for jq expressions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ ast: Node / Pipeline tree + Path algebra    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Path-addressed structural edits          │
//! │  - Undo/redo history                        │
//! │  - Selection preview of one ancestor chain  │
//! │  - Generation-stamped evaluation requests   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler: tree → jq text                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ sandbox (host supplied): jq text → JSON     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: expression text is always derived
//! 2. **Edits never fail loudly**: an edit that does not fit is a no-op
//! 3. **Paths are not handles**: re-resolve after every edit
//! 4. **Latest wins**: superseded evaluation results are dropped
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jqgen_editor::{Document, EditSession, Mutation, NodeKind, Path};
//!
//! let mut session = EditSession::new("local", Document::new());
//!
//! session.apply(Mutation::InsertSibling { path: Path::node(0), kind: NodeKind::Array });
//! session.apply(Mutation::AppendBranch { path: Path::node(1) });
//! session.apply(Mutation::InsertSibling {
//!     path: Path::node(1).branch(0).index(0),
//!     kind: NodeKind::Filter,
//! });
//! session.apply(Mutation::SetFilterValue {
//!     path: Path::node(1).branch(0).index(0),
//!     value: ".x".to_string(),
//! });
//!
//! assert_eq!(session.full_expression(), ". | [.x]");
//!
//! session.set_input(r#"{"x": 1}"#);
//! let output = session.evaluate_with(&my_jq_engine);
//! ```

mod config;
mod document;
mod errors;
mod mutations;
mod preview;
mod sandbox;
mod session;
mod undo_stack;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::Document;
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationOutcome, DEFAULT_FRESH_KEY_PREFIX};
pub use preview::{extract_ancestor_chain, selection_expression, Selection};
pub use sandbox::{
    parse_document, render_output, EvaluationError, EvaluationRequest, EvaluationTicket, Sandbox,
};
pub use session::EditSession;
pub use undo_stack::{MutationBatch, UndoStack};

// Re-export tree types for convenience
pub use jqgen_ast::{Node, NodeKind, Path, Pipeline, Selector};
pub use jqgen_compiler::{compile_node, compile_pipeline};
