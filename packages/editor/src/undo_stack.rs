//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each recorded step keeps a snapshot of the tree from before it ran
//! - Undo restores the snapshot and moves the step to the redo stack
//! - Redo replays the original mutations on the restored tree
//! - New mutations clear the redo stack
//! - Mutations the document ignores are not recorded
//! - Supports batched operations (group multiple mutations as one undo step)
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let mut doc = Document::new();
//!
//! stack.apply(&Mutation::InsertSibling { path: Path::node(0), kind: NodeKind::Array }, &mut doc);
//!
//! stack.undo(&mut doc);
//! stack.redo(&mut doc)?;
//! ```

use crate::{Document, Mutation, MutationError, MutationOutcome};
use jqgen_ast::Pipeline;
use tracing::debug;

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// Tree as it was before the first mutation of the batch
    pub snapshot: Pipeline,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    pub fn single(mutation: Mutation, snapshot: Pipeline) -> Self {
        Self {
            mutations: vec![mutation],
            snapshot,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(&mut self, mutation: &Mutation, doc: &mut Document) -> MutationOutcome {
        let snapshot = doc.root().clone();
        let outcome = doc.apply(mutation);

        if !outcome.is_applied() {
            return outcome;
        }

        if let Some(batch) = &mut self.current_batch {
            if batch.mutations.is_empty() {
                batch.snapshot = snapshot;
            }
            batch.mutations.push(mutation.clone());
        } else {
            self.push_batch(MutationBatch::single(mutation.clone(), snapshot));
        }

        outcome
    }

    /// Start a batch of mutations (will be undone/redone together)
    ///
    /// A batch that is still open is committed first.
    pub fn begin_batch(&mut self) {
        self.end_batch();
        self.current_batch = Some(MutationBatch {
            mutations: Vec::new(),
            snapshot: Vec::new(),
            description: None,
        });
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates the redo future
        self.redo_stack.clear();
    }

    /// Undo the most recent mutation/batch
    ///
    /// An open batch is committed first, so its edits are what gets undone.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        self.end_batch();

        let Some(batch) = self.undo_stack.pop() else {
            return false;
        };

        debug!(mutations = batch.mutations.len(), "Undoing batch");
        doc.restore(batch.snapshot.clone());
        self.redo_stack.push(batch);
        true
    }

    /// Redo the most recently undone mutation/batch
    ///
    /// Fails only if the document was edited behind the stack's back; the
    /// tree is then put back the way it was before the redo.
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool, MutationError> {
        // Committing a non-empty batch clears the redo stack
        self.end_batch();

        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        let before = doc.root().clone();
        let replayed = batch
            .mutations
            .iter()
            .try_for_each(|mutation| doc.try_apply(mutation).map(|_| ()));

        if let Err(err) = replayed {
            doc.restore(before);
            self.redo_stack.push(batch);
            return Err(err);
        }

        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
