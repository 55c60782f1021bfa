//! # Evaluation Boundary
//!
//! The editor never runs jq itself. A host plugs an engine in through
//! [`Sandbox`] and the session feeds it compiled text plus the parsed input
//! document.
//!
//! Evaluation may happen off the editing thread. Each request carries an
//! [`EvaluationTicket`]; when the tree, the selection or the input changes
//! the session moves on to a new generation and results carrying an older
//! ticket are discarded instead of overwriting newer output.

use crate::config::EditorConfig;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Invalid input document: {0}")]
    DocumentParse(String),

    #[error("Invalid expression: {0}")]
    Expression(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// A jq engine
pub trait Sandbox {
    fn evaluate(&self, document: &Value, expression: &str) -> Result<Value, EvaluationError>;
}

impl<F> Sandbox for F
where
    F: Fn(&Value, &str) -> Result<Value, EvaluationError>,
{
    fn evaluate(&self, document: &Value, expression: &str) -> Result<Value, EvaluationError> {
        self(document, expression)
    }
}

/// Parse raw input text into a JSON document
pub fn parse_document(text: &str) -> Result<Value, EvaluationError> {
    serde_json::from_str(text).map_err(|e| EvaluationError::DocumentParse(e.to_string()))
}

/// Text shown in the output pane
///
/// Successful results are pretty-printed; every failure collapses to the
/// configured placeholder.
pub fn render_output(result: &Result<Value, EvaluationError>, config: &EditorConfig) -> String {
    match result {
        Ok(value) => {
            pretty_print(value, config.output_indent).unwrap_or_else(|| config.failure_placeholder.clone())
        }
        Err(_) => config.failure_placeholder.clone(),
    }
}

fn pretty_print(value: &Value, indent: usize) -> Option<String> {
    let indent = " ".repeat(indent);
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(buffer).ok()
}

/// Identifies the generation an evaluation was requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvaluationTicket {
    pub(crate) generation: u64,
}

impl EvaluationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything needed to run one evaluation, detached from the session
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub ticket: EvaluationTicket,
    pub input: String,
    pub expression: String,
}

impl EvaluationRequest {
    /// Parse the input and hand it to `sandbox`
    pub fn run(&self, sandbox: &dyn Sandbox) -> Result<Value, EvaluationError> {
        let document = parse_document(&self.input)?;
        sandbox.evaluate(&document, &self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity(document: &Value, _expression: &str) -> Result<Value, EvaluationError> {
        Ok(document.clone())
    }

    #[test]
    fn test_parse_document() {
        assert_eq!(parse_document(r#"{"a": 1}"#).unwrap(), json!({ "a": 1 }));
        assert!(matches!(
            parse_document("{not json"),
            Err(EvaluationError::DocumentParse(_))
        ));
        assert!(matches!(parse_document(""), Err(EvaluationError::DocumentParse(_))));
    }

    #[test]
    fn test_render_output_pretty_prints() {
        let config = EditorConfig::default();
        let rendered = render_output(&Ok(json!({ "a": [1, 2] })), &config);
        assert_eq!(rendered, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    }

    #[test]
    fn test_render_output_respects_indent() {
        let config = EditorConfig {
            output_indent: 4,
            ..EditorConfig::default()
        };
        let rendered = render_output(&Ok(json!({ "a": 1 })), &config);
        assert_eq!(rendered, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_every_failure_uses_placeholder() {
        let config = EditorConfig::default();
        for error in [
            EvaluationError::DocumentParse("x".to_string()),
            EvaluationError::Expression("x".to_string()),
            EvaluationError::Runtime("x".to_string()),
        ] {
            assert_eq!(render_output(&Err(error), &config), config.failure_placeholder);
        }
    }

    #[test]
    fn test_request_runs_through_sandbox() {
        let request = EvaluationRequest {
            ticket: EvaluationTicket { generation: 0 },
            input: "[1, 2]".to_string(),
            expression: ".".to_string(),
        };
        assert_eq!(request.run(&identity).unwrap(), json!([1, 2]));

        let bad_input = EvaluationRequest {
            input: "[1,".to_string(),
            ..request
        };
        assert!(matches!(
            bad_input.run(&identity),
            Err(EvaluationError::DocumentParse(_))
        ));
    }
}
