use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered sequence of nodes, joined with pipes when compiled
pub type Pipeline = Vec<Node>;

/// Insertion-ordered object entries
pub type ObjectItems = IndexMap<String, Pipeline>;

/// A single segment of a jq pipeline
///
/// Serialized with an internal `type` tag so trees can be exchanged as
/// plain JSON: `{"type": "filter", "value": ".foo"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Raw filter text, emitted verbatim after trimming
    Filter { value: String },

    /// Array construction; every item is an alternative branch
    Array { items: Vec<Pipeline> },

    /// Object construction keyed by property name
    Object { items: ObjectItems },
}

impl Node {
    pub fn filter(value: impl Into<String>) -> Self {
        Node::Filter {
            value: value.into(),
        }
    }

    pub fn array(items: Vec<Pipeline>) -> Self {
        Node::Array { items }
    }

    pub fn object<K, I>(items: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Pipeline)>,
    {
        Node::Object {
            items: items.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Filter { .. } => NodeKind::Filter,
            Node::Array { .. } => NodeKind::Array,
            Node::Object { .. } => NodeKind::Object,
        }
    }

    /// Whether this node holds branches rather than text
    pub fn is_container(&self) -> bool {
        !matches!(self, Node::Filter { .. })
    }

    /// Copy of this node with every branch dropped, keeping its shape
    pub fn hollow(&self) -> Node {
        match self {
            Node::Filter { value } => Node::filter(value.clone()),
            Node::Array { .. } => Node::array(Vec::new()),
            Node::Object { .. } => Node::Object {
                items: ObjectItems::new(),
            },
        }
    }

    /// Total number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + match self {
            Node::Filter { .. } => 0,
            Node::Array { items } => items.iter().map(|p| pipeline_node_count(p)).sum(),
            Node::Object { items } => items.values().map(|p| pipeline_node_count(p)).sum(),
        }
    }
}

/// Total number of nodes reachable from a pipeline
pub fn pipeline_node_count(pipeline: &[Node]) -> usize {
    pipeline.iter().map(Node::node_count).sum()
}

/// The three node shapes a user can insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Filter,
    Array,
    Object,
}

impl NodeKind {
    /// Freshly constructed node of this kind: empty filter, array or object
    pub fn default_node(self) -> Node {
        match self {
            NodeKind::Filter => Node::filter(""),
            NodeKind::Array => Node::array(Vec::new()),
            NodeKind::Object => Node::Object {
                items: ObjectItems::new(),
            },
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Filter => "filter",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_json_shape() {
        let node = Node::filter(".foo");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "filter", "value": ".foo" }));

        let parsed: Node = serde_json::from_str(
            r#"{"type": "object", "items": {"b": [], "a": [{"type": "filter", "value": "."}]}}"#,
        )
        .unwrap();

        match parsed {
            Node::Object { items } => {
                let keys: Vec<&str> = items.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["b", "a"]);
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_default_nodes() {
        assert_eq!(NodeKind::Filter.default_node(), Node::filter(""));
        assert_eq!(NodeKind::Array.default_node(), Node::array(vec![]));
        assert_eq!(NodeKind::Object.default_node().kind(), NodeKind::Object);
        assert!(!NodeKind::Filter.default_node().is_container());
    }

    #[test]
    fn test_hollow_keeps_shape() {
        let node = Node::array(vec![vec![Node::filter(".a")], vec![Node::filter(".b")]]);
        assert_eq!(node.hollow(), Node::array(vec![]));
        assert_eq!(node.node_count(), 3);
    }
}
