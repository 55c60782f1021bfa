use crate::options::CompileOptions;
use jqgen_ast::Node;

/// Compile a pipeline with the default separators
pub fn compile_pipeline(pipeline: &[Node]) -> String {
    compile_pipeline_with(pipeline, &CompileOptions::default())
}

/// Compile a single node with the default separators
pub fn compile_node(node: &Node) -> String {
    compile_node_with(node, &CompileOptions::default())
}

pub fn compile_pipeline_with(pipeline: &[Node], options: &CompileOptions) -> String {
    join_non_empty(
        pipeline.iter().map(|node| compile_node_with(node, options)),
        &options.pipe_separator,
    )
}

pub fn compile_node_with(node: &Node, options: &CompileOptions) -> String {
    match node {
        Node::Filter { value } => value.trim().to_string(),

        Node::Array { items } => {
            let inner = join_non_empty(
                items
                    .iter()
                    .map(|branch| compile_pipeline_with(branch, options)),
                &options.item_separator,
            );
            wrap(&inner, '[', ']')
        }

        Node::Object { items } => {
            let inner = join_non_empty(
                items.iter().map(|(key, branch)| {
                    let value = compile_pipeline_with(branch, options);
                    // The key goes away together with an empty value
                    if value.is_empty() {
                        String::new()
                    } else {
                        format!("{}{}{}", key, options.key_separator, value)
                    }
                }),
                &options.item_separator,
            );
            wrap(&inner, '{', '}')
        }
    }
}

fn join_non_empty(parts: impl Iterator<Item = String>, separator: &str) -> String {
    parts
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn wrap(inner: &str, open: char, close: char) -> String {
    if inner.is_empty() {
        String::new()
    } else {
        format!("{}{}{}", open, inner, close)
    }
}
