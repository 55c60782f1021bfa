/// Separators used when emitting jq text
///
/// The defaults produce canonical jq: `a | b`, `[a, b]`, `{k: a}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Between pipeline segments
    pub pipe_separator: String,
    /// Between array branches and between object pairs
    pub item_separator: String,
    /// Between an object key and its value
    pub key_separator: String,
}

impl CompileOptions {
    /// Separators without padding, e.g. `.a|[.b,.c]|{k:.d}`
    pub fn compact() -> Self {
        Self {
            pipe_separator: "|".to_string(),
            item_separator: ",".to_string(),
            key_separator: ":".to_string(),
        }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pipe_separator: " | ".to_string(),
            item_separator: ", ".to_string(),
            key_separator: ": ".to_string(),
        }
    }
}
