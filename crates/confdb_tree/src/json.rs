//! JSON tree provider.

use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use crate::provider::TreeProvider;

/// A JSON-backed tree provider.
///
/// Output uses 2-space indentation, UTF-8 without a BOM, and a trailing
/// newline. Objects are unordered mappings: keys serialize in sorted
/// order regardless of insertion order.
///
/// # Example
///
/// ```
/// use confdb_tree::{JsonProvider, Node, TreeProvider};
///
/// let provider = JsonProvider::new();
/// let tree = provider.load(br#"{"answer": 42}"#).unwrap();
/// assert_eq!(tree.get("answer"), Some(&Node::Int(42)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProvider {
    allow_comments: bool,
}

impl JsonProvider {
    /// Creates a provider with default settings (comments rejected).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether `//` line comments are tolerated during `load`.
    #[must_use]
    pub const fn allow_comments(mut self, value: bool) -> Self {
        self.allow_comments = value;
        self
    }
}

impl TreeProvider for JsonProvider {
    fn load(&self, bytes: &[u8]) -> TreeResult<Node> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| TreeError::parse(format!("invalid UTF-8: {e}")))?;

        let stripped;
        let text = if self.allow_comments {
            stripped = strip_line_comments(text);
            stripped.as_str()
        } else {
            text
        };

        if text.trim().is_empty() {
            return Ok(Node::object());
        }

        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| TreeError::parse(e.to_string()))?;

        let tree = node_from_json(value)?;
        if !tree.is_object() {
            return Err(TreeError::parse(format!(
                "document root must be an object, got {}",
                tree.type_name()
            )));
        }
        Ok(tree)
    }

    fn serialize(&self, tree: &Node) -> TreeResult<Vec<u8>> {
        let value = node_to_json(tree)?;
        let mut text = serde_json::to_string_pretty(&value)
            .map_err(|e| TreeError::serialize(e.to_string()))?;
        text.push('\n');
        Ok(text.into_bytes())
    }
}

/// Removes `//` line comments outside string literals.
fn strip_line_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn node_from_json(value: serde_json::Value) -> TreeResult<Node> {
    match value {
        serde_json::Value::Null => Err(TreeError::parse("null values are not supported")),
        serde_json::Value::Bool(b) => Ok(Node::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Node::Int(i))
            } else if let Some(d) = n.as_f64() {
                // u64 values beyond i64 land here and lose precision.
                Ok(Node::Double(d))
            } else {
                Err(TreeError::parse(format!("unrepresentable number: {n}")))
            }
        }
        serde_json::Value::String(s) => Ok(Node::String(s)),
        serde_json::Value::Array(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                nodes.push(node_from_json(item)?);
            }
            Ok(Node::Array(nodes))
        }
        serde_json::Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, item) in map {
                entries.push((key, node_from_json(item)?));
            }
            Ok(Node::Object(entries))
        }
    }
}

fn node_to_json(node: &Node) -> TreeResult<serde_json::Value> {
    match node {
        Node::Object(entries) => {
            let mut pairs: Vec<&(String, Node)> = entries.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (key, value) in pairs {
                map.insert(key.clone(), node_to_json(value)?);
            }
            Ok(serde_json::Value::Object(map))
        }
        Node::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(node_to_json(item)?);
            }
            Ok(serde_json::Value::Array(values))
        }
        Node::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Node::Int(i) => Ok(serde_json::Value::Number((*i).into())),
        Node::Double(d) => serde_json::Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .ok_or_else(|| TreeError::serialize(format!("non-finite number: {d}"))),
        Node::String(s) => Ok(serde_json::Value::String(s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_basic_document() {
        let provider = JsonProvider::new();
        let tree = provider
            .load(br#"{"title": "T", "n": 42, "f": 1.5, "ok": true}"#)
            .unwrap();

        assert_eq!(tree.get("title"), Some(&Node::String("T".to_string())));
        assert_eq!(tree.get("n"), Some(&Node::Int(42)));
        assert_eq!(tree.get("f"), Some(&Node::Double(1.5)));
        assert_eq!(tree.get("ok"), Some(&Node::Bool(true)));
    }

    #[test]
    fn load_orders_keys_alphabetically() {
        let provider = JsonProvider::new();
        let tree = provider.load(br#"{"z": 1, "a": 2, "m": 3}"#).unwrap();

        let keys: Vec<&str> = tree
            .entries()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, ["a", "m", "z"]);
    }

    #[test]
    fn load_empty_input_is_empty_object() {
        let provider = JsonProvider::new();
        assert_eq!(provider.load(b"").unwrap(), Node::object());
        assert_eq!(provider.load(b"  \n ").unwrap(), Node::object());
    }

    #[test]
    fn load_rejects_null() {
        let provider = JsonProvider::new();
        let result = provider.load(br#"{"a": null}"#);
        assert!(matches!(result, Err(TreeError::Parse { .. })));
    }

    #[test]
    fn load_rejects_non_object_root() {
        let provider = JsonProvider::new();
        assert!(matches!(
            provider.load(b"[1, 2]"),
            Err(TreeError::Parse { .. })
        ));
        assert!(matches!(provider.load(b"42"), Err(TreeError::Parse { .. })));
    }

    #[test]
    fn load_rejects_malformed_input() {
        let provider = JsonProvider::new();
        let result = provider.load(b"{\"a\": ");
        assert!(matches!(result, Err(TreeError::Parse { .. })));
    }

    #[test]
    fn comments_rejected_by_default() {
        let provider = JsonProvider::new();
        let input = b"{\n  // a comment\n  \"a\": 1\n}";
        assert!(matches!(
            provider.load(input),
            Err(TreeError::Parse { .. })
        ));
    }

    #[test]
    fn comments_tolerated_when_enabled() {
        let provider = JsonProvider::new().allow_comments(true);
        let input = b"{\n  // a comment\n  \"a\": 1\n}";
        let tree = provider.load(input).unwrap();
        assert_eq!(tree.get("a"), Some(&Node::Int(1)));
    }

    #[test]
    fn comment_marker_inside_string_is_kept() {
        let provider = JsonProvider::new().allow_comments(true);
        let tree = provider.load(br#"{"url": "http://example"}"#).unwrap();
        assert_eq!(
            tree.get("url"),
            Some(&Node::String("http://example".to_string()))
        );
    }

    #[test]
    fn serialize_uses_two_space_indent_and_newline() {
        let provider = JsonProvider::new();
        let mut tree = Node::object();
        tree.insert("a", Node::Int(1));

        let bytes = provider.serialize(&tree).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn serialize_sorts_keys() {
        let provider = JsonProvider::new();
        let mut tree = Node::object();
        tree.insert("z", Node::Int(1));
        tree.insert("a", Node::Int(2));

        let text = String::from_utf8(provider.serialize(&tree).unwrap()).unwrap();
        let a_pos = text.find("\"a\": 2").unwrap();
        let z_pos = text.find("\"z\": 1").unwrap();
        assert!(a_pos < z_pos);
    }

    #[test]
    fn serialize_rejects_non_finite() {
        let provider = JsonProvider::new();
        let mut tree = Node::object();
        tree.insert("bad", Node::Double(f64::NAN));
        assert!(matches!(
            provider.serialize(&tree),
            Err(TreeError::Serialize { .. })
        ));
    }

    #[test]
    fn round_trip_preserves_tree() {
        let provider = JsonProvider::new();
        let mut inner = Node::object();
        inner.insert("deep", Node::Bool(false));
        // Keys in sorted order so the reloaded tree compares equal.
        let mut tree = Node::object();
        tree.insert("arr", Node::Array(vec![Node::Int(1), Node::Double(2.5)]));
        tree.insert("obj", inner);
        tree.insert("s", Node::String("v".to_string()));

        let bytes = provider.serialize(&tree).unwrap();
        let reloaded = provider.load(&bytes).unwrap();
        assert_eq!(reloaded, tree);
    }

    #[test]
    fn huge_unsigned_becomes_double() {
        let provider = JsonProvider::new();
        let tree = provider.load(br#"{"big": 18446744073709551615}"#).unwrap();
        assert!(matches!(tree.get("big"), Some(Node::Double(_))));
    }
}
