//! TOML tree provider.

use crate::error::{TreeError, TreeResult};
use crate::node::Node;
use crate::provider::TreeProvider;

/// A TOML-backed tree provider.
///
/// Output uses canonical table form. Tables map to objects; datetimes load
/// as their string rendering since the node model has no datetime shape.
///
/// # Example
///
/// ```
/// use confdb_tree::{Node, TomlProvider, TreeProvider};
///
/// let provider = TomlProvider::new();
/// let tree = provider.load(b"answer = 42\n").unwrap();
/// assert_eq!(tree.get("answer"), Some(&Node::Int(42)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TomlProvider {
    preserve_order: bool,
    strict_types: bool,
}

impl Default for TomlProvider {
    fn default() -> Self {
        Self {
            preserve_order: false,
            strict_types: true,
        }
    }
}

impl TomlProvider {
    /// Creates a provider with default settings (sorted keys, strict types).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether keys serialize in insertion order instead of sorted.
    #[must_use]
    pub const fn preserve_order(mut self, value: bool) -> Self {
        self.preserve_order = value;
        self
    }

    /// Sets whether heterogeneous array inserts are rejected.
    #[must_use]
    pub const fn strict_types(mut self, value: bool) -> Self {
        self.strict_types = value;
        self
    }
}

impl TreeProvider for TomlProvider {
    fn load(&self, bytes: &[u8]) -> TreeResult<Node> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| TreeError::parse(format!("invalid UTF-8: {e}")))?;

        if text.trim().is_empty() {
            return Ok(Node::object());
        }

        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| TreeError::parse(e.message().to_string()))?;
        Ok(node_from_table(table))
    }

    fn serialize(&self, tree: &Node) -> TreeResult<Vec<u8>> {
        if !tree.is_object() {
            return Err(TreeError::serialize(format!(
                "document root must be an object, got {}",
                tree.type_name()
            )));
        }
        let value = node_to_toml(tree, !self.preserve_order);
        let text = toml::to_string(&value).map_err(|e| TreeError::serialize(e.to_string()))?;
        Ok(text.into_bytes())
    }

    fn array_accepts(&self, array: &[Node], candidate: &Node) -> bool {
        if !self.strict_types {
            return true;
        }
        match array.first() {
            Some(first) => first.node_type() == candidate.node_type(),
            None => true,
        }
    }
}

fn node_from_table(table: toml::Table) -> Node {
    let mut entries = Vec::with_capacity(table.len());
    for (key, value) in table {
        entries.push((key, node_from_toml(value)));
    }
    Node::Object(entries)
}

fn node_from_toml(value: toml::Value) -> Node {
    match value {
        toml::Value::String(s) => Node::String(s),
        toml::Value::Integer(i) => Node::Int(i),
        toml::Value::Float(f) => Node::Double(f),
        toml::Value::Boolean(b) => Node::Bool(b),
        toml::Value::Datetime(dt) => Node::String(dt.to_string()),
        toml::Value::Array(items) => {
            Node::Array(items.into_iter().map(node_from_toml).collect())
        }
        toml::Value::Table(table) => node_from_table(table),
    }
}

fn node_to_toml(node: &Node, sort_keys: bool) -> toml::Value {
    match node {
        Node::Object(entries) => {
            let mut pairs: Vec<&(String, Node)> = entries.iter().collect();
            if sort_keys {
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
            }
            let mut table = toml::Table::new();
            for (key, value) in pairs {
                table.insert(key.clone(), node_to_toml(value, sort_keys));
            }
            toml::Value::Table(table)
        }
        Node::Array(items) => {
            toml::Value::Array(items.iter().map(|n| node_to_toml(n, sort_keys)).collect())
        }
        Node::Bool(b) => toml::Value::Boolean(*b),
        Node::Int(i) => toml::Value::Integer(*i),
        Node::Double(d) => toml::Value::Float(*d),
        Node::String(s) => toml::Value::String(s.clone()),
    }
}
