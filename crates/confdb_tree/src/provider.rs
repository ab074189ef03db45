//! Tree provider trait definition.

use crate::error::TreeResult;
use crate::node::Node;

/// A serialization backend for ConfDB trees.
///
/// Providers are **opaque tree codecs**. They translate between bytes in a
/// concrete format and the dynamic [`Node`] model, and they carry the
/// format's type discipline for array inserts. The store core owns all
/// transaction and persistence logic - providers never touch the
/// filesystem.
///
/// # Invariants
///
/// - `load` followed by `serialize` round-trips the tree (modulo key
///   ordering when the provider does not preserve it)
/// - `serialize` output is stable and human-readable
/// - Providers must be `Send + Sync` so stores can be moved across threads
///
/// # Implementors
///
/// - [`super::JsonProvider`] - JSON files, 2-space indent
/// - [`super::TomlProvider`] - TOML files, canonical table form
pub trait TreeProvider: Send + Sync {
    /// Parses `bytes` into a tree.
    ///
    /// An empty (or whitespace-only) input yields an empty root object.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Parse`](crate::TreeError::Parse) if the bytes
    /// are not valid in the provider's format, if the document root is not
    /// an object, or if the document contains a value outside the node
    /// model.
    fn load(&self, bytes: &[u8]) -> TreeResult<Node>;

    /// Renders `tree` to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Serialize`](crate::TreeError::Serialize) if the
    /// tree contains a value the format cannot represent.
    fn serialize(&self, tree: &Node) -> TreeResult<Vec<u8>>;

    /// Reports whether `candidate` may be appended to `array`.
    ///
    /// The default accepts everything. Providers with stricter models
    /// (TOML with `strict_types`) reject candidates whose type differs
    /// from the existing elements'.
    fn array_accepts(&self, array: &[Node], candidate: &Node) -> bool {
        let _ = (array, candidate);
        true
    }
}
