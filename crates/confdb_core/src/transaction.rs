//! Transactions over a snapshot of the store's tree.
//!
//! A transaction owns a private deep copy of the canonical tree plus a
//! handle table mapping issued handles to locations inside that snapshot.
//! Edits stay invisible to the store until `commit`; `rollback` (or drop
//! while active) discards them.

use crate::addressor;
use crate::error::{StoreError, StoreResult};
use crate::handle::NodeHandle;
use crate::path::{self, PathStep};
use crate::store::Store;
use confdb_tree::Node;
use std::collections::HashMap;

/// State of a transaction.
///
/// `Committed` and `RolledBack` are absorbing: no operation succeeds once
/// either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can perform operations.
    Active,
    /// Transaction has been committed and its snapshot persisted.
    Committed,
    /// Transaction has been rolled back and its snapshot discarded.
    RolledBack,
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for bool {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for String {}
}

/// Types that can be read out of a tree node.
///
/// Implemented for `bool`, `i64`, `f64`, and `String`. Reads are strictly
/// typed; the single relaxation is that `f64` accepts an integral node.
pub trait FromNode: sealed::Sealed + Sized {
    /// Extracts a value of this type from `node`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TypeMismatch`] if the node holds a different
    /// type.
    fn from_node(node: &Node) -> StoreResult<Self>;
}

impl FromNode for bool {
    fn from_node(node: &Node) -> StoreResult<Self> {
        node.as_bool()
            .ok_or_else(|| StoreError::type_mismatch("bool", node.type_name()))
    }
}

impl FromNode for i64 {
    fn from_node(node: &Node) -> StoreResult<Self> {
        node.as_int()
            .ok_or_else(|| StoreError::type_mismatch("int", node.type_name()))
    }
}

impl FromNode for f64 {
    fn from_node(node: &Node) -> StoreResult<Self> {
        match node {
            Node::Int(i) => Ok(*i as f64),
            Node::Double(d) => Ok(*d),
            other => Err(StoreError::type_mismatch("double", other.type_name())),
        }
    }
}

impl FromNode for String {
    fn from_node(node: &Node) -> StoreResult<Self> {
        node.as_str()
            .map(str::to_string)
            .ok_or_else(|| StoreError::type_mismatch("string", node.type_name()))
    }
}

/// A transaction over a private snapshot of a [`Store`]'s tree.
///
/// All operations are strictly typed and validate fully before mutating,
/// so the snapshot is unchanged whenever an error is returned. Dropping an
/// active transaction rolls it back.
pub struct Transaction<'s> {
    store: &'s Store,
    snapshot: Node,
    handles: HashMap<u64, Vec<String>>,
    next_handle: u64,
    state: TransactionState,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(store: &'s Store, snapshot: Node) -> Self {
        let mut handles = HashMap::new();
        handles.insert(NodeHandle::ROOT.raw(), Vec::new());
        Self {
            store,
            snapshot,
            handles,
            next_handle: NodeHandle::ROOT.raw() + 1,
            state: TransactionState::Active,
        }
    }

    /// Returns the root handle of the snapshot tree.
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        NodeHandle::ROOT
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    fn ensure_active(&self) -> StoreResult<()> {
        match self.state {
            TransactionState::Active => Ok(()),
            TransactionState::Committed => Err(StoreError::invalid_state(
                "transaction already committed",
            )),
            TransactionState::RolledBack => Err(StoreError::invalid_state(
                "transaction already rolled back",
            )),
        }
    }

    fn location(&self, handle: NodeHandle) -> StoreResult<&Vec<String>> {
        if !handle.is_valid() {
            return Err(StoreError::InvalidHandle);
        }
        self.handles
            .get(&handle.raw())
            .ok_or(StoreError::InvalidHandle)
    }

    fn node(&self, handle: NodeHandle) -> StoreResult<&Node> {
        let location = self.location(handle)?;
        addressor::resolve(&self.snapshot, location)
    }

    fn node_mut(&mut self, handle: NodeHandle) -> StoreResult<&mut Node> {
        let location = self.location(handle)?.clone();
        addressor::resolve_mut(&mut self.snapshot, &location)
    }

    fn alloc_handle(&mut self, location: Vec<String>) -> NodeHandle {
        let raw = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(raw, location);
        NodeHandle::from_raw(raw)
    }

    // Typed reads.

    /// Reads the boolean at `handle`.
    pub fn get_bool(&self, handle: NodeHandle) -> StoreResult<bool> {
        self.ensure_active()?;
        bool::from_node(self.node(handle)?)
    }

    /// Reads the integer at `handle`.
    pub fn get_int(&self, handle: NodeHandle) -> StoreResult<i64> {
        self.ensure_active()?;
        i64::from_node(self.node(handle)?)
    }

    /// Reads the double at `handle`. An integral node widens to `f64`.
    pub fn get_double(&self, handle: NodeHandle) -> StoreResult<f64> {
        self.ensure_active()?;
        f64::from_node(self.node(handle)?)
    }

    /// Reads the string at `handle`.
    pub fn get_string(&self, handle: NodeHandle) -> StoreResult<String> {
        self.ensure_active()?;
        String::from_node(self.node(handle)?)
    }

    // Typed writes. The node must already hold the matching type; writes
    // never retype.

    /// Writes a boolean over the boolean at `handle`.
    pub fn set_bool(&mut self, handle: NodeHandle, value: bool) -> StoreResult<()> {
        self.ensure_active()?;
        match self.node_mut(handle)? {
            Node::Bool(slot) => {
                *slot = value;
                Ok(())
            }
            other => Err(StoreError::type_mismatch("bool", other.type_name())),
        }
    }

    /// Writes an integer over the integer at `handle`.
    pub fn set_int(&mut self, handle: NodeHandle, value: i64) -> StoreResult<()> {
        self.ensure_active()?;
        match self.node_mut(handle)? {
            Node::Int(slot) => {
                *slot = value;
                Ok(())
            }
            other => Err(StoreError::type_mismatch("int", other.type_name())),
        }
    }

    /// Writes a double over the double at `handle`.
    pub fn set_double(&mut self, handle: NodeHandle, value: f64) -> StoreResult<()> {
        self.ensure_active()?;
        match self.node_mut(handle)? {
            Node::Double(slot) => {
                *slot = value;
                Ok(())
            }
            other => Err(StoreError::type_mismatch("double", other.type_name())),
        }
    }

    /// Writes a string over the string at `handle`.
    pub fn set_string(&mut self, handle: NodeHandle, value: &str) -> StoreResult<()> {
        self.ensure_active()?;
        match self.node_mut(handle)? {
            Node::String(slot) => {
                *slot = value.to_string();
                Ok(())
            }
            other => Err(StoreError::type_mismatch("string", other.type_name())),
        }
    }

    // Constructors under an object parent.

    /// Creates an empty object under `parent` at `key`.
    pub fn make_object(&mut self, parent: NodeHandle, key: &str) -> StoreResult<NodeHandle> {
        let location = self.insert_child(parent, key, Node::object())?;
        Ok(self.alloc_handle(location))
    }

    /// Creates an empty array under `parent` at `key`.
    pub fn make_array(&mut self, parent: NodeHandle, key: &str) -> StoreResult<NodeHandle> {
        let location = self.insert_child(parent, key, Node::array())?;
        Ok(self.alloc_handle(location))
    }

    /// Creates a boolean under `parent` at `key`.
    pub fn make_bool(&mut self, parent: NodeHandle, key: &str, value: bool) -> StoreResult<()> {
        self.insert_child(parent, key, Node::Bool(value)).map(|_| ())
    }

    /// Creates an integer under `parent` at `key`.
    pub fn make_int(&mut self, parent: NodeHandle, key: &str, value: i64) -> StoreResult<()> {
        self.insert_child(parent, key, Node::Int(value)).map(|_| ())
    }

    /// Creates a double under `parent` at `key`.
    pub fn make_double(&mut self, parent: NodeHandle, key: &str, value: f64) -> StoreResult<()> {
        self.insert_child(parent, key, Node::Double(value))
            .map(|_| ())
    }

    /// Creates a string under `parent` at `key`.
    pub fn make_string(&mut self, parent: NodeHandle, key: &str, value: &str) -> StoreResult<()> {
        self.insert_child(parent, key, Node::String(value.to_string()))
            .map(|_| ())
    }

    /// Inserts `value` under an object parent, returning the child location.
    ///
    /// Checks run in contract order: key grammar, parent resolution, parent
    /// type, key uniqueness.
    fn insert_child(
        &mut self,
        parent: NodeHandle,
        key: &str,
        value: Node,
    ) -> StoreResult<Vec<String>> {
        self.ensure_active()?;
        path::validate_key(key)?;
        let mut location = self.location(parent)?.clone();
        let node = addressor::resolve_mut(&mut self.snapshot, &location)?;
        if !node.is_object() {
            return Err(StoreError::type_mismatch("object", node.type_name()));
        }
        if node.contains_key(key) {
            return Err(StoreError::already_exists(key));
        }
        node.insert(key, value);
        location.push(key.to_string());
        Ok(location)
    }

    // Queries and removals.

    /// Checks whether the object at `parent` contains `key`.
    pub fn has(&self, parent: NodeHandle, key: &str) -> StoreResult<bool> {
        self.ensure_active()?;
        let node = self.node(parent)?;
        if !node.is_object() {
            return Err(StoreError::type_mismatch("object", node.type_name()));
        }
        Ok(node.contains_key(key))
    }

    /// Returns a handle to the child `key` of the object at `parent`.
    pub fn child(&mut self, parent: NodeHandle, key: &str) -> StoreResult<NodeHandle> {
        self.ensure_active()?;
        let mut location = self.location(parent)?.clone();
        let node = addressor::resolve(&self.snapshot, &location)?;
        if !node.is_object() {
            return Err(StoreError::type_mismatch("object", node.type_name()));
        }
        if !node.contains_key(key) {
            return Err(StoreError::key_not_found(key));
        }
        location.push(key.to_string());
        Ok(self.alloc_handle(location))
    }

    /// Removes the child `key` from the object at `parent`.
    ///
    /// Handles under the removed node go stale and fail on their next
    /// dereference.
    pub fn remove(&mut self, parent: NodeHandle, key: &str) -> StoreResult<()> {
        self.ensure_active()?;
        let node = self.node_mut(parent)?;
        if !node.is_object() {
            return Err(StoreError::type_mismatch("object", node.type_name()));
        }
        node.remove_key(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    /// Checks whether the array at `parent` has an element at `index`.
    pub fn has_element(&self, parent: NodeHandle, index: usize) -> StoreResult<bool> {
        self.ensure_active()?;
        let node = self.node(parent)?;
        match node.elements() {
            Some(items) => Ok(index < items.len()),
            None => Err(StoreError::type_mismatch("array", node.type_name())),
        }
    }

    /// Returns a handle to element `index` of the array at `parent`.
    pub fn element(&mut self, parent: NodeHandle, index: usize) -> StoreResult<NodeHandle> {
        self.ensure_active()?;
        let mut location = self.location(parent)?.clone();
        let node = addressor::resolve(&self.snapshot, &location)?;
        let Some(items) = node.elements() else {
            return Err(StoreError::type_mismatch("array", node.type_name()));
        };
        if index >= items.len() {
            return Err(StoreError::index_out_of_range(index as u64, items.len()));
        }
        location.push(index.to_string());
        Ok(self.alloc_handle(location))
    }

    /// Removes element `index` from the array at `parent`.
    ///
    /// Later elements shift down by one; handles that pointed past `index`
    /// go stale and fail on their next dereference.
    pub fn erase_element(&mut self, parent: NodeHandle, index: usize) -> StoreResult<()> {
        self.ensure_active()?;
        let node = self.node_mut(parent)?;
        if !node.is_array() {
            return Err(StoreError::type_mismatch("array", node.type_name()));
        }
        let len = node.elements().map_or(0, <[Node]>::len);
        node.remove_index(index)
            .map(|_| ())
            .ok_or_else(|| StoreError::index_out_of_range(index as u64, len))
    }

    // Array appends. The backing provider's type discipline applies.

    /// Appends a boolean to the array at `parent`.
    pub fn push_bool(&mut self, parent: NodeHandle, value: bool) -> StoreResult<()> {
        self.push_value(parent, Node::Bool(value))
    }

    /// Appends an integer to the array at `parent`.
    pub fn push_int(&mut self, parent: NodeHandle, value: i64) -> StoreResult<()> {
        self.push_value(parent, Node::Int(value))
    }

    /// Appends a double to the array at `parent`.
    pub fn push_double(&mut self, parent: NodeHandle, value: f64) -> StoreResult<()> {
        self.push_value(parent, Node::Double(value))
    }

    /// Appends a string to the array at `parent`.
    pub fn push_string(&mut self, parent: NodeHandle, value: &str) -> StoreResult<()> {
        self.push_value(parent, Node::String(value.to_string()))
    }

    fn push_value(&mut self, parent: NodeHandle, value: Node) -> StoreResult<()> {
        self.ensure_active()?;
        let store = self.store;
        let location = self.location(parent)?.clone();
        let node = addressor::resolve_mut(&mut self.snapshot, &location)?;
        if !node.is_array() {
            return Err(StoreError::type_mismatch("array", node.type_name()));
        }
        let items = node.elements().unwrap_or(&[]);
        if !store.provider().array_accepts(items, &value) {
            let expected = items.first().map_or("any", Node::type_name);
            return Err(StoreError::type_mismatch(expected, value.type_name()));
        }
        node.push(value);
        Ok(())
    }

    // Navigation.

    /// Navigates from `base` along a dot/bracket path, returning a handle
    /// to the terminal node.
    ///
    /// Navigation is read-only with respect to the tree; only the terminal
    /// handle is allocated. An empty path returns `base`.
    ///
    /// # Errors
    ///
    /// In precedence order: `InvalidHandle` for a zero or unissued base,
    /// `PathSyntax` for malformed input, then per-step `TypeMismatch`,
    /// `KeyNotFound`, or `IndexOutOfRange`.
    pub fn navigate(&mut self, base: NodeHandle, path: &str) -> StoreResult<NodeHandle> {
        self.ensure_active()?;
        if !base.is_valid() {
            return Err(StoreError::InvalidHandle);
        }
        let mut location = self
            .handles
            .get(&base.raw())
            .ok_or(StoreError::InvalidHandle)?
            .clone();
        let steps = path::parse_path(path)?;
        if steps.is_empty() {
            return Ok(base);
        }

        let mut current = addressor::resolve(&self.snapshot, &location)?;
        for step in &steps {
            match step {
                PathStep::Key(key) => {
                    if !current.is_object() {
                        return Err(StoreError::type_mismatch("object", current.type_name()));
                    }
                    current = current
                        .get(key)
                        .ok_or_else(|| StoreError::key_not_found(key.clone()))?;
                    location.push(key.clone());
                }
                PathStep::Index(index) => {
                    let Some(items) = current.elements() else {
                        return Err(StoreError::type_mismatch("array", current.type_name()));
                    };
                    let idx = usize::try_from(*index)
                        .ok()
                        .filter(|i| *i < items.len())
                        .ok_or_else(|| StoreError::index_out_of_range(*index, items.len()))?;
                    current = &items[idx];
                    location.push(idx.to_string());
                }
            }
        }

        Ok(self.alloc_handle(location))
    }

    /// Navigates from `base` along `path` and reads the terminal value.
    ///
    /// Supported types: `bool`, `i64`, `f64`, `String`.
    pub fn get<T: FromNode>(&mut self, base: NodeHandle, path: &str) -> StoreResult<T> {
        let handle = self.navigate(base, path)?;
        T::from_node(self.node(handle)?)
    }

    // Lifecycle.

    /// Commits the transaction, persisting the snapshot through the store.
    ///
    /// On success the store's canonical tree advances and the transaction
    /// becomes `Committed`. On failure the transaction stays `Active` and
    /// may be retried or rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] if the transaction is already
    /// terminal or the store is closed, and [`StoreError::IoFailure`] if
    /// persistence fails; the canonical tree is not advanced on failure.
    pub fn commit(&mut self) -> StoreResult<()> {
        self.ensure_active()?;
        self.store.persist(&self.snapshot)?;
        self.state = TransactionState::Committed;
        Ok(())
    }

    /// Rolls back the transaction, discarding its snapshot and handles.
    ///
    /// Idempotent; a no-op once the transaction is terminal.
    pub fn rollback(&mut self) {
        if self.state == TransactionState::Active {
            self.snapshot = Node::object();
            self.handles.clear();
            self.state = TransactionState::RolledBack;
            tracing::debug!("transaction rolled back");
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.state == TransactionState::Active {
            tracing::debug!("transaction dropped while active");
            self.rollback();
        }
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("state", &self.state)
            .field("handles", &self.handles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::make_in_memory_store;

    fn open_store() -> crate::store::Store {
        let store = make_in_memory_store();
        store.open("ignored").unwrap();
        store
    }

    #[test]
    fn root_is_always_handle_one() {
        let store = open_store();
        let txn = store.begin_transaction().unwrap();
        assert_eq!(txn.root(), NodeHandle::ROOT);
        assert_eq!(txn.root().raw(), 1);
    }

    #[test]
    fn handles_are_monotonic_and_nonzero() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let a = txn.make_object(root, "a").unwrap();
        let b = txn.make_array(root, "b").unwrap();
        assert!(a.raw() > 1);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn make_and_get_scalars() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        txn.make_bool(root, "flag", true).unwrap();
        txn.make_int(root, "n", 42).unwrap();
        txn.make_double(root, "pi", 3.25).unwrap();
        txn.make_string(root, "title", "T").unwrap();

        let flag = txn.child(root, "flag").unwrap();
        let n = txn.child(root, "n").unwrap();
        let pi = txn.child(root, "pi").unwrap();
        let title = txn.child(root, "title").unwrap();

        assert!(txn.get_bool(flag).unwrap());
        assert_eq!(txn.get_int(n).unwrap(), 42);
        assert_eq!(txn.get_double(pi).unwrap(), 3.25);
        assert_eq!(txn.get_string(title).unwrap(), "T");
    }

    #[test]
    fn get_int_requires_integral_node() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        txn.make_string(root, "k", "v").unwrap();
        let h = txn.child(root, "k").unwrap();

        assert!(matches!(
            txn.get_int(h),
            Err(StoreError::TypeMismatch { .. })
        ));
        // The snapshot is unchanged by the failed read.
        assert_eq!(txn.get_string(h).unwrap(), "v");
    }

    #[test]
    fn get_double_widens_int() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        txn.make_int(root, "n", 7).unwrap();
        let h = txn.child(root, "n").unwrap();
        assert_eq!(txn.get_double(h).unwrap(), 7.0);

        // Narrowing is not permitted.
        txn.make_double(root, "d", 1.5).unwrap();
        let d = txn.child(root, "d").unwrap();
        assert!(matches!(
            txn.get_int(d),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn set_requires_matching_type() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        txn.make_string(root, "k", "v").unwrap();
        let h = txn.child(root, "k").unwrap();

        assert!(matches!(
            txn.set_int(h, 1),
            Err(StoreError::TypeMismatch { .. })
        ));
        txn.set_string(h, "w").unwrap();
        assert_eq!(txn.get_string(h).unwrap(), "w");
    }

    #[test]
    fn duplicate_key_fails_and_preserves_value() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        txn.make_int(root, "k", 1).unwrap();
        assert!(matches!(
            txn.make_int(root, "k", 2),
            Err(StoreError::AlreadyExists { .. })
        ));

        let h = txn.child(root, "k").unwrap();
        assert_eq!(txn.get_int(h).unwrap(), 1);
    }

    #[test]
    fn invalid_key_grammar_is_path_syntax() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        assert!(matches!(
            txn.make_string(root, "1bad", "x"),
            Err(StoreError::PathSyntax { .. })
        ));
        assert!(matches!(
            txn.make_string(root, "has-dash", "x"),
            Err(StoreError::PathSyntax { .. })
        ));
        txn.make_string(root, "_ok", "x").unwrap();
    }

    #[test]
    fn make_under_array_parent_is_type_mismatch() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let arr = txn.make_array(root, "arr").unwrap();
        assert!(matches!(
            txn.make_int(arr, "k", 1),
            Err(StoreError::TypeMismatch { .. })
        ));
        assert!(matches!(
            txn.make_object(arr, "k"),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn zero_handle_is_invalid() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let zero = NodeHandle::from_raw(0);

        assert!(matches!(
            txn.get_bool(zero),
            Err(StoreError::InvalidHandle)
        ));
        assert!(matches!(
            txn.make_int(zero, "k", 1),
            Err(StoreError::InvalidHandle)
        ));
        assert!(matches!(
            txn.navigate(zero, "a"),
            Err(StoreError::InvalidHandle)
        ));
    }

    #[test]
    fn unissued_handle_is_invalid() {
        let store = open_store();
        let txn = store.begin_transaction().unwrap();
        let bogus = NodeHandle::from_raw(999);
        assert!(matches!(
            txn.get_bool(bogus),
            Err(StoreError::InvalidHandle)
        ));
    }

    #[test]
    fn has_and_remove() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        txn.make_int(root, "k", 1).unwrap();
        assert!(txn.has(root, "k").unwrap());
        assert!(!txn.has(root, "other").unwrap());

        txn.remove(root, "k").unwrap();
        assert!(!txn.has(root, "k").unwrap());
        assert!(matches!(
            txn.remove(root, "k"),
            Err(StoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn has_on_non_object_is_type_mismatch() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let arr = txn.make_array(root, "arr").unwrap();
        assert!(matches!(
            txn.has(arr, "k"),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn child_miss_is_key_not_found() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();
        assert!(matches!(
            txn.child(root, "missing"),
            Err(StoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn elements_and_erase() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let arr = txn.make_array(root, "arr").unwrap();
        txn.push_int(arr, 10).unwrap();
        txn.push_int(arr, 20).unwrap();
        txn.push_int(arr, 30).unwrap();

        assert!(txn.has_element(arr, 2).unwrap());
        assert!(!txn.has_element(arr, 3).unwrap());

        let e1 = txn.element(arr, 1).unwrap();
        assert_eq!(txn.get_int(e1).unwrap(), 20);

        txn.erase_element(arr, 0).unwrap();
        assert!(!txn.has_element(arr, 2).unwrap());
        // The handle for old index 1 now sees the shifted element.
        assert_eq!(txn.get_int(e1).unwrap(), 30);

        assert!(matches!(
            txn.erase_element(arr, 5),
            Err(StoreError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn erased_tail_handle_goes_stale() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let arr = txn.make_array(root, "arr").unwrap();
        txn.push_int(arr, 1).unwrap();
        txn.push_int(arr, 2).unwrap();

        let tail = txn.element(arr, 1).unwrap();
        txn.erase_element(arr, 0).unwrap();
        txn.erase_element(arr, 0).unwrap();

        assert!(matches!(
            txn.get_int(tail),
            Err(StoreError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn removed_subtree_handle_goes_stale() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let obj = txn.make_object(root, "a").unwrap();
        txn.make_int(obj, "b", 1).unwrap();
        let b = txn.child(obj, "b").unwrap();

        txn.remove(root, "a").unwrap();
        assert!(matches!(
            txn.get_int(b),
            Err(StoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn push_on_non_array_is_type_mismatch() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();
        assert!(matches!(
            txn.push_int(root, 1),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn navigate_nested_path() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let a = txn.make_object(root, "a").unwrap();
        let b = txn.make_object(a, "b").unwrap();
        txn.make_int(b, "c", 7).unwrap();

        let c = txn.navigate(root, "a.b.c").unwrap();
        assert_eq!(txn.get_int(c).unwrap(), 7);

        assert_eq!(txn.get::<i64>(root, "a.b.c").unwrap(), 7);
        assert!(matches!(
            txn.get::<i64>(root, "a.b[0]"),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn navigate_through_array() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        let arr = txn.make_array(root, "hosts").unwrap();
        txn.push_string(arr, "alpha").unwrap();
        txn.push_string(arr, "beta").unwrap();

        assert_eq!(
            txn.get::<String>(root, "hosts[1]").unwrap(),
            "beta".to_string()
        );
        assert!(matches!(
            txn.navigate(root, "hosts[2]"),
            Err(StoreError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn navigate_empty_path_returns_base() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();
        assert_eq!(txn.navigate(root, "").unwrap(), root);
    }

    #[test]
    fn navigate_bad_path_is_syntax_error() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();
        assert!(matches!(
            txn.navigate(root, "a[x]"),
            Err(StoreError::PathSyntax { .. })
        ));
    }

    #[test]
    fn commit_is_terminal() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();
        txn.make_int(root, "n", 1).unwrap();

        txn.commit().unwrap();
        assert_eq!(txn.state(), TransactionState::Committed);

        assert!(matches!(
            txn.commit(),
            Err(StoreError::InvalidState { .. })
        ));
        assert!(matches!(
            txn.make_int(root, "m", 2),
            Err(StoreError::InvalidState { .. })
        ));
        assert!(matches!(
            txn.get_int(root),
            Err(StoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn rollback_is_idempotent_and_terminal() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();
        txn.make_int(root, "n", 1).unwrap();

        txn.rollback();
        txn.rollback();
        assert_eq!(txn.state(), TransactionState::RolledBack);

        assert!(matches!(
            txn.commit(),
            Err(StoreError::InvalidState { .. })
        ));
        assert!(matches!(
            txn.has(root, "n"),
            Err(StoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn rollback_after_commit_is_noop() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        txn.commit().unwrap();
        txn.rollback();
        assert_eq!(txn.state(), TransactionState::Committed);
    }

    #[test]
    fn failed_operation_leaves_snapshot_unchanged() {
        let store = open_store();
        let mut txn = store.begin_transaction().unwrap();
        let root = txn.root();

        txn.make_int(root, "a", 1).unwrap();
        let before = txn.get::<i64>(root, "a").unwrap();

        let _ = txn.make_int(root, "a", 2);
        let a = txn.child(root, "a").unwrap();
        let _ = txn.set_string(a, "x");
        let _ = txn.remove(root, "missing");

        assert_eq!(txn.get::<i64>(root, "a").unwrap(), before);
        assert_eq!(txn.get::<i64>(root, "a").unwrap(), 1);
    }
}
