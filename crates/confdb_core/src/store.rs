//! Store facade and crash-safe persistence.
//!
//! A store owns the file path, the canonical committed tree, and the
//! open/closed flag. Transactions edit a deep copy of the canonical tree;
//! a successful commit serializes the snapshot and atomically replaces the
//! backing file before the canonical tree advances:
//!
//! ```text
//! serialize -> write <path>.tmp -> fsync -> rename over <path> -> fsync dir
//! ```
//!
//! Any failure before the rename leaves the previous file untouched and the
//! canonical tree unchanged. `<path>.tmp` never survives a completed
//! commit. No advisory locks are taken; concurrent writers from other
//! processes resolve last-writer-wins at the rename boundary.

use crate::error::{StoreError, StoreResult};
use crate::options::{JsonStoreOptions, TomlStoreOptions};
use crate::transaction::Transaction;
use confdb_tree::{JsonProvider, Node, TomlProvider, TreeProvider};
use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// What a store persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backing {
    /// A single file at the configured path.
    File,
    /// The in-memory canonical tree only.
    Memory,
}

/// A transactional hierarchical configuration store.
///
/// Stores are created closed by one of the factories
/// ([`make_json_file_store`], [`make_toml_file_store`],
/// [`make_in_memory_store`]), opened with [`Store::open`], and edited
/// through transactions from [`Store::begin_transaction`].
///
/// # Thread Safety
///
/// A store and its transactions are **not thread-safe**: callers must
/// serialize all access to a given store and all access to a given
/// transaction. The store carries no internal locks; its cells exist only
/// so `close` can run while a transaction still borrows the store, and the
/// resulting `!Sync` type enforces the single-thread contract.
///
/// # Example
///
/// ```no_run
/// use confdb_core::{make_json_file_store, JsonStoreOptions};
///
/// let store = make_json_file_store("app.json", JsonStoreOptions::default()).unwrap();
/// store.open("app.json").unwrap();
///
/// let mut txn = store.begin_transaction().unwrap();
/// let root = txn.root();
/// txn.make_string(root, "title", "T").unwrap();
/// txn.commit().unwrap();
/// ```
pub struct Store {
    provider: Box<dyn TreeProvider>,
    backing: Backing,
    path: RefCell<Option<PathBuf>>,
    canonical: RefCell<Node>,
    open: Cell<bool>,
}

impl Store {
    fn new(provider: Box<dyn TreeProvider>, backing: Backing, path: Option<PathBuf>) -> Self {
        Self {
            provider,
            backing,
            path: RefCell::new(path),
            canonical: RefCell::new(Node::object()),
            open: Cell::new(false),
        }
    }

    /// Opens the store, loading the backing file if it exists.
    ///
    /// Records `path` as the store's file path (in-memory stores ignore
    /// it). A missing file starts the store on an empty root object which
    /// is written out by the first commit.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the store is open, `IoFailure` if the
    /// file cannot be read, and `ParseError` if the provider rejects its
    /// content; the store stays closed on any error.
    pub fn open(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        if self.open.get() {
            return Err(StoreError::already_exists("store already open"));
        }

        if self.backing == Backing::File {
            let loaded = if path.exists() {
                let bytes = fs::read(path)?;
                self.provider.load(&bytes)?
            } else {
                Node::object()
            };
            *self.path.borrow_mut() = Some(path.to_path_buf());
            *self.canonical.borrow_mut() = loaded;
        }

        self.open.set(true);
        tracing::debug!(path = %path.display(), "store opened");
        Ok(())
    }

    /// Closes the store, discarding the in-memory canonical tree.
    ///
    /// Outstanding transactions keep their private snapshots, but their
    /// `commit` will fail with `InvalidState`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the store is not open.
    pub fn close(&self) -> StoreResult<()> {
        if !self.open.get() {
            return Err(StoreError::invalid_state("store not open"));
        }
        *self.canonical.borrow_mut() = Node::object();
        self.open.set(false);
        tracing::debug!("store closed");
        Ok(())
    }

    /// Begins a transaction over a deep copy of the canonical tree.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the store is not open.
    pub fn begin_transaction(&self) -> StoreResult<Transaction<'_>> {
        if !self.open.get() {
            return Err(StoreError::invalid_state("store not open"));
        }
        Ok(Transaction::new(self, self.canonical.borrow().clone()))
    }

    /// Checks whether the store is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Returns the configured file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.path.borrow().clone()
    }

    pub(crate) fn provider(&self) -> &dyn TreeProvider {
        self.provider.as_ref()
    }

    /// Persists a committed snapshot and advances the canonical tree.
    pub(crate) fn persist(&self, tree: &Node) -> StoreResult<()> {
        if !self.open.get() {
            return Err(StoreError::invalid_state("store not open"));
        }

        let bytes = self.provider.serialize(tree)?;
        if self.backing == Backing::File {
            let path = self
                .path
                .borrow()
                .clone()
                .ok_or_else(|| StoreError::invalid_state("store has no path"))?;
            write_atomic(&path, &bytes)?;
        }

        *self.canonical.borrow_mut() = tree.clone();
        tracing::debug!(bytes = bytes.len(), "commit persisted");
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("backing", &self.backing)
            .field("path", &*self.path.borrow())
            .field("open", &self.open.get())
            .finish()
    }
}

/// Writes `bytes` to `path` via a sibling temporary file and an atomic
/// same-directory rename.
///
/// A failure while writing the temporary file removes the partial file
/// without masking the original error. The previous content of `path` is
/// untouched unless the rename succeeds.
fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(err) = write_temp(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    // The rename already happened; a directory sync failure only weakens
    // durability, so it must not unwind the commit.
    if let Err(err) = sync_parent_dir(path) {
        tracing::warn!(error = %err, "directory sync failed after rename");
    }

    Ok(())
}

fn write_temp(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Fsyncs the parent directory so the rename is durable.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            File::open(parent)?.sync_all()?;
        }
    }
    Ok(())
}

/// Windows NTFS journaling covers metadata durability; directory fsync is
/// not supported there.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Creates a JSON file-backed store.
///
/// The store is created closed; call [`Store::open`] before use.
///
/// # Errors
///
/// Returns `InvalidArgument` if `path` is empty.
pub fn make_json_file_store(
    path: impl Into<PathBuf>,
    options: JsonStoreOptions,
) -> StoreResult<Store> {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return Err(StoreError::invalid_argument("store path is empty"));
    }
    let provider = JsonProvider::new().allow_comments(options.allow_comments);
    Ok(Store::new(Box::new(provider), Backing::File, Some(path)))
}

/// Creates a TOML file-backed store.
///
/// The store is created closed; call [`Store::open`] before use.
///
/// # Errors
///
/// Returns `InvalidArgument` if `path` is empty.
pub fn make_toml_file_store(
    path: impl Into<PathBuf>,
    options: TomlStoreOptions,
) -> StoreResult<Store> {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return Err(StoreError::invalid_argument("store path is empty"));
    }
    let provider = TomlProvider::new()
        .preserve_order(options.preserve_order)
        .strict_types(options.strict_types);
    Ok(Store::new(Box::new(provider), Backing::File, Some(path)))
}

/// Creates an in-memory store.
///
/// Semantics match the file-backed stores minus file I/O: `open` and
/// `close` toggle state, and commit persists only to the in-memory
/// canonical tree.
#[must_use]
pub fn make_in_memory_store() -> Store {
    Store::new(Box::new(JsonProvider::new()), Backing::Memory, None)
}
