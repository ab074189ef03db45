//! # ConfDB Core
//!
//! Handle-based tree-transaction engine for ConfDB.
//!
//! ConfDB is a small embedded database for JSON- and TOML-backed
//! hierarchical configuration data. Clients open a store, begin a
//! transaction, navigate and mutate a tree of objects/arrays/scalars
//! through opaque handles, and either commit (atomically replacing the
//! on-disk file) or roll back (discarding all edits).
//!
//! This crate provides:
//! - Opaque [`NodeHandle`]s and the dot/bracket path grammar
//! - [`Transaction`]s with strictly-typed operations over a private snapshot
//! - [`Store`]s with crash-safe write-temp-then-rename persistence
//! - A closed [`StoreError`] set with stable ordinal codes
//!
//! ## Example
//!
//! ```
//! use confdb_core::make_in_memory_store;
//!
//! let store = make_in_memory_store();
//! store.open("unused").unwrap();
//!
//! let mut txn = store.begin_transaction().unwrap();
//! let root = txn.root();
//! let server = txn.make_object(root, "server").unwrap();
//! txn.make_int(server, "port", 8080).unwrap();
//! txn.commit().unwrap();
//!
//! let mut txn = store.begin_transaction().unwrap();
//! let root = txn.root();
//! assert_eq!(txn.get::<i64>(root, "server.port").unwrap(), 8080);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod addressor;
mod error;
mod handle;
mod options;
mod path;
mod store;
mod transaction;

pub use error::{StoreError, StoreResult, MAX_DETAIL_LEN};
pub use handle::NodeHandle;
pub use options::{JsonStoreOptions, TomlStoreOptions};
pub use store::{make_in_memory_store, make_json_file_store, make_toml_file_store, Store};
pub use transaction::{FromNode, Transaction, TransactionState};

pub use confdb_tree::{Node, NodeType, TreeError, TreeProvider};
