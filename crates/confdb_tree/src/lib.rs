//! # ConfDB Tree
//!
//! Node model and tree providers for ConfDB.
//!
//! This crate provides the dynamic tree layer under the ConfDB store core.
//! Providers are **opaque tree codecs** - they translate between a concrete
//! file format and the [`Node`] model and carry the format's type
//! discipline, but they never touch transactions or the filesystem.
//!
//! ## Design Principles
//!
//! - One node model, several formats; the store core sees only [`Node`]
//! - Objects carry their entries in order with unique keys; each provider
//!   decides what order its output uses
//! - Providers must be `Send + Sync`
//! - Parse and serialize failures are values, never panics
//!
//! ## Available Providers
//!
//! - [`JsonProvider`] - JSON files, 2-space indent, sorted keys, optional
//!   `//` comments
//! - [`TomlProvider`] - TOML files, canonical table form, strict array types
//!
//! ## Example
//!
//! ```rust
//! use confdb_tree::{JsonProvider, Node, TreeProvider};
//!
//! let provider = JsonProvider::new();
//! let tree = provider.load(br#"{"greeting": "hello"}"#).unwrap();
//! assert_eq!(tree.get("greeting"), Some(&Node::String("hello".into())));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod json;
mod node;
mod provider;
mod toml;

pub use error::{TreeError, TreeResult};
pub use json::JsonProvider;
pub use node::{Node, NodeType};
pub use provider::TreeProvider;
pub use self::toml::TomlProvider;
