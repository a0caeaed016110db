//! Durable key-value persistence for storefront client state.
//!
//! A [`KvStore`] is a plain byte store (`get` / `set` / `delete`). The
//! [`Cache`] wrapper layers JSON serialization on top so callers work with
//! their own types.
//!
//! # Example
//!
//! ```rust
//! use storefront_cache::{Cache, MemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Draft {
//!     items: Vec<String>,
//! }
//!
//! let cache = Cache::new(MemoryStore::new());
//! cache.set("draft", &Draft { items: vec!["pizza".into()] }).unwrap();
//!
//! let draft: Option<Draft> = cache.get("draft").unwrap();
//! assert_eq!(draft.unwrap().items, vec!["pizza".to_string()]);
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KvStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use store::SpinStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}
