//! # Daylog Store
//!
//! Embedded document store for the daylog application.
//!
//! Each logical collection (users, sessions, foods, logs, ...) lives in a
//! single JSON file. The store provides exactly three operations:
//!
//! - [`DocumentStore::load`] - read a collection, or a fallback if absent
//! - [`DocumentStore::commit`] - atomically replace a collection's contents
//! - [`DocumentStore::update`] - serialized read-modify-write
//!
//! ## Design Principles
//!
//! - Collections are independent; each maps to one file
//! - Every mutation goes through [`DocumentStore::update`], which holds a
//!   per-collection lock for the whole load-transform-commit cycle
//! - Commits write a temporary sibling file and rename it over the target,
//!   so readers never observe a partially written collection
//! - A collection file that exists but does not parse is a fatal error;
//!   corrupt data is never silently replaced
//!
//! ## Example
//!
//! ```no_run
//! use daylog_store::{DocumentStore, StoreError};
//!
//! let store = DocumentStore::open("data")?;
//!
//! // Append a record under the collection's lock.
//! let items: Vec<String> = store.update("notes", Vec::new(), |mut items| {
//!     items.push("hello".to_string());
//!     Ok::<_, StoreError>(items)
//! })?;
//! assert_eq!(items.len(), 1);
//! # Ok::<(), StoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod lock;
mod store;

pub use error::{StoreError, StoreResult};
pub use lock::LockRegistry;
pub use store::DocumentStore;
