//! # Daylog Auth
//!
//! Credential and session subsystem for the daylog application, built
//! directly on [`daylog_store`].
//!
//! The subsystem leans on the store's serialized `update` primitive for
//! its invariants: account creation performs the duplicate-email check
//! and the insert inside one locked transaction on the users collection,
//! so two racing registrations with the same email can never both
//! succeed.
//!
//! Passwords are never stored; each account keeps a random salt and a
//! PBKDF2-HMAC-SHA-512 hash. Consumers only ever see [`PublicUser`], a
//! projection with the credential fields removed.
//!
//! ## Example
//!
//! ```no_run
//! use daylog_auth::{AuthConfig, AuthService};
//! use daylog_store::DocumentStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(DocumentStore::open("data")?);
//! let auth = AuthService::new(store, AuthConfig::default());
//!
//! auth.ensure_seed_accounts()?;
//! let user = auth.register("a@x.com", "secret1", "A", None)?;
//! let session = auth.create_session(user.id, false)?;
//! assert!(auth.resolve_session(&session.token)?.is_some());
//! # Ok::<(), daylog_auth::AuthError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod password;
mod service;
mod session;
mod user;

pub use error::{AuthError, AuthResult};
pub use service::{AuthConfig, AuthService, SESSIONS_COLLECTION, USERS_COLLECTION};
pub use session::SessionRecord;
pub use user::{PublicUser, Role, UserRecord};
