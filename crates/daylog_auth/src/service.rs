//! Account and session operations.

use crate::error::{AuthError, AuthResult};
use crate::password;
use crate::session::SessionRecord;
use crate::user::{PublicUser, Role, UserRecord};
use daylog_store::DocumentStore;
use rand::RngCore;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Collection holding user records.
pub const USERS_COLLECTION: &str = "users";

/// Collection holding session records.
pub const SESSIONS_COLLECTION: &str = "sessions";

/// Session token length in bytes (hex-encoded for transport).
const TOKEN_LEN: usize = 32;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// Demo accounts inserted on first run: email, name, password, role, and a
/// fixed salt so repeated seeding derives identical credentials.
const SEED_ACCOUNTS: &[(&str, &str, &str, Role, &str)] = &[
    (
        "admin@daylog.dev",
        "Admin",
        "admin123",
        Role::Admin,
        "61646d696e2d736565642d73616c7431",
    ),
    (
        "demo@daylog.dev",
        "Demo",
        "demo123",
        Role::User,
        "64656d6f2d736565642d73616c743031",
    ),
];

/// Configuration for session lifetimes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of a plain session.
    pub session_ttl: Duration,
    /// Lifetime of a "remember me" session.
    pub remember_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(24 * 60 * 60), // 1 day
            remember_ttl: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
        }
    }
}

impl AuthConfig {
    /// Sets the plain session lifetime.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets the "remember me" session lifetime.
    #[must_use]
    pub fn with_remember_ttl(mut self, ttl: Duration) -> Self {
        self.remember_ttl = ttl;
        self
    }
}

/// Credential and session subsystem.
///
/// All mutations go through the store's serialized `update`, so the
/// uniqueness and id-assignment invariants hold under concurrency.
/// Read-only lookups use plain `load` and tolerate a stale snapshot:
/// their results are re-validated (password comparison, expiry check)
/// rather than assumed fresh.
#[derive(Debug)]
pub struct AuthService {
    store: Arc<DocumentStore>,
    config: AuthConfig,
}

impl AuthService {
    /// Creates a service over the given store.
    pub fn new(store: Arc<DocumentStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Seeds demo accounts on first run.
    ///
    /// Runs one locked update on the users collection: if it already
    /// holds any account the collection is left untouched, so calling
    /// this any number of times after the first successful seed is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn ensure_seed_accounts(&self) -> AuthResult<()> {
        let now = now_millis();

        self.store
            .update(USERS_COLLECTION, Vec::new(), |users: Vec<UserRecord>| {
                if !users.is_empty() {
                    return Ok(users);
                }

                let mut users = users;
                for (index, (email, name, pass, role, salt)) in SEED_ACCOUNTS.iter().enumerate() {
                    users.push(UserRecord {
                        id: index as u64 + 1,
                        email: (*email).to_string(),
                        name: (*name).to_string(),
                        age: None,
                        created_at: now,
                        salt: (*salt).to_string(),
                        password_hash: password::derive_hash(pass, salt),
                        role: Some(*role),
                    });
                }
                info!(count = users.len(), "seeded demo accounts");
                Ok::<_, AuthError>(users)
            })?;

        Ok(())
    }

    /// Registers a new account.
    ///
    /// The duplicate check and the insert happen inside the same locked
    /// transaction, so two racing registrations with the same email can
    /// never both succeed. Ids are assigned as `max(existing) + 1`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`] for malformed input,
    /// [`AuthError::DuplicateEmail`] if the email is taken
    /// (case-insensitively), or a store failure.
    pub fn register(
        &self,
        email: &str,
        password_input: &str,
        name: &str,
        age: Option<u32>,
    ) -> AuthResult<PublicUser> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::validation("email must contain '@'"));
        }
        if password_input.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::validation("name must not be empty"));
        }

        let salt = password::generate_salt();
        let password_hash = password::derive_hash(password_input, &salt);
        let created_at = now_millis();
        let name = name.to_string();

        let mut created: Option<PublicUser> = None;
        self.store
            .update(USERS_COLLECTION, Vec::new(), |mut users: Vec<UserRecord>| {
                if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
                    return Err(AuthError::duplicate_email(&email));
                }

                let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
                let record = UserRecord {
                    id,
                    email: email.clone(),
                    name,
                    age,
                    created_at,
                    salt,
                    password_hash,
                    role: None,
                };
                created = Some(PublicUser::from(&record));
                users.push(record);
                Ok(users)
            })?;

        // The transform committed, so it ran and set `created`.
        let user = created.expect("committed registration produced a record");
        debug!(user_id = user.id, "registered account");
        Ok(user)
    }

    /// Verifies a login attempt.
    ///
    /// Looks the email up case-insensitively and recomputes the password
    /// hash against the stored salt. Returns `None` for any mismatch; the
    /// outcome does not reveal whether the email exists.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn verify_login(&self, email: &str, password_input: &str) -> AuthResult<Option<PublicUser>> {
        let email = email.trim().to_lowercase();
        let users: Vec<UserRecord> = self.store.load(USERS_COLLECTION, Vec::new())?;

        let Some(user) = users.iter().find(|u| u.email.eq_ignore_ascii_case(&email)) else {
            debug!("login rejected");
            return Ok(None);
        };

        if password::verify(password_input, &user.salt, &user.password_hash) {
            Ok(Some(PublicUser::from(user)))
        } else {
            debug!("login rejected");
            Ok(None)
        }
    }

    /// Issues a new session for a user.
    ///
    /// The token is 32 random bytes, hex-encoded. Expiry is 1 day, or
    /// 7 days with `remember` (see [`AuthConfig`]).
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn create_session(&self, user_id: u64, remember: bool) -> AuthResult<SessionRecord> {
        self.create_session_at(user_id, remember, now_millis())
    }

    /// Issues a session with an explicit issuance time (unix millis).
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn create_session_at(
        &self,
        user_id: u64,
        remember: bool,
        now_ms: u64,
    ) -> AuthResult<SessionRecord> {
        let ttl = if remember {
            self.config.remember_ttl
        } else {
            self.config.session_ttl
        };

        let session = SessionRecord {
            token: generate_token(),
            user_id,
            created_at: now_ms,
            expires_at: now_ms + ttl.as_millis() as u64,
        };

        let stored = session.clone();
        self.store.update(
            SESSIONS_COLLECTION,
            Vec::new(),
            |mut sessions: Vec<SessionRecord>| {
                sessions.push(stored);
                Ok::<_, AuthError>(sessions)
            },
        )?;

        debug!(user_id, remember, "issued session");
        Ok(session)
    }

    /// Resolves a bearer token to its session.
    ///
    /// Returns `None` if the token is unknown or the session has expired;
    /// the two cases are indistinguishable to the caller. An expired
    /// record is not deleted here - it merely becomes unreachable.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn resolve_session(&self, token: &str) -> AuthResult<Option<SessionRecord>> {
        self.resolve_session_at(token, now_millis())
    }

    /// Resolves a token against an explicit clock (unix millis).
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn resolve_session_at(&self, token: &str, now_ms: u64) -> AuthResult<Option<SessionRecord>> {
        let sessions: Vec<SessionRecord> = self.store.load(SESSIONS_COLLECTION, Vec::new())?;

        Ok(sessions
            .into_iter()
            .find(|s| s.token == token && s.is_valid_at(now_ms)))
    }

    /// Deletes a session by token.
    ///
    /// Deleting a token that does not exist is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn delete_session(&self, token: &str) -> AuthResult<()> {
        self.store.update(
            SESSIONS_COLLECTION,
            Vec::new(),
            |mut sessions: Vec<SessionRecord>| {
                sessions.retain(|s| s.token != token);
                Ok::<_, AuthError>(sessions)
            },
        )?;

        Ok(())
    }

    /// Looks a user up by id.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn resolve_user_by_id(&self, id: u64) -> AuthResult<Option<PublicUser>> {
        let users: Vec<UserRecord> = self.store.load(USERS_COLLECTION, Vec::new())?;
        Ok(users.iter().find(|u| u.id == id).map(PublicUser::from))
    }
}

/// Current time as unix milliseconds.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Generates a high-entropy opaque token, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
