//! Session state and its durable persistence.
//!
//! [`SessionContext`] is the one owner of the current identity and
//! credential. It is shared by `Arc` with the API client (which reads the
//! credential and invalidates the session on 401), the stores and the router.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::ports::KeyValueStore;
use super::{ApiError, Role, UserRecord};

/// Durable key holding the credential.
pub const TOKEN_KEY: &str = "token";
/// Durable key holding the serialised [`UserRecord`].
pub const USER_INFO_KEY: &str = "userInfo";

/// Opaque bearer credential.
///
/// The server does not issue tokens yet, so the client derives one by
/// base64-encoding the identity JSON. Nothing should rely on it being secret
/// or signed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Wrap a stored credential.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Derive the placeholder credential for `identity`.
    ///
    /// # Examples
    ///
    /// ```
    /// use enrollment_client::domain::{Credential, Role, UserRecord};
    ///
    /// let identity = UserRecord::new("", Role::Student, "B1");
    /// let credential = Credential::derive_from(&identity).unwrap();
    /// assert!(!credential.expose().is_empty());
    /// ```
    pub fn derive_from(identity: &UserRecord) -> Result<Self, ApiError> {
        let json = serde_json::to_vec(identity)
            .map_err(|err| ApiError::storage(format!("failed to serialise identity: {err}")))?;
        Ok(Self::new(STANDARD.encode(json)))
    }

    /// Raw credential value for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Snapshot of the client's authentication state.
///
/// `authenticated` is derived rather than stored: a session is authenticated
/// exactly when it holds both an identity and a credential.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    identity: Option<UserRecord>,
    credential: Option<Credential>,
}

impl Session {
    /// Build an authenticated session.
    pub fn authenticated(identity: UserRecord, credential: Credential) -> Self {
        Self {
            identity: Some(identity),
            credential: Some(credential),
        }
    }

    /// Whether both identity and credential are present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.credential.is_some()
    }

    /// Current identity.
    pub fn identity(&self) -> Option<&UserRecord> {
        self.identity.as_ref()
    }

    /// Current credential.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Display name, or `""` when signed out.
    pub fn display_name(&self) -> &str {
        self.identity.as_ref().map_or("", |identity| identity.name.as_str())
    }

    /// Role, when signed in with a recognised role.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().and_then(|identity| identity.role_name)
    }

    /// Student or staff number, or `""` when signed out.
    pub fn user_id(&self) -> &str {
        self.identity
            .as_ref()
            .map_or("", |identity| identity.identifier.as_str())
    }

    /// Whether the identity is a student.
    pub fn is_student(&self) -> bool {
        self.role() == Some(Role::Student)
    }

    /// Whether the identity is a teacher.
    pub fn is_teacher(&self) -> bool {
        self.role() == Some(Role::Teacher)
    }

    /// Whether the identity is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

/// Owner of the live [`Session`] and its durable copy.
pub struct SessionContext {
    state: RwLock<Session>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionContext {
    /// Create an empty, signed-out context over `storage`.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: RwLock::new(Session::default()),
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of the current session.
    pub fn session(&self) -> Session {
        self.read().clone()
    }

    /// Whether the live session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Role of the live session.
    pub fn role(&self) -> Option<Role> {
        self.read().role()
    }

    /// Credential currently held in durable storage.
    ///
    /// Read failures are logged and treated as "no credential" so a broken
    /// store degrades to anonymous requests.
    pub fn stored_credential(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "failed to read stored credential");
                None
            }
        }
    }

    /// Rebuild the session from durable storage without touching the network.
    ///
    /// Returns whether the session is authenticated afterwards. A stored
    /// identity that no longer decodes is ignored.
    pub fn restore(&self) -> Result<bool, ApiError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user_info = self.storage.get(USER_INFO_KEY)?;
        let (Some(token), Some(user_info)) = (token, user_info) else {
            debug!("no stored session to restore");
            return Ok(self.is_authenticated());
        };

        match serde_json::from_str::<UserRecord>(&user_info) {
            Ok(identity) => {
                *self.write() = Session::authenticated(identity, Credential::new(token));
                Ok(true)
            }
            Err(err) => {
                warn!(error = %err, "ignoring unreadable stored identity");
                Ok(self.is_authenticated())
            }
        }
    }

    /// Persist and adopt a freshly authenticated identity.
    pub(crate) fn establish(
        &self,
        identity: UserRecord,
        credential: Credential,
    ) -> Result<(), ApiError> {
        let user_info = serialise_identity(&identity)?;
        self.storage.set(TOKEN_KEY, credential.expose())?;
        if let Err(err) = self.storage.set(USER_INFO_KEY, &user_info) {
            self.forget_stored(TOKEN_KEY);
            return Err(err.into());
        }
        *self.write() = Session::authenticated(identity, credential);
        Ok(())
    }

    /// Replace the identity, keeping the credential.
    pub(crate) fn replace_identity(&self, identity: UserRecord) -> Result<(), ApiError> {
        let user_info = serialise_identity(&identity)?;
        self.storage.set(USER_INFO_KEY, &user_info)?;
        self.write().identity = Some(identity);
        Ok(())
    }

    /// Drop the session from memory and durable storage.
    ///
    /// Storage failures are logged; the in-memory session is always cleared.
    pub fn invalidate(&self) {
        *self.write() = Session::default();
        self.forget_stored(TOKEN_KEY);
        self.forget_stored(USER_INFO_KEY);
    }

    fn forget_stored(&self, key: &str) {
        if let Err(err) = self.storage.remove(key) {
            warn!(key, error = %err, "failed to remove stored session key");
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session", &*self.read())
            .finish_non_exhaustive()
    }
}

fn serialise_identity(identity: &UserRecord) -> Result<String, ApiError> {
    serde_json::to_string(identity)
        .map_err(|err| ApiError::storage(format!("failed to serialise identity: {err}")))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
