//! Authentication actions layered over [`SessionContext`].

use std::sync::Arc;

use tracing::{info, warn};

use super::ports::{HttpTransport, Notice, Notifier};
use super::{
    ApiClient, ApiResult, Credential, LoginCredentials, Registration, Role, Session,
    SessionContext, UserRecord,
};

pub(crate) const MSG_LOGIN_OK: &str = "login successful";
pub(crate) const MSG_REGISTERED: &str = "registration successful, please log in";
pub(crate) const MSG_LOGGED_OUT: &str = "logged out";

/// Login, registration and logout for the shared session.
pub struct SessionStore<T> {
    api: Arc<ApiClient<T>>,
    notifier: Arc<dyn Notifier>,
}

impl<T> SessionStore<T> {
    /// Create a store acting through `api`.
    pub fn new(api: Arc<ApiClient<T>>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    fn context(&self) -> &SessionContext {
        self.api.session()
    }

    /// Rebuild the session from durable storage. No network call is made.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the durable store cannot be read.
    pub fn restore(&self) -> ApiResult<bool> {
        self.context().restore()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.context().session()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.context().is_authenticated()
    }

    /// Role of the signed-in user.
    pub fn role(&self) -> Option<Role> {
        self.context().role()
    }

    /// Replace the stored identity, keeping the credential.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the identity cannot be persisted; the
    /// in-memory identity is left as it was.
    pub fn update_identity(&self, identity: UserRecord) -> ApiResult<()> {
        self.context().replace_identity(identity)
    }
}

impl<T: HttpTransport> SessionStore<T> {
    /// Sign in and persist the resulting session.
    ///
    /// # Errors
    ///
    /// Returns the API error when the server refuses the credentials, or a
    /// storage error when the session cannot be persisted. The session is
    /// unchanged in both cases.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<()> {
        let identity = self.api.login(credentials).await?;
        let credential = Credential::derive_from(&identity)?;
        if let Err(err) = self.context().establish(identity, credential) {
            warn!(error = %err, "failed to persist session");
            self.notifier.notify(Notice::error(err.message()));
            return Err(err);
        }
        info!(role = ?self.role(), "signed in");
        self.notifier.notify(Notice::success(MSG_LOGIN_OK));
        Ok(())
    }

    /// Create an account. The session is not touched.
    ///
    /// # Errors
    ///
    /// Returns the API error when the server rejects the registration.
    pub async fn register(&self, registration: &Registration) -> ApiResult<()> {
        self.api.register(registration).await?;
        info!("registered new account");
        self.notifier.notify(Notice::success(MSG_REGISTERED));
        Ok(())
    }

    /// Sign out.
    ///
    /// The server is told first on a best-effort basis; the local session is
    /// cleared whatever it answers.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            warn!(error = %err, "server logout failed");
        }
        self.context().invalidate();
        info!("signed out");
        self.notifier.notify(Notice::success(MSG_LOGGED_OUT));
    }
}
