//! Composition root tying the domain to concrete adapters.

use std::sync::Arc;

use crate::config::{ClientSettings, SettingsError};
use crate::domain::ports::{HttpTransport, KeyValueStore, Notifier, StorageError, TransportFailure};
use crate::domain::{ApiClient, CourseStore, ProfileStore, Router, SessionContext, SessionStore};
use crate::outbound::http::ReqwestTransport;
use crate::outbound::storage::FileKeyValueStore;

/// Failures while assembling [`ClientServices`] from settings.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    /// Settings did not validate.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The session directory could not be opened.
    #[error("failed to open session storage: {0}")]
    Storage(#[from] StorageError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] TransportFailure),
}

/// Every long-lived client component, sharing one [`SessionContext`].
pub struct ClientServices<T> {
    /// Authentication state.
    pub session: Arc<SessionContext>,
    /// Route tracking and guard.
    pub router: Arc<Router>,
    /// Typed REST client.
    pub api: Arc<ApiClient<T>>,
    /// Login, registration and logout.
    pub session_store: SessionStore<T>,
    /// Course catalogue and enrollments.
    pub courses: CourseStore<T>,
    /// Profile of the signed-in user.
    pub profile: ProfileStore<T>,
}

impl<T: HttpTransport> ClientServices<T> {
    /// Wire the domain over `transport` and `storage`.
    ///
    /// The router doubles as the API client's navigator, so a 401 anywhere
    /// moves the router to the login page.
    pub fn new(
        transport: Arc<T>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = Arc::new(SessionContext::new(storage));
        let router = Arc::new(Router::new(session.clone(), notifier.clone()));
        let api = Arc::new(ApiClient::new(
            transport,
            session.clone(),
            notifier.clone(),
            router.clone(),
        ));
        Self {
            session_store: SessionStore::new(api.clone(), notifier),
            courses: CourseStore::new(api.clone()),
            profile: ProfileStore::new(api.clone()),
            session,
            router,
            api,
        }
    }
}

impl ClientServices<ReqwestTransport> {
    /// Wire the production adapters described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns a [`WiringError`] when the settings are invalid, the session
    /// directory cannot be opened or the HTTP client cannot be built.
    pub fn from_settings(
        settings: &ClientSettings,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, WiringError> {
        let transport = ReqwestTransport::new(
            settings.base_url()?,
            settings.timeout()?,
            settings.user_agent(),
        )?;
        let storage = FileKeyValueStore::open(&settings.storage_dir())?;
        Ok(Self::new(Arc::new(transport), Arc::new(storage), notifier))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::ports::RecordingNotifier;

    #[rstest]
    fn production_wiring_starts_signed_out_at_root() {
        let tmp = TempDir::new().expect("temp dir");
        let settings = ClientSettings {
            base_url: None,
            timeout_ms: None,
            storage_dir: Some(tmp.path().join("session")),
            user_agent: None,
        };

        let services = ClientServices::from_settings(&settings, Arc::new(RecordingNotifier::new()))
            .expect("wiring succeeds");

        assert!(!services.session.is_authenticated());
        assert_eq!(services.router.current().path, "/");
        assert!(!services.courses.is_busy());
    }

    #[rstest]
    fn invalid_settings_are_reported() {
        let settings = ClientSettings {
            base_url: None,
            timeout_ms: Some(0),
            storage_dir: None,
            user_agent: None,
        };
        let result = ClientServices::from_settings(&settings, Arc::new(RecordingNotifier::new()));
        assert!(matches!(
            result,
            Err(WiringError::Settings(SettingsError::ZeroTimeout))
        ));
    }
}
