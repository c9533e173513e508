//! Local mirror of the signed-in user's profile.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::ports::HttpTransport;
use super::{ApiClient, ApiError, ApiResult, BusyFlag, Profile, ProfileUpdate};

pub(crate) const MSG_PROFILE_UPDATED: &str = "profile updated";
const MSG_PROFILE_LOAD_FAILED: &str = "failed to load profile";
const MSG_PROFILE_UPDATE_FAILED: &str = "failed to update profile";

/// Snapshot of the mirrored profile and the last action's outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileMirror {
    /// Last profile the server returned.
    pub profile: Option<Profile>,
    /// Message from the last failed action.
    pub error: Option<String>,
    /// Message from the last successful update.
    pub success_message: Option<String>,
}

/// Profile actions over a shared [`ApiClient`].
pub struct ProfileStore<T> {
    api: Arc<ApiClient<T>>,
    state: RwLock<ProfileMirror>,
    busy: BusyFlag,
}

impl<T> ProfileStore<T> {
    /// Create an empty store.
    pub fn new(api: Arc<ApiClient<T>>) -> Self {
        Self {
            api,
            state: RwLock::new(ProfileMirror::default()),
            busy: BusyFlag::new(),
        }
    }

    /// Whether a request issued by this store is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Clone of the mirrored state.
    pub fn snapshot(&self) -> ProfileMirror {
        self.read().clone()
    }

    /// Mirrored profile.
    pub fn profile(&self) -> Option<Profile> {
        self.read().profile.clone()
    }

    /// Forget the last error and success messages.
    pub fn clear_messages(&self) {
        let mut state = self.write();
        state.error = None;
        state.success_message = None;
    }

    fn record_failure(&self, err: &ApiError, fallback: &str) {
        let message = if err.message().trim().is_empty() {
            fallback
        } else {
            err.message()
        };
        self.write().error = Some(message.to_owned());
    }

    fn read(&self) -> RwLockReadGuard<'_, ProfileMirror> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProfileMirror> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: HttpTransport> ProfileStore<T> {
    /// Load `user_id`'s profile.
    ///
    /// # Errors
    ///
    /// Returns the API error and records its message; the mirrored profile
    /// is kept.
    pub async fn fetch_profile(&self, user_id: &str) -> ApiResult<()> {
        let _busy = self.busy.enter();
        self.write().error = None;
        match self.api.get_student_info(user_id).await {
            Ok(profile) => {
                debug!(user_id, "profile loaded");
                self.write().profile = Some(profile);
                Ok(())
            }
            Err(err) => {
                warn!(user_id, error = %err, "profile load failed");
                self.record_failure(&err, MSG_PROFILE_LOAD_FAILED);
                Err(err)
            }
        }
    }

    /// Save `update` and adopt the profile the server returns.
    ///
    /// # Errors
    ///
    /// Returns the API error and records its message; the mirrored profile
    /// is kept.
    pub async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> ApiResult<()> {
        let _busy = self.busy.enter();
        {
            let mut state = self.write();
            state.error = None;
            state.success_message = None;
        }
        match self.api.update_student_info(user_id, update).await {
            Ok(profile) => {
                debug!(user_id, "profile updated");
                let mut state = self.write();
                state.profile = Some(profile);
                state.success_message = Some(MSG_PROFILE_UPDATED.to_owned());
                Ok(())
            }
            Err(err) => {
                warn!(user_id, error = %err, "profile update failed");
                self.record_failure(&err, MSG_PROFILE_UPDATE_FAILED);
                Err(err)
            }
        }
    }
}
