//! Client-side domain: session, typed API client, stores and routing.
//!
//! Purpose: keep every rule that does not depend on a concrete transport,
//! storage medium or front end in one place. Adapters in
//! [`crate::outbound`] satisfy the [`ports`] declared here.
//!
//! Public surface:
//! - `SessionContext` / `SessionStore`: authentication state and its actions.
//! - `ApiClient`: typed REST client normalising every failure to `ApiError`.
//! - `CourseStore` / `ProfileStore`: local mirrors of server state.
//! - `Router` / `guard`: route table and navigation guard.

pub mod ports;

mod api_client;
mod api_endpoints;
pub mod auth;
mod busy;
pub mod catalogue;
mod course_store;
mod envelope;
pub mod error;
pub mod navigation;
pub mod profile;
mod profile_store;
pub mod session;
mod session_store;
pub mod user;

#[cfg(test)]
mod test_support;

pub use self::api_client::ApiClient;
pub use self::auth::{CredentialsValidationError, LoginAccount, LoginCredentials, Registration};
pub use self::busy::{BusyFlag, BusyGuard};
pub use self::catalogue::{
    AcademicTerm, AvailableClass, ConflictReport, Course, DEFAULT_ACADEMIC_YEAR, EnrollRequest,
    Enrollment, ProbeReport, Semester, UnknownSemester,
};
pub use self::course_store::{CourseCatalogMirror, CourseStore};
pub use self::envelope::Envelope;
pub use self::error::{ApiError, ApiErrorKind};
pub use self::navigation::{
    DASHBOARD_PATH, LOGIN_PATH, NOT_FOUND_NAME, NavigationDecision, NavigationOutcome,
    REGISTER_PATH, ROOT_PATH, ROUTES, ResolvedRoute, RouteDef, Router, guard, resolve,
};
pub use self::profile::{Profile, ProfileUpdate};
pub use self::profile_store::{ProfileMirror, ProfileStore};
pub use self::session::{Credential, Session, SessionContext, TOKEN_KEY, USER_INFO_KEY};
pub use self::session_store::SessionStore;
pub use self::user::{Role, UnknownRole, UserRecord, permits};

/// Result alias used by every client operation.
pub type ApiResult<T> = Result<T, ApiError>;
