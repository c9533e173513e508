//! Route table, navigation guard and router.
//!
//! [`guard`] is a pure function of the target route and the session; the
//! [`Router`] applies its decisions, follows redirects and forwards notices.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::ports::{Navigator, Notice, Notifier};
use super::{Role, Session, SessionContext, permits};

/// Application root; redirects to the login page.
pub const ROOT_PATH: &str = "/";
/// Login page.
pub const LOGIN_PATH: &str = "/login";
/// Registration page.
pub const REGISTER_PATH: &str = "/register";
/// Landing page for signed-in users.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Name given to paths matching no route.
pub const NOT_FOUND_NAME: &str = "NotFound";

pub(crate) const MSG_NO_PERMISSION: &str = "you do not have permission to access this page";
const MAX_REDIRECTS: usize = 8;

/// Static description of one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    /// Absolute path.
    pub path: &'static str,
    /// Route name.
    pub name: &'static str,
    /// Whether a signed-in session is needed.
    pub requires_auth: bool,
    /// Role needed, if any. Administrators pass every role check.
    pub role: Option<Role>,
    /// Unconditional redirect target.
    pub redirect: Option<&'static str>,
}

const fn public(path: &'static str, name: &'static str) -> RouteDef {
    RouteDef {
        path,
        name,
        requires_auth: false,
        role: None,
        redirect: None,
    }
}

const fn dashboard(path: &'static str, name: &'static str, role: Option<Role>) -> RouteDef {
    RouteDef {
        path,
        name,
        requires_auth: true,
        role,
        redirect: None,
    }
}

/// Every known route. Dashboard children inherit `requires_auth`.
pub const ROUTES: &[RouteDef] = &[
    RouteDef {
        path: ROOT_PATH,
        name: "Root",
        requires_auth: false,
        role: None,
        redirect: Some(LOGIN_PATH),
    },
    public(LOGIN_PATH, "Login"),
    public(REGISTER_PATH, "Register"),
    dashboard(DASHBOARD_PATH, "Dashboard", None),
    dashboard("/dashboard/student/courses", "StudentCourses", Some(Role::Student)),
    dashboard("/dashboard/student/enrollments", "StudentEnrollments", Some(Role::Student)),
    dashboard("/dashboard/student/grades", "StudentGrades", Some(Role::Student)),
    dashboard("/dashboard/student/profile", "StudentProfile", Some(Role::Student)),
    dashboard("/dashboard/admin/users", "AdminUsers", Some(Role::Admin)),
    dashboard("/dashboard/admin/courses", "AdminCourses", Some(Role::Admin)),
    dashboard("/dashboard/admin/classes", "AdminClasses", Some(Role::Admin)),
    dashboard("/dashboard/profile", "Profile", None),
];

/// A path matched against [`ROUTES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Normalised path.
    pub path: String,
    /// Route name, or [`NOT_FOUND_NAME`].
    pub name: &'static str,
    /// Whether a signed-in session is needed.
    pub requires_auth: bool,
    /// Role needed, if any.
    pub role: Option<Role>,
    /// Unconditional redirect target.
    pub redirect: Option<&'static str>,
}

/// Match `path` against the route table.
///
/// Query strings, fragments and trailing slashes are ignored. Unknown paths
/// resolve to the public catch-all route.
///
/// # Examples
///
/// ```
/// use enrollment_client::domain::{Role, resolve};
///
/// let route = resolve("/dashboard/admin/users/?tab=all");
/// assert_eq!(route.name, "AdminUsers");
/// assert_eq!(route.role, Some(Role::Admin));
/// assert_eq!(resolve("/nowhere").name, "NotFound");
/// ```
pub fn resolve(path: &str) -> ResolvedRoute {
    let path = normalise(path);
    match ROUTES.iter().find(|route| route.path == path) {
        Some(route) => ResolvedRoute {
            path,
            name: route.name,
            requires_auth: route.requires_auth,
            role: route.role,
            redirect: route.redirect,
        },
        None => ResolvedRoute {
            path,
            name: NOT_FOUND_NAME,
            requires_auth: false,
            role: None,
            redirect: None,
        },
    }
}

fn normalise(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        ROOT_PATH.to_owned()
    } else if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Guard verdict for one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the target.
    Allow,
    /// Go elsewhere, optionally telling the user why.
    Redirect {
        /// Replacement target.
        to: &'static str,
        /// Notice to show.
        notice: Option<Notice>,
    },
}

/// Decide whether `session` may enter `target`.
///
/// Checks run in order: authentication, signed-in users hitting the login or
/// root page, then role.
pub fn guard(target: &ResolvedRoute, session: &Session) -> NavigationDecision {
    let authenticated = session.is_authenticated();

    if target.requires_auth && !authenticated {
        return NavigationDecision::Redirect {
            to: LOGIN_PATH,
            notice: Some(Notice::warning(super::api_client::MSG_LOGIN_REQUIRED)),
        };
    }

    if authenticated && (target.path == LOGIN_PATH || target.path == ROOT_PATH) {
        return NavigationDecision::Redirect {
            to: DASHBOARD_PATH,
            notice: None,
        };
    }

    if let Some(required) = target.role {
        let allowed = session.role().is_some_and(|current| permits(current, required));
        if !allowed {
            return NavigationDecision::Redirect {
                to: DASHBOARD_PATH,
                notice: Some(Notice::error(MSG_NO_PERMISSION)),
            };
        }
    }

    NavigationDecision::Allow
}

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Route finally entered.
    pub route: ResolvedRoute,
    /// Path originally requested.
    pub requested: String,
}

impl NavigationOutcome {
    /// Whether the guard or the route table sent the user elsewhere.
    pub fn was_redirected(&self) -> bool {
        self.route.path != normalise(&self.requested)
    }
}

/// Applies [`guard`] to every transition and tracks the current route.
pub struct Router {
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
    current: RwLock<ResolvedRoute>,
}

impl Router {
    /// Create a router positioned at [`ROOT_PATH`].
    pub fn new(session: Arc<SessionContext>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            notifier,
            current: RwLock::new(resolve(ROOT_PATH)),
        }
    }

    /// Route the router currently sits on.
    pub fn current(&self) -> ResolvedRoute {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigate to `path`, following guard and table redirects.
    pub fn navigate(&self, path: &str) -> NavigationOutcome {
        let session = self.session.session();
        let mut target = resolve(path);

        for _ in 0..MAX_REDIRECTS {
            let next = match guard(&target, &session) {
                NavigationDecision::Redirect { to, notice } => {
                    if let Some(notice) = notice {
                        self.notifier.notify(notice);
                    }
                    to
                }
                NavigationDecision::Allow => match target.redirect {
                    Some(to) => to,
                    None => break,
                },
            };
            debug!(from = %target.path, to = next, "navigation redirected");
            target = resolve(next);
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = target.clone();
        NavigationOutcome {
            route: target,
            requested: path.to_owned(),
        }
    }
}

impl Navigator for Router {
    fn push(&self, path: &str) {
        self.navigate(path);
    }
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
