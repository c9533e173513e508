//! User identity and role model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account role assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Enrolled student.
    Student,
    /// Teaching staff.
    Teacher,
    /// Administrator; passes every role check.
    Admin,
}

impl Role {
    /// Wire representation, e.g. `STUDENT`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Teacher => "TEACHER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Self::Student),
            "TEACHER" => Ok(Self::Teacher),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(UnknownRole(value.to_owned())),
        }
    }
}

/// Whether an account holding `current` may access something that requires
/// `required`.
///
/// Administrators pass every check; other roles only match themselves.
///
/// # Examples
///
/// ```
/// use enrollment_client::domain::{Role, permits};
///
/// assert!(permits(Role::Admin, Role::Student));
/// assert!(!permits(Role::Student, Role::Admin));
/// ```
pub fn permits(current: Role, required: Role) -> bool {
    current == Role::Admin || current == required
}

/// Identity returned by the server at login.
///
/// Fields the client does not interpret are kept in `profile` so the record
/// persists and restores without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Display name; empty when the server omits it.
    #[serde(default)]
    pub name: String,
    /// Role name, e.g. `STUDENT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<Role>,
    /// Student number or staff number.
    #[serde(default)]
    pub identifier: String,
    /// Remaining profile fields, untouched.
    #[serde(flatten)]
    pub profile: BTreeMap<String, Value>,
}

impl UserRecord {
    /// Create a record with the three interpreted fields set.
    pub fn new(name: impl Into<String>, role: Role, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role_name: Some(role),
            identifier: identifier.into(),
            profile: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Role::Student, Role::Student, true)]
    #[case(Role::Student, Role::Admin, false)]
    #[case(Role::Student, Role::Teacher, false)]
    #[case(Role::Teacher, Role::Student, false)]
    #[case(Role::Teacher, Role::Teacher, true)]
    #[case(Role::Admin, Role::Student, true)]
    #[case(Role::Admin, Role::Teacher, true)]
    #[case(Role::Admin, Role::Admin, true)]
    fn permits_follows_admin_bypass(
        #[case] current: Role,
        #[case] required: Role,
        #[case] expected: bool,
    ) {
        assert_eq!(permits(current, required), expected);
    }

    #[rstest]
    #[case("STUDENT", Role::Student)]
    #[case("teacher", Role::Teacher)]
    #[case(" Admin ", Role::Admin)]
    fn role_names_parse_case_insensitively(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>().expect("known role"), expected);
    }

    #[test]
    fn unknown_role_names_are_rejected() {
        let err = "DEAN".parse::<Role>().expect_err("unknown role");
        assert_eq!(err.to_string(), "unknown role: DEAN");
    }

    #[test]
    fn user_record_keeps_unknown_fields() {
        let raw = json!({
            "identifier": "B1",
            "roleName": "STUDENT",
            "email": "b1@example.edu",
            "departmentId": 7
        });

        let record: UserRecord = serde_json::from_value(raw.clone()).expect("decode");
        assert_eq!(record.role_name, Some(Role::Student));
        assert_eq!(record.name, "");
        assert_eq!(record.profile.get("departmentId"), Some(&json!(7)));
        assert_eq!(serde_json::to_value(&record).expect("encode"), json!({
            "name": "",
            "roleName": "STUDENT",
            "identifier": "B1",
            "email": "b1@example.edu",
            "departmentId": 7
        }));
    }
}
