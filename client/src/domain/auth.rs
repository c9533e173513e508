//! Login and registration payloads.
//!
//! Constructors validate raw input before anything reaches the transport so
//! an empty field never costs a round trip.

use std::fmt;

use serde::Serialize;
use zeroize::Zeroizing;

use super::Role;

/// Validation errors for login and registration input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Account identifier was missing or blank once trimmed.
    #[error("account identifier must not be empty")]
    EmptyAccount,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Display name was blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Email did not look like an address.
    #[error("email must contain '@'")]
    InvalidEmail,
    /// Registration role requires an identifier that was not supplied.
    #[error("{role} registration requires an identifier")]
    MissingIdentifier {
        /// Role being registered.
        role: Role,
    },
}

/// Which account field the user logs in with.
///
/// Serialises as a single camelCase key, e.g. `{"studentId": "B1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoginAccount {
    /// Student number.
    StudentId(String),
    /// Staff number.
    TeacherId(String),
    /// Email address.
    Email(String),
}

impl LoginAccount {
    fn value(&self) -> &str {
        match self {
            Self::StudentId(value) | Self::TeacherId(value) | Self::Email(value) => value,
        }
    }
}

impl fmt::Display for LoginAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Validated login payload.
///
/// ## Invariants
/// - the account value is trimmed and non-empty.
/// - the password is non-empty and keeps caller whitespace.
///
/// # Examples
///
/// ```
/// use enrollment_client::domain::{LoginAccount, LoginCredentials};
///
/// let creds = LoginCredentials::try_new(LoginAccount::StudentId(" B1 ".into()), "x").unwrap();
/// assert_eq!(
///     serde_json::to_value(&creds).unwrap(),
///     serde_json::json!({ "studentId": "B1", "password": "x" }),
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginCredentials {
    #[serde(flatten)]
    account: LoginAccount,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw login input.
    pub fn try_new(
        account: LoginAccount,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let account = match account {
            LoginAccount::StudentId(value) => LoginAccount::StudentId(trimmed(&value)?),
            LoginAccount::TeacherId(value) => LoginAccount::TeacherId(trimmed(&value)?),
            LoginAccount::Email(value) => LoginAccount::Email(trimmed(&value)?),
        };
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            account,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Account the user is logging in with.
    pub fn account(&self) -> &LoginAccount {
        &self.account
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn trimmed(value: &str) -> Result<String, CredentialsValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CredentialsValidationError::EmptyAccount);
    }
    Ok(value.to_owned())
}

/// Validated registration payload.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    name: String,
    email: String,
    password: Zeroizing<String>,
    role_name: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    teacher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
}

impl Registration {
    /// Validate registration input.
    ///
    /// Students must supply a student number and teachers a staff number;
    /// administrators are created without either.
    pub fn try_new(
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        identifier: Option<&str>,
    ) -> Result<Self, CredentialsValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CredentialsValidationError::EmptyName);
        }
        let email = email.trim();
        if !email.contains('@') {
            return Err(CredentialsValidationError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        let identifier = identifier.map(str::trim).filter(|value| !value.is_empty());
        let (student_id, teacher_id) = match (role, identifier) {
            (Role::Student, Some(id)) => (Some(id.to_owned()), None),
            (Role::Teacher, Some(id)) => (None, Some(id.to_owned())),
            (Role::Admin, _) => (None, None),
            (role, None) => return Err(CredentialsValidationError::MissingIdentifier { role }),
        };
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            role_name: role,
            student_id,
            teacher_id,
            phone: None,
        })
    }

    /// Attach an optional phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Email address being registered.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role_name", &self.role_name)
            .finish_non_exhaustive()
    }
}
