//! Driven port for issuing requests against the enrollment REST API.
//!
//! The port deals in raw status codes and JSON bodies. Interpreting the
//! response envelope, notifying the user and invalidating the session all
//! happen in [`crate::domain::ApiClient`], so adapters stay transport-only.

use std::fmt;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Value;

use super::define_port_error;

/// HTTP verbs used by the enrollment API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Characters escaped when a segment is rendered into [`ApiRequest::path`].
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One request relative to the API base path.
///
/// The path is held as decoded segments so identifiers never change which
/// endpoint is addressed; adapters percent-encode each segment on the way
/// out.
///
/// # Examples
///
/// ```
/// use enrollment_client::domain::ports::{ApiRequest, HttpMethod};
///
/// let request = ApiRequest::get("/student/enrollments").with_segment("B1/../x");
/// assert_eq!(request.method, HttpMethod::Get);
/// assert_eq!(request.segments, ["student", "enrollments", "B1/../x"]);
/// assert_eq!(request.path, "/student/enrollments/B1%2F..%2Fx");
///
/// let request = ApiRequest::delete("/student/drop")
///     .with_query("studentId", "B1")
///     .with_query("classId", 42);
/// assert_eq!(request.query.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Decoded path segments below the API base.
    pub segments: Vec<String>,
    /// Percent-encoded rendering of `segments`, always starting with `/`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Build a request for a fixed route such as `/courses/available`.
    ///
    /// `route` is split on `/`; caller-supplied values belong in
    /// [`ApiRequest::with_segment`] instead.
    pub fn new(method: HttpMethod, route: &str) -> Self {
        let request = Self {
            method,
            segments: Vec::new(),
            path: String::new(),
            query: Vec::new(),
            body: None,
        };
        route
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(request, Self::with_segment)
    }

    /// Shorthand for a `GET` request.
    pub fn get(route: &str) -> Self {
        Self::new(HttpMethod::Get, route)
    }

    /// Shorthand for a `POST` request.
    pub fn post(route: &str) -> Self {
        Self::new(HttpMethod::Post, route)
    }

    /// Shorthand for a `PUT` request.
    pub fn put(route: &str) -> Self {
        Self::new(HttpMethod::Put, route)
    }

    /// Shorthand for a `DELETE` request.
    pub fn delete(route: &str) -> Self {
        Self::new(HttpMethod::Delete, route)
    }

    /// Append one path segment taken verbatim, `/` and `#` included.
    #[must_use]
    pub fn with_segment(mut self, segment: impl ToString) -> Self {
        let segment = segment.to_string();
        self.path.push('/');
        self.path.extend(utf8_percent_encode(&segment, SEGMENT));
        self.segments.push(segment);
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status code and decoded body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body, when the server sent one that parses.
    pub body: Option<Value>,
}

impl RawResponse {
    /// Convenience constructor used by adapters and test doubles.
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

define_port_error! {
    /// Failures raised before any HTTP response was received.
    pub enum TransportFailure {
        /// The connection could not be established or was dropped.
        Connection { message: String } =>
            "connection failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "request timed out: {message}",
        /// The adapter could not build the request, including paths with
        /// empty, `.` or `..` segments.
        InvalidRequest { message: String } =>
            "request could not be built: {message}",
    }
}

/// Port for sending one request and returning the raw response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute `request`, attaching `bearer` as an `Authorization` header when
    /// present.
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<String>,
    ) -> Result<RawResponse, TransportFailure>;
}
