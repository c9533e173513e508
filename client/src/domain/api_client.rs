//! API client that turns raw transport results into [`ApiError`]s.
//!
//! Every failure is pushed to the [`Notifier`] before being returned, so
//! stores never need to show banners themselves. A 401 additionally
//! invalidates the shared [`SessionContext`] and sends the router to the
//! login page.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::navigation::LOGIN_PATH;
use super::ports::{
    ApiRequest, HttpTransport, Navigator, Notice, Notifier, RawResponse, TransportFailure,
};
use super::{ApiError, Envelope, SessionContext};

pub(crate) const MSG_OPERATION_FAILED: &str = "operation failed";
pub(crate) const MSG_LOGIN_REQUIRED: &str = "please log in";
pub(crate) const MSG_FORBIDDEN: &str = "forbidden";
pub(crate) const MSG_NOT_FOUND: &str = "resource not found";
pub(crate) const MSG_SERVER_ERROR: &str = "server error";
pub(crate) const MSG_REQUEST_FAILED: &str = "request failed";
pub(crate) const MSG_NETWORK_ERROR: &str = "network error, check your connection";
pub(crate) const MSG_REQUEST_NOT_SENT: &str = "request could not be sent";

/// Typed client over an [`HttpTransport`].
pub struct ApiClient<T> {
    transport: Arc<T>,
    session: Arc<SessionContext>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl<T> ApiClient<T> {
    /// Create a client sharing `session` with the rest of the application.
    pub fn new(
        transport: Arc<T>,
        session: Arc<SessionContext>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            notifier,
            navigator,
        }
    }

    /// Session context the client reads credentials from.
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn fail(&self, err: ApiError) -> ApiError {
        self.notifier.notify(Notice::error(err.message()));
        err
    }

    fn interpret(&self, response: RawResponse) -> Result<Envelope, ApiError> {
        if !response.is_success() {
            return Err(self.reject_status(response));
        }

        let envelope = Envelope::from_body(response.body);
        if !envelope.success {
            let message = envelope.message().unwrap_or(MSG_OPERATION_FAILED).to_owned();
            return Err(self.fail(ApiError::rejected(message)));
        }
        Ok(envelope)
    }

    fn reject_status(&self, response: RawResponse) -> ApiError {
        match response.status {
            401 => {
                warn!("credential rejected; clearing session");
                self.session.invalidate();
                let err = self.fail(ApiError::unauthorized(MSG_LOGIN_REQUIRED));
                self.navigator.push(LOGIN_PATH);
                err
            }
            403 => self.fail(ApiError::forbidden(MSG_FORBIDDEN)),
            404 => self.fail(ApiError::not_found(MSG_NOT_FOUND)),
            500 => self.fail(ApiError::server(MSG_SERVER_ERROR)),
            status => {
                let message = server_message(response.body.as_ref())
                    .unwrap_or(MSG_REQUEST_FAILED)
                    .to_owned();
                self.fail(ApiError::status_code(status, message))
            }
        }
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Send `request` and return the successful envelope.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for network failures, non-2xx statuses and
    /// `success: false` envelopes. The user has already been notified.
    pub async fn send(&self, request: ApiRequest) -> Result<Envelope, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending API request");
        let bearer = self.session.stored_credential();
        match self.transport.execute(&request, bearer).await {
            Ok(response) => self.interpret(response),
            Err(failure) => {
                warn!(path = %request.path, error = %failure, "request produced no response");
                let err = match failure {
                    TransportFailure::InvalidRequest { .. } => {
                        ApiError::invalid_request(MSG_REQUEST_NOT_SENT)
                    }
                    TransportFailure::Connection { .. } | TransportFailure::Timeout { .. } => {
                        ApiError::network(MSG_NETWORK_ERROR)
                    }
                };
                Err(self.fail(err))
            }
        }
    }

    /// Send `request` and decode its `data` payload.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::send`], plus [`super::ApiErrorKind::Decode`] when the
    /// payload has the wrong shape.
    pub async fn fetch<D: DeserializeOwned>(&self, request: ApiRequest) -> Result<D, ApiError> {
        let path = request.path.clone();
        let envelope = self.send(request).await?;
        envelope.into_data().map_err(|err| {
            warn!(path = %path, error = %err, "response payload did not match");
            self.fail(err)
        })
    }
}

fn server_message(body: Option<&Value>) -> Option<&str> {
    body?
        .get("message")?
        .as_str()
        .map(str::trim)
        .filter(|message| !message.is_empty())
}

#[cfg(test)]
#[path = "api_client_tests.rs"]
mod tests;
