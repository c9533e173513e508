//! Reqwest-backed transport adapter.
//!
//! This adapter owns transport details only: URL building, the bearer header,
//! the request timeout and JSON body decoding. Status codes are passed through
//! untouched for the API client to interpret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{ApiRequest, HttpMethod, HttpTransport, RawResponse, TransportFailure};

/// Transport that sends every request below one API base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure::InvalidRequest`] when the reqwest client
    /// cannot be constructed.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| TransportFailure::invalid_request(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// API root every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<String>,
    ) -> Result<RawResponse, TransportFailure> {
        let url = endpoint_url(&self.base_url, &request.segments)?;
        let mut builder = self
            .client
            .request(method(request.method), url)
            .header(reqwest::header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            method = %request.method,
            path = %request.path,
            status,
            bytes = bytes.len(),
            "received API response"
        );
        Ok(RawResponse::new(status, parse_body(bytes.as_ref())))
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn endpoint_url(base: &Url, segments: &[String]) -> Result<Url, TransportFailure> {
    // `Url` drops `.` and `..` when extending, which would address another
    // endpoint.
    if let Some(segment) = segments
        .iter()
        .find(|segment| matches!(segment.as_str(), "" | "." | ".."))
    {
        return Err(TransportFailure::invalid_request(format!(
            "path segment `{segment}` cannot be sent"
        )));
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| {
            TransportFailure::invalid_request(format!("base URL `{base}` cannot carry a path"))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "response body is not JSON");
            None
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::timeout(error.to_string())
    } else if error.is_builder() {
        TransportFailure::invalid_request(error.to_string())
    } else {
        TransportFailure::connection(error.to_string())
    }
}
