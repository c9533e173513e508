//! Scripted transport shared by integration tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use enrollment_client::domain::ports::{
    ApiRequest, HttpMethod, HttpTransport, RawResponse, TransportFailure,
};
use serde_json::Value;

/// One expected exchange.
pub struct Exchange {
    pub method: HttpMethod,
    pub path: &'static str,
    pub reply: Result<RawResponse, TransportFailure>,
}

impl Exchange {
    pub fn ok(method: HttpMethod, path: &'static str, body: Value) -> Self {
        Self {
            method,
            path,
            reply: Ok(RawResponse::new(200, Some(body))),
        }
    }

    pub fn unreachable(method: HttpMethod, path: &'static str) -> Self {
        Self {
            method,
            path,
            reply: Err(TransportFailure::connection("connection refused")),
        }
    }
}

/// Transport replaying exchanges strictly in order.
#[derive(Default)]
pub struct ScriptedTransport {
    exchanges: Mutex<VecDeque<Exchange>>,
    bearers: Mutex<Vec<Option<String>>>,
}

impl ScriptedTransport {
    pub fn new(exchanges: impl IntoIterator<Item = Exchange>) -> Self {
        Self {
            exchanges: Mutex::new(exchanges.into_iter().collect()),
            bearers: Mutex::default(),
        }
    }

    /// Bearer credential seen on each request, oldest first.
    pub fn bearers(&self) -> Vec<Option<String>> {
        self.bearers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exchanges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<String>,
    ) -> Result<RawResponse, TransportFailure> {
        self.bearers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(bearer);
        let next = self
            .exchanges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(exchange) => {
                assert_eq!(
                    (exchange.method, exchange.path),
                    (request.method, request.path.as_str()),
                    "unexpected request order"
                );
                exchange.reply
            }
            None => panic!("unscripted request: {} {}", request.method, request.path),
        }
    }
}
