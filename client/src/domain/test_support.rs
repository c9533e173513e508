//! Scripted transport and harness shared by the store tests.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::ports::{
    ApiRequest, HttpMethod, HttpTransport, InMemoryKeyValueStore, RawResponse, RecordingNavigator,
    RecordingNotifier, TransportFailure,
};
use super::{ApiClient, SessionContext};

type Probe = Box<dyn Fn() -> bool + Send + Sync>;

/// Replies to each request with the first queued response for its route.
///
/// Unscripted routes fail as if the server were unreachable.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<Vec<(HttpMethod, String, Result<RawResponse, TransportFailure>)>>,
    calls: Mutex<Vec<ApiRequest>>,
    probe: OnceLock<Probe>,
    observed: Mutex<Vec<bool>>,
}

impl ScriptedTransport {
    pub(crate) fn reply(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        self.lock_script()
            .push((method, path.to_owned(), Ok(RawResponse::new(status, Some(body)))));
    }

    pub(crate) fn fail(&self, method: HttpMethod, path: &str, failure: TransportFailure) {
        self.lock_script().push((method, path.to_owned(), Err(failure)));
    }

    /// Sample `probe` on every request, typically a store's busy flag.
    pub(crate) fn observe(&self, probe: impl Fn() -> bool + Send + Sync + 'static) {
        assert!(self.probe.set(Box::new(probe)).is_ok(), "probe already set");
    }

    pub(crate) fn observed(&self) -> Vec<bool> {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.path).collect()
    }

    fn lock_script(
        &self,
    ) -> std::sync::MutexGuard<'_, Vec<(HttpMethod, String, Result<RawResponse, TransportFailure>)>>
    {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        _bearer: Option<String>,
    ) -> Result<RawResponse, TransportFailure> {
        if let Some(probe) = self.probe.get() {
            self.observed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(probe());
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let mut script = self.lock_script();
        let position = script
            .iter()
            .position(|(method, path, _)| *method == request.method && *path == request.path);
        match position {
            Some(index) => script.remove(index).2,
            None => Err(TransportFailure::connection(format!(
                "no scripted reply for {} {}",
                request.method, request.path
            ))),
        }
    }
}

pub(crate) struct Harness {
    pub(crate) transport: Arc<ScriptedTransport>,
    pub(crate) api: Arc<ApiClient<ScriptedTransport>>,
    pub(crate) notifier: Arc<RecordingNotifier>,
}

pub(crate) fn harness() -> Harness {
    let transport = Arc::new(ScriptedTransport::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let session = Arc::new(SessionContext::new(Arc::new(InMemoryKeyValueStore::new())));
    let api = Arc::new(ApiClient::new(
        transport.clone(),
        session,
        notifier.clone(),
        Arc::new(RecordingNavigator::new()),
    ));
    Harness {
        transport,
        api,
        notifier,
    }
}
