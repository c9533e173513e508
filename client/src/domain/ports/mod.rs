//! Driven ports through which the domain reaches transport, storage, the
//! notification banner and the router.

mod macros;
pub(crate) use macros::define_port_error;

mod http_transport;
mod key_value_store;
mod navigator;
mod notifier;

#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{ApiRequest, HttpMethod, HttpTransport, RawResponse, TransportFailure};
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{InMemoryKeyValueStore, KeyValueStore, StorageError};
pub use navigator::{Navigator, RecordingNavigator};
pub use notifier::{Notice, NoticeLevel, Notifier, RecordingNotifier};
