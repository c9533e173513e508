//! Outbound adapters implementing the domain ports.
//!
//! - **http**: reqwest-backed [`crate::domain::ports::HttpTransport`]
//! - **storage**: file-backed [`crate::domain::ports::KeyValueStore`]
//! - **notify**: tracing and console [`crate::domain::ports::Notifier`]s
//!
//! Adapters translate between domain types and infrastructure details. They
//! contain no business logic.

pub mod http;
pub mod notify;
pub mod storage;
