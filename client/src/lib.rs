//! Client-side session, catalogue and navigation layer for the course
//! enrollment REST API.
//!
//! The crate follows a ports-and-adapters layout:
//!
//! - [`domain`] holds the session context, the mirrored stores, the typed API
//!   client and the navigation guard. It only talks to the outside world
//!   through the traits in [`domain::ports`].
//! - [`outbound`] provides the reqwest transport, durable key-value storage
//!   and notification adapters.
//! - [`config`] loads [`config::ClientSettings`] through OrthoConfig.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod wiring;

pub use config::ClientSettings;
pub use wiring::{ClientServices, WiringError};
