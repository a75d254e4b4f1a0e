//! Typed client for the Bullpen coaching API.
//!
//! - [`config`]: client settings loaded from disk and the environment.
//! - [`transport`]: the [`HttpTransport`] seam and its reqwest implementation.
//! - [`executor`]: contract-checked execution of registry operations.
//! - [`error`]: the [`ClientError`] taxonomy every call resolves to.
//!
//! The `testing` feature adds a scripted transport for offline tests.

pub mod config;
pub mod error;
pub mod executor;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use config::{ClientConfig, ConfigError, default_config_path};
pub use error::ClientError;
pub use executor::{Executor, RequestParts, ValidatedResponse, decode};
pub use transport::{BullpenClient, HttpRequest, HttpResponse, HttpTransport, NetworkError};
