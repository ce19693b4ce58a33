//! Client core for the MealDB dessert catalogue.
//!
//! # Overview
//! Fetches the dessert list and per-dessert recipes, tolerates partially
//! malformed responses, and reports failures as one of two error families:
//! retryable `TransportError`s and the non-retryable
//! `ModelError::PermanentResponseFailure`.
//!
//! # Design
//! - `Operation`s build requests and decode bodies without I/O.
//! - A `Transport` executes requests through a completion callback and hands
//!   back a `CancelHandle`; `ReqwestTransport` is the live implementation.
//! - `error::classify` is a pure mapping from status / low-level error to
//!   `TransportError`.
//! - `Model` bridges the callback into `async` calls, tracks in-flight handles
//!   in a `HandleRegistry`, and publishes the list and a refreshing flag via
//!   `tokio::sync::watch`.

pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod operation;
pub mod registry;
pub mod transport;
pub mod types;

pub use config::{ApiConfig, ConfigError};
pub use error::{classify, Error, ModelError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, LowLevelError, LowLevelErrorKind, TransportOutcome};
pub use model::Model;
pub use operation::{DecodeError, GetDessertDetail, GetDesserts, Operation};
pub use registry::{HandleRegistry, RequestId};
pub use transport::{CancelHandle, Completion, ReqwestTransport, Transport};
pub use types::{DessertDetail, DessertResult, Ingredient};
