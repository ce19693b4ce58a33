//! HTTP transport types shared by operations, transports and the error mapper.
//!
//! # Design
//! Requests and responses are plain data. Operations build `HttpRequest`
//! values without touching the network, a `Transport` executes them, and the
//! result comes back as a `TransportOutcome`: an optional response plus an
//! optional low-level failure. Keeping both halves optional mirrors what a
//! callback-style HTTP stack actually reports, and lets the error mapper
//! classify every shape in one place.

use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// HTTP method for a request. The MealDB endpoints are read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// An HTTP request described as plain data.
///
/// Built by `Operation::request`. The transport is responsible for executing
/// it and reporting a `TransportOutcome`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// A `GET` request that asks for JSON.
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }
}

/// An HTTP response described as plain data. Any status, including non-2xx,
/// is delivered this way.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// What the underlying HTTP stack recognized about a failure that produced
/// no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowLevelErrorKind {
    /// The request sat idle past the client's deadline.
    TimedOut,
    /// An established connection was dropped mid-exchange.
    NetworkConnectionLost,
    /// No route to the host could be established at all.
    NotConnectedToInternet,
    /// The request was cancelled before it resolved.
    Cancelled,
    Other,
}

/// A transport-level failure, before domain classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LowLevelError {
    pub kind: LowLevelErrorKind,
    pub message: String,
}

impl LowLevelError {
    pub fn new(kind: LowLevelErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timed_out() -> Self {
        Self::new(LowLevelErrorKind::TimedOut, "the request timed out")
    }

    pub fn connection_lost() -> Self {
        Self::new(
            LowLevelErrorKind::NetworkConnectionLost,
            "the network connection was lost",
        )
    }

    pub fn not_connected() -> Self {
        Self::new(
            LowLevelErrorKind::NotConnectedToInternet,
            "the device is not connected to a network",
        )
    }

    pub fn cancelled() -> Self {
        Self::new(LowLevelErrorKind::Cancelled, "the request was cancelled")
    }
}

/// The raw result of executing one `HttpRequest`.
///
/// A well-behaved transport sets exactly one of the two fields. The error
/// mapper still handles the other shapes.
#[derive(Debug, Clone, Default)]
pub struct TransportOutcome {
    pub response: Option<HttpResponse>,
    pub error: Option<LowLevelError>,
}

impl TransportOutcome {
    pub fn response(response: HttpResponse) -> Self {
        Self {
            response: Some(response),
            error: None,
        }
    }

    pub fn failure(error: LowLevelError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }
}
