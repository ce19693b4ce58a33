//! Error taxonomy and the transport error mapper.
//!
//! # Design
//! Callers see exactly two families of failure. `TransportError` covers
//! everything that went wrong on the way to a usable response body and is
//! worth retrying. `ModelError::PermanentResponseFailure` means a body arrived
//! but did not match the data contract, so retrying the same call will not
//! help. The `Display` text of each variant is the message shown to users.
//!
//! `classify` is the only place that turns a raw `(status, low-level error)`
//! pair into a `TransportError`. It is a pure function so every rule can be
//! tested without a network.

use bytes::Bytes;
use thiserror::Error;

use crate::http::{LowLevelError, LowLevelErrorKind, TransportOutcome};

/// Failures that happened before a usable response body was available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("The request took too long and timed out. Check your cellular or Wi-Fi connection and try again.")]
    Timeout,

    #[error("The request was interrupted by a connectivity failure. Check your cellular or Wi-Fi connection and try again.")]
    Connectivity,

    #[error("The service is unavailable. Please wait and try again. If this keeps happening, contact support.")]
    ServiceUnavailable,

    /// A status code with no dedicated user-facing reason.
    #[error("The request couldn't be completed (code: {status_code}). Please try again. If this keeps happening, contact support.")]
    Other { status_code: u16 },

    #[error("Something went wrong. If this keeps happening, contact support and include the details below.\n\n{0}")]
    Unknown(LowLevelError),
}

/// Failures in the data the service returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The response was structurally unusable. Occurrences should be reported
    /// to error tracking.
    #[error("Something went wrong and retrying is unlikely to help. Please contact support for assistance.")]
    PermanentResponseFailure,
}

/// Every failure a `Model` call can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Error {
    /// Transport failures may succeed when the caller repeats the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

const SUCCESS: std::ops::Range<u16> = 200..299;

/// Classify a completed exchange.
///
/// Status codes win over low-level errors when the status is not a success.
/// A success status that arrives together with a low-level error is decided
/// by the error.
pub fn classify(status: Option<u16>, error: Option<&LowLevelError>) -> Result<(), TransportError> {
    if let Some(code) = status {
        if !SUCCESS.contains(&code) {
            return Err(classify_status(code));
        }
        if error.is_none() {
            return Ok(());
        }
    }

    match error {
        Some(error) => Err(classify_low_level(error)),
        None => {
            if cfg!(debug_assertions) {
                panic!("transport completed with neither a response nor an error");
            }
            tracing::error!("transport completed with neither a response nor an error");
            Err(TransportError::Unknown(LowLevelError::new(
                LowLevelErrorKind::Other,
                "the transport produced no response",
            )))
        }
    }
}

/// Run `classify` over an outcome and hand back the body on success.
pub fn map_outcome(outcome: TransportOutcome) -> Result<Bytes, TransportError> {
    let status = outcome.response.as_ref().map(|response| response.status);
    classify(status, outcome.error.as_ref())?;
    Ok(outcome
        .response
        .map(|response| response.body)
        .unwrap_or_default())
}

fn classify_status(code: u16) -> TransportError {
    match code {
        408 | 502 | 504 => TransportError::Connectivity,
        500..=598 => TransportError::ServiceUnavailable,
        status_code => TransportError::Other { status_code },
    }
}

fn classify_low_level(error: &LowLevelError) -> TransportError {
    match error.kind {
        LowLevelErrorKind::TimedOut => TransportError::Timeout,
        LowLevelErrorKind::NetworkConnectionLost | LowLevelErrorKind::NotConnectedToInternet => {
            TransportError::Connectivity
        }
        LowLevelErrorKind::Cancelled | LowLevelErrorKind::Other => {
            TransportError::Unknown(error.clone())
        }
    }
}
