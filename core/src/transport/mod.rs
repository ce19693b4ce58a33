//! The transport seam between operations and the network.
//!
//! # Design
//! A `Transport` accepts a request and a completion callback and returns a
//! `CancelHandle` right away. The completion is an `FnOnce`, so it can fire at
//! most once. Non-2xx statuses are reported as responses, never as errors;
//! classification is the error mapper's job.

mod live;

pub use live::ReqwestTransport;

use std::fmt;

use crate::http::{HttpRequest, TransportOutcome};

/// Callback invoked with the outcome of one request.
pub type Completion = Box<dyn FnOnce(TransportOutcome) + Send + 'static>;

/// Executes HTTP requests on behalf of the `Model`.
pub trait Transport: Send + Sync + 'static {
    /// Start `request`, calling `completion` once it resolves.
    ///
    /// Cancelling or dropping the returned handle before resolution stops the
    /// request; the completion is then dropped without being called.
    fn fetch(&self, request: HttpRequest, completion: Completion) -> CancelHandle;
}

/// Cancels an in-flight transport operation when cancelled or dropped.
///
/// Cancelling after the operation resolved is a no-op.
#[must_use = "dropping a CancelHandle cancels the request"]
pub struct CancelHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl CancelHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle for work that cannot be cancelled.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}
