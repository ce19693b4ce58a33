//! `Transport` implementation over `reqwest`.
//!
//! # Design
//! Each `fetch` spawns one task on the runtime captured at construction. The
//! task runs the exchange to the end, reading the whole body, and then fires
//! the completion exactly once. Cancelling aborts the task, so the completion
//! is dropped unfired.
//!
//! Non-2xx statuses are ordinary responses here; classifying them is the
//! error mapper's job. Only failures that produced no usable response become
//! a `LowLevelError`, and `low_level_error` is where `reqwest`/`hyper` errors
//! are sorted into the kinds the mapper understands. A connection the peer
//! closed before or during the response counts as lost, whether the stack
//! reports it as an io error or as hyper's incomplete-message error.

use std::error::Error as _;
use std::io;

use tokio::runtime::Handle;

use crate::config::ConfigError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, LowLevelError, LowLevelErrorKind, TransportOutcome};
use crate::transport::{CancelHandle, Completion, Transport};

/// `Transport` backed by `reqwest`, one tokio task per request.
///
/// The handle aborts the task, which drops the completion unfired. No timeout
/// is configured beyond whatever the supplied client enforces.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    runtime: Handle,
}

impl ReqwestTransport {
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dessert-core/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client)
    }

    pub fn with_client(client: reqwest::Client) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            runtime: Handle::try_current()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn fetch(&self, request: HttpRequest, completion: Completion) -> CancelHandle {
        let client = self.client.clone();
        let task = self.runtime.spawn(async move {
            let outcome = execute(&client, request).await;
            completion(outcome);
        });
        let abort = task.abort_handle();
        CancelHandle::new(move || abort.abort())
    }
}

async fn execute(client: &reqwest::Client, request: HttpRequest) -> TransportOutcome {
    let mut builder = match request.method {
        HttpMethod::Get => client.get(request.url),
    };
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let response = match builder.send().await {
        Ok(response) => response,
        Err(err) => return TransportOutcome::failure(low_level_error(err)),
    };

    let status = response.status().as_u16();
    match response.bytes().await {
        Ok(body) => TransportOutcome::response(HttpResponse::new(status, body)),
        Err(err) => TransportOutcome::failure(low_level_error(err)),
    }
}

fn low_level_error(err: reqwest::Error) -> LowLevelError {
    let kind = if err.is_timeout() {
        LowLevelErrorKind::TimedOut
    } else if err.is_connect() {
        LowLevelErrorKind::NotConnectedToInternet
    } else if is_connection_drop(&err) {
        LowLevelErrorKind::NetworkConnectionLost
    } else {
        LowLevelErrorKind::Other
    };
    LowLevelError::new(kind, err.to_string())
}

fn is_connection_drop(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(hyper) = cause.downcast_ref::<hyper::Error>() {
            if hyper.is_incomplete_message() || hyper.is_closed() {
                return true;
            }
        }
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            return matches!(
                io.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            );
        }
        source = cause.source();
    }
    false
}
