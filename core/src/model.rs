//! The orchestrator between callers, the transport and the operations.
//!
//! # Design
//! `Model` turns the transport's callback into an awaitable call: the
//! completion sends the outcome over a `oneshot`, and the call's
//! `Registration` keeps the transport handle alive until that outcome is
//! consumed or the caller gives up. Transport errors reach the caller as they
//! were classified; any decode failure becomes
//! `ModelError::PermanentResponseFailure`.
//!
//! Published state is the dessert list and the "is fetching" flag, exposed as
//! `watch` receivers. Both are written only while holding `updates`, which is
//! the single serialized update path. The flag follows a counter of running
//! refreshes so overlapping refreshes leave it `true` until the last one ends.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};

use crate::config::{ApiConfig, ConfigError};
use crate::error::{self, Error, ModelError};
use crate::http::{LowLevelError, TransportOutcome};
use crate::operation::{GetDessertDetail, GetDesserts, Operation};
use crate::registry::{HandleRegistry, RequestId};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{DessertDetail, DessertResult};

/// Entry point for presentation code.
pub struct Model {
    transport: Arc<dyn Transport>,
    config: ApiConfig,
    registry: HandleRegistry,
    updates: Mutex<RefreshState>,
    desserts: watch::Sender<Vec<DessertResult>>,
    is_fetching: watch::Sender<bool>,
}

#[derive(Debug, Default)]
struct RefreshState {
    active: usize,
}

impl Model {
    pub fn new(transport: Arc<dyn Transport>, config: ApiConfig) -> Self {
        let (desserts, _) = watch::channel(Vec::new());
        let (is_fetching, _) = watch::channel(false);
        Self {
            transport,
            config,
            registry: HandleRegistry::new(),
            updates: Mutex::new(RefreshState::default()),
            desserts,
            is_fetching,
        }
    }

    /// A model talking to the live API, configured from the environment.
    /// Must be called from within a tokio runtime.
    pub fn live() -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(Arc::new(transport), ApiConfig::from_env()?))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The published dessert list. Empty until the first successful refresh.
    pub fn desserts(&self) -> watch::Receiver<Vec<DessertResult>> {
        self.desserts.subscribe()
    }

    pub fn current_desserts(&self) -> Vec<DessertResult> {
        self.desserts.borrow().clone()
    }

    /// `true` while at least one `refresh_desserts` call is running.
    pub fn is_fetching_desserts(&self) -> watch::Receiver<bool> {
        self.is_fetching.subscribe()
    }

    /// Number of requests whose transport operation is still outstanding.
    pub fn in_flight(&self) -> usize {
        self.registry.len()
    }

    /// Cancel every outstanding request. Each pending call resolves with
    /// `TransportError::Unknown` carrying a cancellation cause.
    pub fn cancel_all(&self) -> usize {
        let cancelled = self.registry.cancel_all();
        if cancelled > 0 {
            tracing::info!(cancelled, "cancelled in-flight requests");
        }
        cancelled
    }

    /// Fetch the dessert list and publish it.
    ///
    /// On failure the previously published list is left untouched.
    pub async fn refresh_desserts(&self) -> Result<Vec<DessertResult>, Error> {
        let _refreshing = RefreshGuard::begin(self);
        let desserts = self.request(GetDesserts).await?;
        self.publish(desserts.clone());
        Ok(desserts)
    }

    /// Fetch the full recipe for `dessert`. Nothing is published.
    pub async fn get_details(&self, dessert: &DessertResult) -> Result<DessertDetail, Error> {
        self.get_details_by_id(dessert.id()).await
    }

    pub async fn get_details_by_id(&self, dessert_id: &str) -> Result<DessertDetail, Error> {
        self.request(GetDessertDetail::new(dessert_id)).await
    }

    async fn request<O: Operation>(&self, operation: O) -> Result<O::Output, Error> {
        let request = operation.request(&self.config);
        let id = RequestId::new();
        tracing::debug!(request_id = %id, url = %request.url, "sending request");

        let (tx, rx) = oneshot::channel();
        let handle = self.transport.fetch(
            request,
            Box::new(move |outcome: TransportOutcome| {
                // The receiver is gone if the caller stopped waiting.
                let _ = tx.send(outcome);
            }),
        );
        let registration = self.registry.register(id, handle);

        // A dropped completion means the transport operation was cancelled.
        let outcome = rx
            .await
            .unwrap_or_else(|_| TransportOutcome::failure(LowLevelError::cancelled()));
        drop(registration);

        let body = error::map_outcome(outcome).inspect_err(|err| {
            tracing::warn!(request_id = %id, error = ?err, "request failed");
        })?;

        operation.decode(&body).map_err(|err| {
            tracing::error!(
                request_id = %id,
                error = %err,
                "permanent response failure: response did not match the data contract"
            );
            Error::from(ModelError::PermanentResponseFailure)
        })
    }

    fn publish(&self, desserts: Vec<DessertResult>) {
        let _updates = self.updates.lock();
        tracing::debug!(count = desserts.len(), "publishing desserts");
        self.desserts.send_replace(desserts);
    }
}

/// Marks one running refresh for as long as it lives.
struct RefreshGuard<'a> {
    model: &'a Model,
}

impl<'a> RefreshGuard<'a> {
    fn begin(model: &'a Model) -> Self {
        let mut state = model.updates.lock();
        state.active += 1;
        if state.active == 1 {
            model.is_fetching.send_replace(true);
        }
        Self { model }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.model.updates.lock();
        state.active -= 1;
        if state.active == 0 {
            self.model.is_fetching.send_replace(false);
        }
    }
}
