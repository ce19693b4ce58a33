//! Live set of in-flight transport handles.
//!
//! # Design
//! The `Model` inserts a request's `CancelHandle` when the request starts and
//! removes it when the request resolves, keeping the transport operation
//! alive across the await in between. Removal goes through `Registration`, a
//! guard, so a caller that drops its future mid-request also releases the
//! handle, which cancels the transport operation.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::transport::CancelHandle;

/// Identifies one request for the lifetime of its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    handles: Mutex<HashMap<RequestId, CancelHandle>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `handle` alive until the returned guard drops.
    pub fn register(&self, id: RequestId, handle: CancelHandle) -> Registration<'_> {
        self.handles.lock().insert(id, handle);
        Registration { registry: self, id }
    }

    /// Take a handle out of the set. Dropping it cancels the request if it
    /// is still outstanding.
    pub fn remove(&self, id: RequestId) -> Option<CancelHandle> {
        self.handles.lock().remove(&id)
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.handles.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Cancel and forget every registered handle. Returns how many there were.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<CancelHandle> = self.handles.lock().drain().map(|(_, handle)| handle).collect();
        let count = drained.len();
        // Cancel outside the lock; a transport may resolve synchronously.
        for handle in drained {
            handle.cancel();
        }
        count
    }
}

/// Removes its handle from the registry on drop.
#[derive(Debug)]
pub struct Registration<'a> {
    registry: &'a HandleRegistry,
    id: RequestId,
}

impl Registration<'_> {
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        // Bound first so the lock is released before the handle drops.
        let handle = self.registry.remove(self.id);
        drop(handle);
    }
}
