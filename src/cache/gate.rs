//! Admission gate: non-blocking concurrency limiter for the lookup path.
//!
//! A fixed token pool bounds in-flight lookup work. Callers that find
//! the pool empty are shed immediately — there is no queue, so a
//! saturated service answers "overloaded" instead of building latency.
//! The health probe never passes through the gate.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

#[derive(Clone)]
pub struct AdmissionGate {
    limit: usize,
    permits: Arc<Semaphore>,
}

/// Held for the duration of one admitted request. Dropping it returns
/// the token, including on error and panic paths.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            permits: Arc::new(Semaphore::new(limit)),
        }
    }

    /// Try to enter the gated path. Returns `None` immediately when no
    /// token is available; callers must not retry internally.
    pub fn try_enter(&self) -> Option<AdmissionPermit> {
        match self.permits.clone().try_acquire_owned() {
            Ok(permit) => Some(AdmissionPermit { _permit: permit }),
            Err(TryAcquireError::NoPermits) => None,
            // The semaphore is never closed while the gate is alive.
            Err(TryAcquireError::Closed) => None,
        }
    }

    /// Configured token pool size.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Tokens currently available.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
