//! Thread-shareable engine handle.

use std::sync::{Arc, Mutex};

use crate::engine::AmplificationEngine;
use crate::error::{AmplifyError, AmplifyResult};

/// An `AmplificationEngine` behind a single lock.
///
/// Every call holds the lock for its whole duration, so operations from
/// different threads never interleave within one engine call.
#[derive(Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<AmplificationEngine>>,
}

impl SharedEngine {
    pub fn new(engine: AmplificationEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<T>(&self, f: impl FnOnce(&mut AmplificationEngine) -> T) -> AmplifyResult<T> {
        let mut engine = self.inner.lock().map_err(|_| AmplifyError::Lock)?;
        Ok(f(&mut engine))
    }

    /// Like `with`, for closures that already return an engine result.
    pub fn try_with<T>(
        &self,
        f: impl FnOnce(&mut AmplificationEngine) -> AmplifyResult<T>,
    ) -> AmplifyResult<T> {
        self.with(f)?
    }
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEngine")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
