//! Cooperative cancellation.
//!
//! A resolution aborted mid-flight must fail rather than proceed with
//! partial data; providers check the token between pagination pages and the
//! pipeline checks it at stage boundaries.

use crate::errors::{Result, SemrelError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation signal shared between the caller and in-flight work.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail fast when cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_canceled() {
            Err(SemrelError::Canceled)
        } else {
            Ok(())
        }
    }
}
