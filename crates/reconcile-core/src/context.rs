use crate::error::StoreError;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

///
/// CancelToken
///
/// Shared flag the caller flips to abandon in-flight store calls.
///

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

///
/// Context
///
/// Invocation context handed to every store call.
/// The importer only passes it through; deadlines belong to the caller.
///

#[derive(Clone, Debug, Default)]
pub struct Context {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never canceled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the caller canceled or the deadline passed.
    ///
    /// Stores call this before doing any work.
    pub fn check(&self) -> Result<(), StoreError> {
        if self.cancel.is_canceled() {
            return Err(StoreError::canceled());
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StoreError::deadline_exceeded()),
            _ => Ok(()),
        }
    }
}

///
/// TESTS
///
