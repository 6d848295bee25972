//! Bounded admission for outbound provider calls.
//!
//! A [`Gate`] hands out at most `size` [`Permit`]s at a time. Permits are released when dropped,
//! so a task that fails or panics while holding one still gives it back. [`Gate::wait_all`] blocks
//! until every outstanding permit has been returned.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Number of simultaneous provider calls when nothing else is configured.
pub const DEFAULT_SIZE: usize = 5;

#[derive(Clone, Debug)]
pub struct Gate {
    semaphore: Arc<Semaphore>,
    size: u32,
}

/// One reserved slot of a [`Gate`]. Returned to the gate on drop.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl Permit {
    /// Give the slot back to its gate.
    pub fn release(self) {}
}

impl Gate {
    /// A gate admitting up to `size` holders at once. Sizes below one are raised to one.
    pub fn new(size: usize) -> Self {
        let size = u32::try_from(size.clamp(1, Semaphore::MAX_PERMITS)).unwrap_or(u32::MAX);
        Gate {
            semaphore: Arc::new(Semaphore::new(size as usize)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Permits currently not held by anyone.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait until fewer than `size` permits are outstanding and reserve one.
    pub async fn acquire(&self) -> Permit {
        // NB: expect is safe: the semaphore is never closed.
        Permit {
            _permit: self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .expect("gate semaphore closed"),
        }
    }

    /// Wait until every outstanding permit has been released.
    pub async fn wait_all(&self) {
        let _all = self.semaphore.acquire_many(self.size).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Gate::new(DEFAULT_SIZE)
    }
}
