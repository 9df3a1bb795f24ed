//! Cooperative cancellation flag shared between the controller and motion routines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-writer, many-reader abort flag.
///
/// Set by `abort()`, cleared at the start of every new slew, and polled by
/// long-running motion routines at their own check points. Clones share the
/// same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
