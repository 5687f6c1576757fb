//! Cooperative stop flag shared by both cores

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop request
///
/// Each loop polls the flag once per iteration, so a stop takes effect within
/// one tick on the acquisition core and one dequeue timeout on the inference
/// core. Nothing is cancelled mid-task.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Flag in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder to stop
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
