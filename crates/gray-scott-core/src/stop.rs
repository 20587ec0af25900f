use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Polled between steps. A run never stops part-way through a step.
pub trait StopSignal {
    fn should_stop(&self) -> bool;
}

/// Never fires.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn should_stop(&self) -> bool {
        false
    }
}

impl StopSignal for AtomicBool {
    fn should_stop(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<S: StopSignal + ?Sized> StopSignal for Arc<S> {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

impl<S: StopSignal + ?Sized> StopSignal for &S {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }
}

/// Fires once the wall clock passes a fixed instant.
#[derive(Clone, Copy, Debug)]
pub struct Deadline(pub Instant);

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Deadline(Instant::now() + budget)
    }
}

impl StopSignal for Deadline {
    fn should_stop(&self) -> bool {
        Instant::now() >= self.0
    }
}
