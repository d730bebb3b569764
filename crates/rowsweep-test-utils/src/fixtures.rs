//! Transform fixtures for engine and failure testing.
//!
//! - [`CountingTransform`]: identity that counts its calls.
//! - [`StallOnThread`]: stalls once on one named thread, to simulate a
//!   silent worker.
//! - [`PanicOnThread`]: panics on one named thread.
//!
//! Message-passing workers run on threads named `rowsweep-worker-{id}`;
//! see [`worker_thread`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use rowsweep_core::Transform;

/// Name of the thread that runs worker `id` in message-passing mode.
pub fn worker_thread(id: u32) -> String {
    format!("rowsweep-worker-{id}")
}

fn on_thread(name: &str) -> bool {
    thread::current().name() == Some(name)
}

/// Identity transform that counts how often it was applied.
///
/// Uses `AtomicUsize` so it satisfies `Sync`.
#[derive(Debug, Default)]
pub struct CountingTransform {
    calls: AtomicUsize,
}

impl CountingTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Transform for CountingTransform {
    fn name(&self) -> &str {
        "counting"
    }

    fn apply(&self, x: f64) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        x
    }
}

/// Identity transform that sleeps for `stall` the first time it runs on
/// the thread named `thread`.
#[derive(Debug)]
pub struct StallOnThread {
    pub thread: String,
    pub stall: Duration,
    fired: AtomicBool,
}

impl StallOnThread {
    pub fn new(thread: impl Into<String>, stall: Duration) -> Self {
        Self {
            thread: thread.into(),
            stall,
            fired: AtomicBool::new(false),
        }
    }

    /// Whether the stall has happened.
    pub fn fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Transform for StallOnThread {
    fn name(&self) -> &str {
        "stall_on_thread"
    }

    fn apply(&self, x: f64) -> f64 {
        if on_thread(&self.thread) && !self.fired.swap(true, Ordering::AcqRel) {
            thread::sleep(self.stall);
        }
        x
    }
}

/// Identity transform that panics when it runs on the thread named
/// `thread`.
#[derive(Debug)]
pub struct PanicOnThread {
    pub thread: String,
}

impl PanicOnThread {
    pub fn new(thread: impl Into<String>) -> Self {
        Self {
            thread: thread.into(),
        }
    }
}

impl Transform for PanicOnThread {
    fn name(&self) -> &str {
        "panic_on_thread"
    }

    fn apply(&self, x: f64) -> f64 {
        if on_thread(&self.thread) {
            panic!("injected failure on {}", self.thread);
        }
        x
    }
}
