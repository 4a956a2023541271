//! Pacing: how the caller waits between animation frames

use std::time::Duration;

/// Suspends the caller between frames.
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Blocks the current thread for the requested delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Returns immediately, used for instant playback and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacer;

impl Pacer for NoPacer {
    fn pause(&mut self, _delay: Duration) {}
}
