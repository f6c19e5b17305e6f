//! Named wall-clock spans for profiling a run.
//!
//! The handle is owned by the caller and passed to the solver explicitly;
//! there is no global timer state.  Spans are RAII guards, so a span is
//! closed on every exit path, including early returns and `?`.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// A collection of named accumulating timers.
#[derive(Debug, Default)]
pub struct Timers {
    spans: BTreeMap<&'static str, Duration>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a span; the elapsed time is added to `key` when the returned
    /// guard drops.
    pub fn scope(&mut self, key: &'static str) -> TimerGuard<'_> {
        TimerGuard {
            timers: self,
            key,
            start: Instant::now(),
        }
    }

    /// Total accumulated time under `key`.
    pub fn elapsed(&self, key: &str) -> Duration {
        self.spans.get(key).copied().unwrap_or(Duration::ZERO)
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    fn add(&mut self, key: &'static str, elapsed: Duration) {
        *self.spans.entry(key).or_insert(Duration::ZERO) += elapsed;
    }
}

impl fmt::Display for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, elapsed) in &self.spans {
            writeln!(f, "{:<24} : {:?}", key, elapsed)?;
        }
        Ok(())
    }
}

/// RAII span guard returned by [`Timers::scope`].
pub struct TimerGuard<'a> {
    timers: &'a mut Timers,
    key: &'static str,
    start: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.timers.add(self.key, elapsed);
    }
}
