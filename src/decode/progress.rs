use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Receives progress reports and the cooperative yield at each token
/// boundary of an interruptable or progress-emitting parse.
pub trait ProgressSink {
    /// Fraction of input consumed, in `0.0..=1.0`.
    fn progress(&mut self, _fraction: f32) {}

    fn byte_progress(&mut self, _current: usize, _total: usize) {}

    /// Called once per token boundary; the host may pump its own events
    /// here and request cancellation through [`ParseControl::cancel`].
    fn yield_now(&mut self) {}
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Flags shared between a parser and the host that drives it.
#[derive(Debug, Default)]
pub struct ParseControl {
    cancelled: AtomicBool,
    interruptable: AtomicBool,
    in_flight: AtomicBool,
}

impl ParseControl {
    pub fn new(interruptable: bool) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            interruptable: AtomicBool::new(interruptable),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_interruptable(&self) -> bool {
        self.interruptable.load(Ordering::Acquire)
    }

    pub fn is_parsing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Returns `false` and leaves the flag untouched while a parse is
    /// running.
    pub fn set_interruptable(&self, interruptable: bool) -> bool {
        if self.is_parsing() {
            return false;
        }
        self.interruptable.store(interruptable, Ordering::Release);
        true
    }

    /// Marks a parse as running and clears any stale cancellation.
    /// Returns `false` if another parse already holds this control.
    pub(crate) fn begin(&self) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.cancelled.store(false, Ordering::Release);
        true
    }

    pub(crate) fn finish(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Rate limiter for progress reports.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Instant,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    pub fn report(&mut self, sink: &mut dyn ProgressSink, current: usize, total: usize) {
        let now = Instant::now();
        if now.duration_since(self.last) < self.interval {
            return;
        }
        self.last = now;
        emit(sink, current, total);
    }
}

pub fn emit(sink: &mut dyn ProgressSink, current: usize, total: usize) {
    let fraction = if total == 0 {
        1.0
    } else {
        current as f32 / total as f32
    };
    sink.progress(fraction);
    sink.byte_progress(current, total);
}
