use std::cell::Cell;
use std::time::Instant;

/// Number of timer points: (create_start, create_stop, xfer_out_start,
/// xfer_out_stop, xfer_in_start, xfer_in_stop).
pub const DECOMP_NB_TIMERS: usize = 6;

pub const TIMER_CREATE_START: usize = 0;
pub const TIMER_CREATE_STOP: usize = 1;
pub const TIMER_XFER_OUT_START: usize = 2;
pub const TIMER_XFER_OUT_STOP: usize = 3;
pub const TIMER_XFER_IN_START: usize = 4;
pub const TIMER_XFER_IN_STOP: usize = 5;

/// Benchmark timer storage for one iteration of the diagnostic CLI:
/// decomposition construction plus one round trip of transfers.
#[derive(Debug, Clone, Copy)]
pub struct BenchTimers {
    pub timers: [f64; DECOMP_NB_TIMERS],
}

impl Default for BenchTimers {
    fn default() -> Self {
        Self {
            timers: [0.0; DECOMP_NB_TIMERS],
        }
    }
}

impl BenchTimers {
    pub fn create_time(&self) -> f64 {
        self.timers[TIMER_CREATE_STOP] - self.timers[TIMER_CREATE_START]
    }

    pub fn xfer_out_time(&self) -> f64 {
        self.timers[TIMER_XFER_OUT_STOP] - self.timers[TIMER_XFER_OUT_START]
    }

    pub fn xfer_in_time(&self) -> f64 {
        self.timers[TIMER_XFER_IN_STOP] - self.timers[TIMER_XFER_IN_START]
    }

    pub fn total_time(&self) -> f64 {
        self.timers[TIMER_XFER_IN_STOP] - self.timers[TIMER_CREATE_START]
    }
}

thread_local! {
    /// Per-thread monotonic epoch, lazily initialized on first call to `now()`.
    static EPOCH: Cell<Option<Instant>> = const { Cell::new(None) };
}

/// Current timestamp in seconds, monotonic relative to the first call on
/// this thread.
pub fn now() -> f64 {
    EPOCH.with(|cell| {
        let epoch = match cell.get() {
            Some(e) => e,
            None => {
                let e = Instant::now();
                cell.set(Some(e));
                e
            }
        };
        epoch.elapsed().as_secs_f64()
    })
}
