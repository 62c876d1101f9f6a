//! Fixed-period cycle scheduler.
//!
//! Every control iteration runs alongside a short-lived timer thread.  The
//! iteration cannot finish until the timer has seen a full control period
//! elapse since the iteration started, so the loop period is
//! `max(work time, control period)`.
//!
//! ```text
//!  control thread                         timer thread
//!  ──────────────                         ────────────
//!  begin(): spawn ───────────────────────▶ wait_start()
//!           start = now, signal_start() ─▶ sleep until start + period
//!  sense · PID · arbitrate · actuate       │
//!  finish(): wait_finish() ◀───────────── signal_finish()
//!           join
//! ```
//!
//! The timer sleeps against a monotonic deadline instead of polling the
//! clock, and no timer thread outlives its iteration.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

// ═══════════════════════════════════════════════════════════════
//  Two-phase barrier
// ═══════════════════════════════════════════════════════════════

/// Per-iteration handshake state.
#[derive(Debug, Default)]
struct Handshake {
    ready_to_start: bool,
    ready_to_finish: bool,
    start: Option<Instant>,
}

/// Start-signal / completion-signal pair shared by the control thread
/// and one timer thread.
#[derive(Debug, Default)]
pub struct CycleBarrier {
    state: Mutex<Handshake>,
    cv: Condvar,
}

impl CycleBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Handshake> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Control thread: timing may begin from `start`.
    pub fn signal_start(&self, start: Instant) {
        let mut hs = self.lock();
        hs.start = Some(start);
        hs.ready_to_start = true;
        drop(hs);
        self.cv.notify_all();
    }

    /// Timer thread: block until the start signal, return the start time.
    pub fn wait_start(&self) -> Instant {
        let mut hs = self.lock();
        while !hs.ready_to_start {
            hs = self.cv.wait(hs).unwrap_or_else(PoisonError::into_inner);
        }
        hs.start.unwrap_or_else(Instant::now)
    }

    /// Timer thread: the period has elapsed.
    pub fn signal_finish(&self) {
        let mut hs = self.lock();
        hs.ready_to_finish = true;
        drop(hs);
        self.cv.notify_all();
    }

    /// Control thread: block until the timer has signalled completion.
    pub fn wait_finish(&self) {
        let mut hs = self.lock();
        while !hs.ready_to_finish {
            hs = self.cv.wait(hs).unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.lock().ready_to_finish
    }
}

/// Sleep until `deadline`.  `thread::sleep` may return early on some
/// platforms, so re-check the monotonic clock.
pub fn sleep_until(deadline: Instant) {
    loop {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(deadline - now);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Timing result for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Wall-clock time from start signal to release of the next iteration.
    pub elapsed: Duration,
    /// Time the iteration's own work took.
    pub work: Duration,
    pub period: Duration,
}

impl CycleReport {
    /// Work ran past the control period; the effective `dt` grew.
    pub fn overran(&self) -> bool {
        self.work > self.period
    }
}

/// Enforces the minimum iteration period.
pub struct CycleScheduler {
    period: Duration,
    iterations: u64,
    overruns: u64,
}

impl CycleScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            iterations: 0,
            overruns: 0,
        }
    }

    /// Spawn the timer and start timing a new iteration.
    pub fn begin(&self) -> Cycle {
        let barrier = Arc::new(CycleBarrier::new());
        let period = self.period;

        let timer_barrier = Arc::clone(&barrier);
        let worker = thread::Builder::new()
            .name("cycle-timer".into())
            .spawn(move || {
                let start = timer_barrier.wait_start();
                sleep_until(start + period);
                timer_barrier.signal_finish();
            })
            .map_err(|e| warn!("Cycle timer spawn failed ({}), timing inline", e))
            .ok();

        let start = Instant::now();
        barrier.signal_start(start);

        Cycle {
            barrier,
            worker,
            start,
            period,
        }
    }

    /// Run `work` as one iteration and block until the period has elapsed.
    pub fn run<R>(&mut self, work: impl FnOnce() -> R) -> (R, CycleReport) {
        let cycle = self.begin();
        let result = work();
        let report = cycle.finish();
        self.record(&report);
        (result, report)
    }

    /// Account for a finished iteration.
    pub fn record(&mut self, report: &CycleReport) {
        self.iterations += 1;
        if report.overran() {
            self.overruns += 1;
            warn!(
                "Cycle {} overran: work {:?} > period {:?} (effective dt {:?})",
                self.iterations, report.work, report.period, report.elapsed
            );
        } else {
            debug!(
                "Cycle {}: work {:?}, elapsed {:?}",
                self.iterations, report.work, report.elapsed
            );
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

/// One in-flight iteration.  Dropping it without [`finish`](Cycle::finish)
/// still waits for and joins the timer.
pub struct Cycle {
    barrier: Arc<CycleBarrier>,
    worker: Option<JoinHandle<()>>,
    start: Instant,
    period: Duration,
}

impl Cycle {
    /// Block until the timer completes, then report timing.
    pub fn finish(mut self) -> CycleReport {
        let work = self.start.elapsed();
        self.join();
        CycleReport {
            elapsed: self.start.elapsed(),
            work,
            period: self.period,
        }
    }

    fn join(&mut self) {
        match self.worker.take() {
            Some(handle) => {
                self.barrier.wait_finish();
                if handle.join().is_err() {
                    warn!("Cycle timer panicked");
                    sleep_until(self.start + self.period);
                }
            }
            None => sleep_until(self.start + self.period),
        }
    }
}

impl Drop for Cycle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.join();
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
