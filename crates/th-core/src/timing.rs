//! Lightweight oracle call timing.
//!
//! Counts and times calls into the property oracle so the cost of a
//! calculation chain can be attributed. Can be enabled/disabled via
//! environment variable or programmatically.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("TH_TIMING").is_ok()
}

/// Measures one oracle call and records it into an [`AccumulatingTimer`] on drop.
pub struct Timer {
    target: &'static AccumulatingTimer,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer feeding `target`.
    pub fn start(target: &'static AccumulatingTimer) -> Self {
        Self {
            target,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if self.enabled {
            self.target.record(self.start.elapsed().as_secs_f64());
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    /// Create a new accumulating timer.
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    /// Get number of calls.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    /// Reset the timer.
    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Property oracle timers.
pub mod oracle_timing {
    use super::AccumulatingTimer;

    /// Oracle handle creation
    pub static HANDLE_CREATION: AccumulatingTimer = AccumulatingTimer::new();
    /// Committing a state to an oracle handle
    pub static EVALUATE: AccumulatingTimer = AccumulatingTimer::new();
    /// Keyed output queries on a committed handle
    pub static KEYED_OUTPUT: AccumulatingTimer = AccumulatingTimer::new();
    /// Stateless humid air queries
    pub static HA_PROPS: AccumulatingTimer = AccumulatingTimer::new();

    /// Reset all oracle timers.
    pub fn reset_all() {
        HANDLE_CREATION.reset();
        EVALUATE.reset();
        KEYED_OUTPUT.reset();
        HA_PROPS.reset();
    }

    /// Print oracle timing summary.
    pub fn print_summary() {
        use super::is_enabled;
        if !is_enabled() {
            return;
        }

        println!("\n=== Property Oracle Breakdown ===");

        let rows: [(&str, &AccumulatingTimer); 4] = [
            ("handle creation:", &HANDLE_CREATION),
            ("evaluate:", &EVALUATE),
            ("keyed_output:", &KEYED_OUTPUT),
            ("ha_props:", &HA_PROPS),
        ];
        for (label, timer) in rows {
            let count = timer.count();
            if count > 0 {
                println!(
                    "{:<20} {} calls, {:.3}s total, {:.4}ms avg",
                    label,
                    count,
                    timer.total_seconds(),
                    timer.average_seconds() * 1000.0
                );
            }
        }

        println!("=================================\n");
    }
}
