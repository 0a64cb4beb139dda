//! Per-thread CPU-time accounting.

use std::time::Duration;

/// Reports CPU time consumed by the calling thread relative to a baseline.
///
/// The first [`elapsed`](CpuTimer::elapsed) call establishes the zero
/// baseline and returns `Duration::ZERO`; later calls report the delta since
/// that baseline, never absolute process CPU time. One timer belongs to one
/// thread: the thread that first queries it is the thread being measured.
#[derive(Debug, Default)]
pub struct CpuTimer {
    baseline: Option<Duration>,
}

impl CpuTimer {
    /// Create a timer with no baseline yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU time consumed since the baseline, establishing it on first call.
    pub fn elapsed(&mut self) -> Duration {
        let now = thread_cpu_now();
        match self.baseline {
            None => {
                self.baseline = Some(now);
                Duration::ZERO
            }
            Some(baseline) => now.saturating_sub(baseline),
        }
    }

    /// Whether a baseline has been established.
    pub fn started(&self) -> bool {
        self.baseline.is_some()
    }
}

/// CPU time consumed by the calling thread since an arbitrary fixed origin.
#[cfg(unix)]
fn thread_cpu_now() -> Duration {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // Per POSIX this clock is always available for the calling thread.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
    if rc == 0 {
        Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
    } else {
        Duration::ZERO
    }
}

/// Fallback for platforms without a thread CPU clock: monotonic wall time
/// from process start, which still satisfies the delta-since-baseline
/// contract.
#[cfg(not(unix))]
fn thread_cpu_now() -> Duration {
    use std::sync::OnceLock;
    use std::time::Instant;
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed()
}
