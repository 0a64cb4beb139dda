//! Time synchronization between the simulator clock and the outside world.
//!
//! Three independent pieces, all consumed by the interface registry:
//!
//! - [`WarmupTracker`]: the warmup phase machine. Interfaces may request a
//!   warmup interval during node initialization; live external traffic is
//!   admitted only once every requester has reported ready and the configured
//!   duration has elapsed in simulated time.
//! - [`RealTimePacer`]: maps wall-clock time to simulated time with a
//!   lookahead bound, so the simulator can pace itself against interfaces
//!   that operate in real time. Pause/resume freezes the mapping without the
//!   paced side perceiving a time jump.
//! - [`CpuTimer`]: per-thread CPU-time accounting relative to a baseline
//!   established on first query.

mod cputime;
mod realtime;
mod warmup;

pub use cputime::CpuTimer;
pub use realtime::RealTimePacer;
pub use warmup::{WarmupPhase, WarmupTracker};
