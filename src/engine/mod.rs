//! Scan scheduling: a deterministic state machine and the tokio loop that
//! drives it against the agent channel.

pub mod clock;
pub mod driver;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{ScanDriver, ScanHandle, DEFAULT_SCAN_PROMPT};
pub use scheduler::{
    FireOutcome, FireReason, ScanScheduler, ScanStats, ScanStatus, ScheduleConfig,
    SchedulerPhase,
};
