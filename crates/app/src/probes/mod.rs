mod latency;
mod process;

pub use latency::{LatencyProbe, elapsed_millis};
pub use process::{ProcessStats, SystemProcessStats, command_line};
