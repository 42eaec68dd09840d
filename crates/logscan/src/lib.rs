mod parser;
mod types;
mod window;

pub use parser::{LogEvent, classify_line, parse_line_timestamp};
pub use types::{Result, ScanError, ScanWindow};
pub use window::{count_events, scan_log_file, scan_log_files};
