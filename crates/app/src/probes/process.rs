use regex::Regex;
use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, ProcessRefreshKind, System, UpdateKind};

use crate::error::Result;

/// Read-only view of the OS process table.
pub trait ProcessStats {
    /// Sum of CPU percent over processes whose command line matches `pattern`.
    fn cpu_percent(&self, pattern: &Regex) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessStats;

impl ProcessStats for SystemProcessStats {
    fn cpu_percent(&self, pattern: &Regex) -> Result<f64> {
        // CPU usage is a delta between two refreshes. Arguments are not loaded
        // by a plain process refresh.
        let refresh = ProcessRefreshKind::new()
            .with_cpu()
            .with_cmd(UpdateKind::OnlyIfNotSet);
        let mut system = System::new();
        system.refresh_processes_specifics(refresh);
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_processes_specifics(refresh);

        let total = system
            .processes()
            .values()
            .filter(|process| pattern.is_match(&command_line(process.name(), process.cmd())))
            .map(|process| f64::from(process.cpu_usage()))
            .sum();
        Ok(total)
    }
}

/// Full invocation as `ps` prints it, falling back to the process name for
/// kernel threads and processes whose arguments are unreadable.
pub fn command_line(name: &str, cmd: &[String]) -> String {
    if cmd.is_empty() {
        name.to_string()
    } else {
        cmd.join(" ")
    }
}
