use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use upkeep_core::LogCounts;

use crate::parser::{LogEvent, classify_line, parse_line_timestamp};
use crate::types::{Result, ScanWindow};

const TAIL_BLOCK: u64 = 64 * 1024;

/// Counts recognized events on timestamped lines inside `window`.
/// Lines without a parseable timestamp are skipped.
pub fn count_events<R: BufRead>(reader: R, window: &ScanWindow) -> Result<LogCounts> {
    let mut counts = LogCounts::default();
    for chunk in reader.split(b'\n') {
        let bytes = chunk?;
        let line = String::from_utf8_lossy(&bytes);
        let Some(ts) = parse_line_timestamp(&line) else {
            continue;
        };
        if !window.contains(ts) {
            continue;
        }
        match classify_line(&line) {
            Some(LogEvent::Kick) => counts.kicks += 1,
            Some(LogEvent::Command) => counts.commands += 1,
            None => {}
        }
    }
    Ok(counts)
}

/// Scans the tail of one log file. Only the trailing blocks that can hold
/// lines inside the window are read.
pub fn scan_log_file(path: &Path, window: &ScanWindow) -> Result<LogCounts> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let start = tail_offset(&mut file, len, window)?;
    debug!(path = %path.display(), start, len, "scanning log tail");
    file.seek(SeekFrom::Start(start))?;
    count_events(BufReader::new(file), window)
}

/// Sums counts over several files. Unreadable files contribute nothing.
pub fn scan_log_files(paths: &[PathBuf], window: &ScanWindow) -> LogCounts {
    let mut total = LogCounts::default();
    for path in paths {
        match scan_log_file(path, window) {
            Ok(counts) => total.merge(counts),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping log file"),
        }
    }
    total
}

/// Walks backwards in blocks until a block's first timestamped line predates
/// the window, returning the start of a line.
fn tail_offset(file: &mut File, len: u64, window: &ScanWindow) -> Result<u64> {
    let mut block_start = len;
    while block_start > 0 {
        block_start = block_start.saturating_sub(TAIL_BLOCK);
        file.seek(SeekFrom::Start(block_start))?;
        let mut reader = BufReader::new(&mut *file);
        let mut buf = Vec::new();
        let mut line_start = block_start;
        if block_start > 0 {
            line_start += reader.read_until(b'\n', &mut buf)? as u64;
        }
        let mut offset = line_start;
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)? as u64;
            if read == 0 || offset >= block_start + TAIL_BLOCK {
                break;
            }
            if let Some(ts) = parse_line_timestamp(&String::from_utf8_lossy(&buf)) {
                if ts < window.start {
                    return Ok(line_start);
                }
                break;
            }
            offset += read;
        }
    }
    Ok(0)
}
