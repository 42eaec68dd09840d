use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

const TIMESTAMP_LEN: usize = 19;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static KICK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Guild \d+ deleted \(bot kicked\?\), removing active game states")
        .expect("kick pattern")
});

static COMMAND_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CMD \(USER=\d+, GUILD=\d+\):").expect("command pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    Kick,
    Command,
}

/// Parses the `YYYY-MM-DD HH:MM:SS.` prefix written by the bot's logger.
pub fn parse_line_timestamp(line: &str) -> Option<NaiveDateTime> {
    let prefix = line.get(..TIMESTAMP_LEN)?;
    if line.as_bytes().get(TIMESTAMP_LEN) != Some(&b'.') {
        return None;
    }
    NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT).ok()
}

pub fn classify_line(line: &str) -> Option<LogEvent> {
    if KICK_PATTERN.is_match(line) {
        return Some(LogEvent::Kick);
    }
    if COMMAND_PATTERN.is_match(line) {
        return Some(LogEvent::Command);
    }
    None
}
