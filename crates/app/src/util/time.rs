use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use tracing::warn;
use upkeep_core::parse_api_timestamp;

/// Wall-clock readings for one job run. Bot logs are stamped in local time.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    pub utc: DateTime<Utc>,
    pub local: NaiveDateTime,
}

impl RunClock {
    pub fn now() -> Self {
        Self {
            utc: Utc::now(),
            local: Local::now().naive_local(),
        }
    }
}

pub fn retention_cutoff(now: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    now - Duration::hours(i64::from(hours))
}

/// Parses an optional API timestamp. A value that is present but malformed is
/// logged and treated as absent.
pub fn parse_optional_timestamp(field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_api_timestamp(raw);
    if parsed.is_none() {
        warn!(field, value = raw, "unparseable timestamp");
    }
    parsed
}

pub fn describe_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
