use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Entitlement types that represent a paid subscription (user and guild).
pub const SUBSCRIPTION_TYPES: [u8; 2] = [6, 8];

/// Page size requested from the entitlement list endpoint.
pub const ENTITLEMENT_PAGE_SIZE: usize = 100;

/// One entitlement as returned by the platform API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
}

impl Entitlement {
    pub fn is_subscription(&self) -> bool {
        SUBSCRIPTION_TYPES.contains(&self.kind)
    }

    /// Subscription id, if present and non-empty.
    pub fn subscription(&self) -> Option<&str> {
        self.subscription_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Active,
    Inactive,
    /// Start or end of the validity window is missing.
    Unknown,
}

impl Activity {
    pub fn is_active(self) -> bool {
        matches!(self, Activity::Active)
    }

    pub fn as_flag(self) -> i64 {
        if self.is_active() { 1 } else { 0 }
    }
}

/// Whether `now` lies within `[start, end]`. Both bounds must be known.
pub fn activity_at(
    now: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Activity {
    match (start, end) {
        (Some(start), Some(end)) if start <= now && now <= end => Activity::Active,
        (Some(_), Some(_)) => Activity::Inactive,
        _ => Activity::Unknown,
    }
}

pub fn parse_api_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

/// Storage format for timestamps: RFC 3339, UTC, whole seconds.
pub fn format_db_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCredit {
    pub user_id: Option<String>,
    pub subscription_id: String,
    pub guild_id: Option<String>,
    pub active: bool,
    pub since: String,
    pub plan_id: String,
    pub payment_failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Aggregate population counters across bot clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub user_count: i64,
    pub server_count: i64,
    pub channel_count: i64,
    pub memory_usage: i64,
    pub games: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSummary {
    pub total: u32,
    pub online: u32,
    pub connected: u32,
}

impl ShardSummary {
    pub fn is_degraded(&self, expected: u32) -> bool {
        self.online < expected || self.connected < expected
    }
}

/// Kick and command lines seen in the recent log window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogCounts {
    pub kicks: u64,
    pub commands: u64,
}

impl LogCounts {
    pub fn merge(&mut self, other: LogCounts) {
        self.kicks += other.kicks;
        self.commands += other.commands;
    }
}

/// Round-trip latencies in whole milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latencies {
    pub discord_ping: u64,
    pub trivia_api_ping: u64,
    pub db_ping: u64,
}

/// One row of the graphing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSample {
    pub entry_date: String,
    pub cpu: f64,
    pub counts: PopulationCounts,
    pub latencies: Latencies,
    pub log: LogCounts,
    pub questions_asked: i64,
    pub question_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn activity_inside_window_is_active() {
        assert_eq!(activity_at(at(12), Some(at(0)), Some(at(23))), Activity::Active);
        assert_eq!(activity_at(at(0), Some(at(0)), Some(at(23))), Activity::Active);
        assert_eq!(activity_at(at(23), Some(at(0)), Some(at(23))), Activity::Active);
    }

    #[test]
    fn activity_outside_window_is_inactive() {
        assert_eq!(activity_at(at(5), Some(at(6)), Some(at(23))), Activity::Inactive);
        assert_eq!(activity_at(at(23), Some(at(0)), Some(at(22))), Activity::Inactive);
    }

    #[test]
    fn activity_with_missing_bound_is_unknown() {
        assert_eq!(activity_at(at(12), Some(at(0)), None), Activity::Unknown);
        assert_eq!(activity_at(at(12), None, Some(at(23))), Activity::Unknown);
        assert_eq!(activity_at(at(12), None, None), Activity::Unknown);
        assert_eq!(Activity::Unknown.as_flag(), 0);
    }

    #[test]
    fn entitlement_decodes_api_shape() {
        let raw = r#"{
            "id": "1019653849998299136",
            "sku_id": "1019475255913222144",
            "application_id": "1019370614521200640",
            "user_id": "771129655544643584",
            "guild_id": null,
            "type": 8,
            "deleted": false,
            "starts_at": "2024-01-01T00:00:00+00:00",
            "ends_at": null,
            "subscription_id": "1019653835926409216"
        }"#;
        let entitlement: Entitlement = serde_json::from_str(raw).expect("decode");
        assert!(entitlement.is_subscription());
        assert_eq!(entitlement.subscription(), Some("1019653835926409216"));
        assert_eq!(entitlement.guild_id, None);
        assert_eq!(entitlement.ends_at, None);
        assert_eq!(
            entitlement.starts_at.as_deref().and_then(parse_api_timestamp),
            Some(at(0))
        );
    }

    #[test]
    fn blank_subscription_id_is_ignored() {
        let entitlement = Entitlement {
            id: "1".to_string(),
            user_id: None,
            guild_id: None,
            subscription_id: Some("  ".to_string()),
            kind: 6,
            starts_at: None,
            ends_at: None,
        };
        assert_eq!(entitlement.subscription(), None);
    }

    #[test]
    fn non_subscription_types_are_filtered() {
        for kind in [1u8, 2, 3, 4, 5, 7] {
            let entitlement = Entitlement {
                id: "1".to_string(),
                user_id: None,
                guild_id: None,
                subscription_id: None,
                kind,
                starts_at: None,
                ends_at: None,
            };
            assert!(!entitlement.is_subscription(), "type {kind}");
        }
    }

    #[test]
    fn shard_summary_degraded_when_either_count_short() {
        let healthy = ShardSummary { total: 4, online: 4, connected: 4 };
        assert!(!healthy.is_degraded(4));
        let offline = ShardSummary { total: 4, online: 3, connected: 4 };
        assert!(offline.is_degraded(4));
        let disconnected = ShardSummary { total: 4, online: 4, connected: 2 };
        assert!(disconnected.is_degraded(4));
    }

    #[test]
    fn db_timestamps_sort_lexically() {
        let earlier = format_db_timestamp(at(9));
        let later = format_db_timestamp(at(10));
        assert_eq!(earlier, "2024-01-01T09:00:00Z");
        assert!(earlier < later);
    }
}
