#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use rusqlite::{Connection, params};
use tempfile::TempDir;
use upkeep_app::config::{BillingConfig, DatabaseConfig, DiscordConfig, SamplerConfig};
use upkeep_app::{
    AppConfig, AppError, AppState, EntitlementSource, Environment, LatencyProbe, ProcessStats,
    Result, RunClock,
};
use upkeep_core::Entitlement;
use upkeep_db::Db;

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
    pub db: Db,
}

impl TestApp {
    pub fn dir(&self) -> &Path {
        self._dir.path()
    }

    pub fn bot_conn(&self) -> Connection {
        Connection::open(&self.state.config.database.path).expect("open side conn")
    }
}

pub fn setup_app(sampler: SamplerConfig) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig {
        database: DatabaseConfig {
            path: dir.path().join("ops.sqlite"),
        },
        discord: DiscordConfig {
            application_id: "1019370614521200640".to_string(),
            token: None,
            api_base: "http://127.0.0.1:9".to_string(),
        },
        billing: BillingConfig::default(),
        sampler,
    };
    let state = AppState::new(config);
    let db = state.open_db().expect("open db");
    TestApp {
        _dir: dir,
        state,
        db,
    }
}

pub fn live_sampler(shard_count: u32, log_files: Vec<PathBuf>) -> SamplerConfig {
    SamplerConfig {
        environment: Environment::Live,
        shard_count,
        log_files,
        ..SamplerConfig::default()
    }
}

pub fn utc(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, min, 0).unwrap()
}

pub fn clock(day: u32, hour: u32, min: u32) -> RunClock {
    let utc = utc(day, hour, min);
    let local: NaiveDateTime = utc.naive_utc();
    RunClock { utc, local }
}

pub fn entitlement(id: u64, kind: u8, subscription: Option<&str>) -> Entitlement {
    Entitlement {
        id: id.to_string(),
        user_id: Some(format!("user-{id}")),
        guild_id: None,
        subscription_id: subscription.map(str::to_string),
        kind,
        starts_at: Some("2024-01-01T00:00:00+00:00".to_string()),
        ends_at: Some("2024-02-01T00:00:00+00:00".to_string()),
    }
}

/// Serves pre-built pages in order and records the cursor of every request.
pub struct FakeSource {
    pages: RefCell<Vec<Vec<Entitlement>>>,
    pub requests: RefCell<Vec<u64>>,
}

impl FakeSource {
    pub fn new(pages: Vec<Vec<Entitlement>>) -> Self {
        Self {
            pages: RefCell::new(pages),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl EntitlementSource for FakeSource {
    fn fetch_page(&self, after: u64) -> Result<Vec<Entitlement>> {
        self.requests.borrow_mut().push(after);
        let mut pages = self.pages.borrow_mut();
        if pages.is_empty() {
            return Err(AppError::ExternalService("no more pages".to_string()));
        }
        Ok(pages.remove(0))
    }
}

pub struct FakeProcesses {
    pub cpu: Option<f64>,
}

impl ProcessStats for FakeProcesses {
    fn cpu_percent(&self, _pattern: &Regex) -> Result<f64> {
        self.cpu
            .ok_or_else(|| AppError::ExternalService("process table unavailable".to_string()))
    }
}

#[derive(Default)]
pub struct FakeLatency {
    pub platform: Option<u64>,
    pub internal: Option<u64>,
    pub calls: Cell<usize>,
}

impl LatencyProbe for FakeLatency {
    fn platform_ping(&self) -> Result<u64> {
        self.calls.set(self.calls.get() + 1);
        self.platform
            .ok_or_else(|| AppError::ExternalService("platform unreachable".to_string()))
    }

    fn internal_ping(&self) -> Result<Option<u64>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.internal)
    }
}

pub fn insert_cluster_counts(conn: &Connection, cluster_id: i64, dev: bool, users: i64) {
    conn.execute(
        r#"
        INSERT INTO infobot_discord_counts (
          shard_id, cluster_id, dev, user_count, server_count, channel_count, memory_usage, games
        ) VALUES (0, ?1, ?2, ?3, 10, 100, 512, 1)
        "#,
        params![cluster_id, dev as i64, users],
    )
    .expect("insert counts");
}

pub fn insert_shards(conn: &Connection, total: i64, online: i64, connected: i64) {
    for id in 0..total {
        conn.execute(
            "INSERT INTO infobot_shard_status (id, cluster_id, online, connected) VALUES (?1, 0, ?2, ?3)",
            params![id, (id < online) as i64, (id < connected) as i64],
        )
        .expect("insert shard");
    }
}
