#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{Connection, params};
use tempfile::TempDir;
use upkeep_core::{Latencies, LogCounts, MetricsSample, PopulationCounts};
use upkeep_db::Db;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

impl TestDb {
    /// Side connection standing in for the bot, which owns the snapshot tables.
    pub fn bot_conn(&self) -> Connection {
        Connection::open(&self.path).expect("open side conn")
    }
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn insert_cluster_counts(conn: &Connection, cluster_id: i64, dev: bool, users: i64, servers: i64) {
    conn.execute(
        r#"
        INSERT INTO infobot_discord_counts (
          shard_id, cluster_id, dev, user_count, server_count, shard_count,
          channel_count, memory_usage, games
        ) VALUES (0, ?1, ?2, ?3, ?4, 1, ?5, ?6, ?7)
        "#,
        params![cluster_id, dev as i64, users, servers, servers * 10, 1_000 + cluster_id, 2],
    )
    .expect("insert counts");
}

pub fn insert_shard(conn: &Connection, id: i64, online: bool, connected: bool) {
    conn.execute(
        "INSERT INTO infobot_shard_status (id, cluster_id, online, connected) VALUES (?1, 0, ?2, ?3)",
        params![id, online as i64, connected as i64],
    )
    .expect("insert shard");
}

pub fn make_sample(entry_date: &str, users: i64) -> MetricsSample {
    MetricsSample {
        entry_date: entry_date.to_string(),
        cpu: 12.5,
        counts: PopulationCounts {
            user_count: users,
            server_count: 40,
            channel_count: 400,
            memory_usage: 2_048,
            games: 3,
        },
        latencies: Latencies {
            discord_ping: 80,
            trivia_api_ping: 20,
            db_ping: 1,
        },
        log: LogCounts {
            kicks: 1,
            commands: 9,
        },
        questions_asked: 0,
        question_count: 100,
    }
}
