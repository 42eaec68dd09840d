use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use upkeep_core::format_db_timestamp;

use crate::Db;
use crate::error::Result;
use crate::helpers::table_has_column;

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_add_graph_latency.sql");
const MIGRATION_0003: &str = include_str!("../migrations/0003_add_graph_activity.sql");

const LATENCY_COLUMNS: &[&str] = &["discord_ping", "trivia_api_ping", "db_ping"];
const ACTIVITY_COLUMNS: &[&str] = &[
    "games",
    "kicks",
    "commands",
    "questions_asked",
    "question_count",
];

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_graph_latency", MIGRATION_0002),
    ("0003_add_graph_activity", MIGRATION_0003),
];

impl Db {
    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migration (
              name TEXT PRIMARY KEY,
              applied_at TEXT NOT NULL
            )
            "#,
        )?;
        for (name, sql) in MIGRATIONS {
            if migration_applied(&tx, name)? {
                continue;
            }
            let graph_columns = match *name {
                "0002_add_graph_latency" => Some(LATENCY_COLUMNS),
                "0003_add_graph_activity" => Some(ACTIVITY_COLUMNS),
                _ => None,
            };
            // Graph tables written by older script revisions may already carry
            // some of these columns.
            match graph_columns {
                Some(columns) if any_graph_column(&tx, columns)? => {
                    ensure_graph_columns(&tx, columns)?;
                }
                _ => tx.execute_batch(sql)?,
            }
            record_migration(&tx, name)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn applied_migrations(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM schema_migration ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<Vec<String>, _>>()?)
    }
}

fn migration_applied(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM schema_migration WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn record_migration(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migration (name, applied_at) VALUES (?1, ?2)",
        params![name, format_db_timestamp(Utc::now())],
    )?;
    Ok(())
}

fn any_graph_column(conn: &Connection, columns: &[&str]) -> Result<bool> {
    for column in columns {
        if table_has_column(conn, "trivia_graphs", column)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn ensure_graph_columns(conn: &Connection, columns: &[&str]) -> Result<()> {
    for column in columns {
        if !table_has_column(conn, "trivia_graphs", column)? {
            conn.execute(
                &format!("ALTER TABLE trivia_graphs ADD COLUMN {column} INTEGER NOT NULL DEFAULT 0"),
                [],
            )?;
        }
    }
    Ok(())
}
