use rusqlite::{Connection, Row};
use upkeep_core::{BillingCredit, Latencies, LogCounts, MetricsSample, PopulationCounts};

use crate::error::Result;

pub(crate) const GRAPH_COLUMNS: &str = "entry_date, cpu, user_count, server_count, channel_count, \
     memory_usage, games, discord_ping, trivia_api_ping, db_ping, kicks, commands, \
     questions_asked, question_count";

pub(crate) fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn row_to_graph_sample(
    row: &Row<'_>,
) -> std::result::Result<MetricsSample, rusqlite::Error> {
    Ok(MetricsSample {
        entry_date: row.get(0)?,
        cpu: row.get(1)?,
        counts: PopulationCounts {
            user_count: row.get(2)?,
            server_count: row.get(3)?,
            channel_count: row.get(4)?,
            memory_usage: row.get(5)?,
            games: row.get(6)?,
        },
        latencies: Latencies {
            discord_ping: row.get::<_, i64>(7)?.max(0) as u64,
            trivia_api_ping: row.get::<_, i64>(8)?.max(0) as u64,
            db_ping: row.get::<_, i64>(9)?.max(0) as u64,
        },
        log: LogCounts {
            kicks: row.get::<_, i64>(10)?.max(0) as u64,
            commands: row.get::<_, i64>(11)?.max(0) as u64,
        },
        questions_asked: row.get(12)?,
        question_count: row.get(13)?,
    })
}

pub(crate) fn row_to_billing_credit(
    row: &Row<'_>,
) -> std::result::Result<BillingCredit, rusqlite::Error> {
    Ok(BillingCredit {
        user_id: row.get(0)?,
        subscription_id: row.get(1)?,
        guild_id: row.get(2)?,
        active: row.get::<_, i64>(3)? != 0,
        since: row.get(4)?,
        plan_id: row.get(5)?,
        payment_failed: row.get::<_, i64>(6)? != 0,
    })
}
