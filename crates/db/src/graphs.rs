use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior, params};
use upkeep_core::{MetricsSample, format_db_timestamp};

use crate::Db;
use crate::counters::take_questions_asked_in;
use crate::error::Result;
use crate::helpers::{GRAPH_COLUMNS, row_to_graph_sample};

impl Db {
    pub fn insert_graph_sample(&self, sample: &MetricsSample) -> Result<i64> {
        insert_sample(&self.conn, sample)
    }

    /// Moves the questions-asked counter into the sample and writes the row in
    /// one transaction. If the insert fails the counter keeps its value.
    pub fn record_graph_sample(&mut self, mut sample: MetricsSample) -> Result<MetricsSample> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        sample.questions_asked = take_questions_asked_in(&tx)?;
        insert_sample(&tx, &sample)?;
        tx.commit()?;
        Ok(sample)
    }

    pub fn latest_graph_sample(&self) -> Result<Option<MetricsSample>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GRAPH_COLUMNS} FROM trivia_graphs ORDER BY entry_date DESC, id DESC LIMIT 1"
        ))?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row_to_graph_sample(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_graph_samples(&self) -> Result<Vec<MetricsSample>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GRAPH_COLUMNS} FROM trivia_graphs ORDER BY entry_date ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_graph_sample)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Deletes rows with an `entry_date` strictly before `cutoff`.
    pub fn prune_graph_samples(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM trivia_graphs WHERE entry_date < ?1",
            params![format_db_timestamp(cutoff)],
        )?;
        Ok(removed)
    }
}

fn insert_sample(conn: &Connection, sample: &MetricsSample) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO trivia_graphs ({GRAPH_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            sample.entry_date,
            sample.cpu,
            sample.counts.user_count,
            sample.counts.server_count,
            sample.counts.channel_count,
            sample.counts.memory_usage,
            sample.counts.games,
            sample.latencies.discord_ping as i64,
            sample.latencies.trivia_api_ping as i64,
            sample.latencies.db_ping as i64,
            sample.log.kicks as i64,
            sample.log.commands as i64,
            sample.questions_asked,
            sample.question_count,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
