use upkeep_core::{PopulationCounts, ShardSummary};

use crate::Db;
use crate::error::Result;

impl Db {
    /// Sums the per-cluster snapshot counters, ignoring development clusters.
    pub fn aggregate_counts(&self) -> Result<PopulationCounts> {
        let counts = self.conn.query_row(
            r#"
            SELECT
              COALESCE(SUM(user_count), 0),
              COALESCE(SUM(server_count), 0),
              COALESCE(SUM(channel_count), 0),
              COALESCE(SUM(memory_usage), 0),
              COALESCE(SUM(games), 0)
            FROM infobot_discord_counts
            WHERE dev = 0
            "#,
            [],
            |row| {
                Ok(PopulationCounts {
                    user_count: row.get(0)?,
                    server_count: row.get(1)?,
                    channel_count: row.get(2)?,
                    memory_usage: row.get(3)?,
                    games: row.get(4)?,
                })
            },
        )?;
        Ok(counts)
    }

    pub fn shard_summary(&self) -> Result<ShardSummary> {
        let summary = self.conn.query_row(
            r#"
            SELECT
              COUNT(*),
              COALESCE(SUM(CASE WHEN online != 0 THEN 1 ELSE 0 END), 0),
              COALESCE(SUM(CASE WHEN connected != 0 THEN 1 ELSE 0 END), 0)
            FROM infobot_shard_status
            "#,
            [],
            |row| {
                Ok(ShardSummary {
                    total: row.get::<_, i64>(0)?.max(0) as u32,
                    online: row.get::<_, i64>(1)?.max(0) as u32,
                    connected: row.get::<_, i64>(2)?.max(0) as u32,
                })
            },
        )?;
        Ok(summary)
    }

    pub fn question_bank_size(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count)
    }
}
