use rusqlite::{Connection, TransactionBehavior, params};

use crate::Db;
use crate::error::Result;

// The bot keeps one row in `counters` and bumps `asked` for every question it
// puts to a channel.
impl Db {
    pub fn questions_asked(&self) -> Result<i64> {
        read_questions_asked(&self.conn)
    }

    pub fn increment_questions_asked(&self, by: i64) -> Result<()> {
        self.conn.execute("UPDATE counters SET asked = asked + ?1", params![by])?;
        Ok(())
    }

    /// Reads the rolling counter and zeroes it under one write lock.
    pub fn take_questions_asked(&mut self) -> Result<i64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = take_questions_asked_in(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn read_questions_asked(conn: &Connection) -> Result<i64> {
    let value: i64 = conn.query_row(
        "SELECT COALESCE(SUM(asked), 0) FROM counters",
        [],
        |row| row.get(0),
    )?;
    Ok(value)
}

/// Caller must hold a write transaction so no increment lands between the
/// read and the reset.
pub(crate) fn take_questions_asked_in(conn: &Connection) -> Result<i64> {
    let value = read_questions_asked(conn)?;
    conn.execute("UPDATE counters SET asked = 0", [])?;
    Ok(value)
}
