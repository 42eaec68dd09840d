use rusqlite::{OptionalExtension, params};
use upkeep_core::{BillingCredit, UpsertOutcome};

use crate::Db;
use crate::error::Result;
use crate::helpers::row_to_billing_credit;

impl Db {
    /// Inserts a credit keyed by subscription id. An existing row only has its
    /// active flag refreshed; `since` and `plan_id` keep their first-seen values.
    pub fn upsert_billing_credit(
        &mut self,
        credit: &BillingCredit,
        now: &str,
    ) -> Result<UpsertOutcome> {
        let tx = self.conn.transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM premium_credits WHERE subscription_id = ?1",
                params![credit.subscription_id],
                |row| row.get(0),
            )
            .optional()?;
        tx.execute(
            r#"
            INSERT INTO premium_credits (
              user_id, subscription_id, guild_id, active, since, plan_id,
              payment_failed, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(subscription_id) DO UPDATE SET
              active = excluded.active,
              updated_at = excluded.updated_at
            "#,
            params![
                credit.user_id,
                credit.subscription_id,
                credit.guild_id,
                credit.active as i64,
                credit.since,
                credit.plan_id,
                credit.payment_failed as i64,
                now,
            ],
        )?;
        tx.commit()?;
        Ok(if existing.is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }

    pub fn billing_credit(&self, subscription_id: &str) -> Result<Option<BillingCredit>> {
        let credit = self
            .conn
            .query_row(
                r#"
                SELECT user_id, subscription_id, guild_id, active, since, plan_id, payment_failed
                FROM premium_credits
                WHERE subscription_id = ?1
                "#,
                params![subscription_id],
                row_to_billing_credit,
            )
            .optional()?;
        Ok(credit)
    }

    pub fn count_billing_credits(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM premium_credits", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
