use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use upkeep_core::{
    BillingCredit, ENTITLEMENT_PAGE_SIZE, Entitlement, UpsertOutcome, activity_at,
    format_db_timestamp,
};
use upkeep_db::Db;

use crate::discord::EntitlementSource;
use crate::error::{AppError, Result};
use crate::services::SharedConfig;
use crate::util::time::{describe_timestamp, parse_optional_timestamp};

/// Summary of one reconcile run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub pages: usize,
    pub seen: usize,
    pub subscriptions: usize,
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    pub without_subscription_id: usize,
    pub last_id: u64,
}

#[derive(Clone)]
pub struct EntitlementService {
    config: SharedConfig,
}

impl EntitlementService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Pages through every entitlement and upserts one billing credit per
    /// subscription. Stops after the first short page.
    pub fn reconcile(
        &self,
        db: &mut Db,
        source: &dyn EntitlementSource,
        now: DateTime<Utc>,
    ) -> Result<ReconcileStats> {
        let mut stats = ReconcileStats::default();
        loop {
            let after = stats.last_id;
            let page = source.fetch_page(after)?;
            stats.pages += 1;
            debug!(after, records = page.len(), "fetched entitlement page");

            for entitlement in &page {
                stats.last_id = entitlement_cursor(entitlement)?;
                stats.seen += 1;
                if !entitlement.is_subscription() {
                    stats.skipped += 1;
                    continue;
                }
                stats.subscriptions += 1;
                self.apply(db, entitlement, now, &mut stats)?;
            }

            if page.len() < ENTITLEMENT_PAGE_SIZE {
                break;
            }
            if stats.last_id <= after {
                return Err(AppError::ExternalService(format!(
                    "entitlement pagination did not advance past {after}"
                )));
            }
        }
        info!(
            pages = stats.pages,
            seen = stats.seen,
            subscriptions = stats.subscriptions,
            skipped = stats.skipped,
            inserted = stats.inserted,
            updated = stats.updated,
            "entitlements reconciled"
        );
        Ok(stats)
    }

    fn apply(
        &self,
        db: &mut Db,
        entitlement: &Entitlement,
        now: DateTime<Utc>,
        stats: &mut ReconcileStats,
    ) -> Result<()> {
        let start = parse_optional_timestamp("starts_at", entitlement.starts_at.as_deref());
        let end = parse_optional_timestamp("ends_at", entitlement.ends_at.as_deref());
        let activity = activity_at(now, start, end);
        info!(
            subscription = entitlement.subscription_id.as_deref().unwrap_or(""),
            user = entitlement.user_id.as_deref().unwrap_or(""),
            guild = entitlement.guild_id.as_deref().unwrap_or(""),
            active = activity.as_flag(),
            activity = ?activity,
            start = %describe_timestamp(start),
            end = %describe_timestamp(end),
            kind = entitlement.kind,
            "subscription"
        );

        let Some(subscription_id) = entitlement.subscription() else {
            stats.without_subscription_id += 1;
            return Ok(());
        };
        let now = format_db_timestamp(now);
        let credit = BillingCredit {
            user_id: entitlement.user_id.clone(),
            subscription_id: subscription_id.to_string(),
            guild_id: entitlement.guild_id.clone(),
            active: activity.is_active(),
            since: now.clone(),
            plan_id: self.config.billing.plan_id.clone(),
            payment_failed: false,
        };
        match db.upsert_billing_credit(&credit, &now)? {
            UpsertOutcome::Inserted => stats.inserted += 1,
            UpsertOutcome::Updated => stats.updated += 1,
        }
        Ok(())
    }
}

fn entitlement_cursor(entitlement: &Entitlement) -> Result<u64> {
    entitlement.id.trim().parse::<u64>().map_err(|_| {
        AppError::ExternalService(format!("entitlement id {:?} is not numeric", entitlement.id))
    })
}
