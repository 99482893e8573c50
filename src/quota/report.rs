//! Advisory usage reporting.
//!
//! Produces the live usage/limit summary the client UI polls to warn users
//! before they hit a limit. Read-only and idempotent; it runs the same
//! evaluator as the admission gate, so the advisory and authoritative views
//! can only differ by staleness, never by classification.

use super::error::QuotaError;
use super::evaluator::{self, PlanUsage, ResourceCounts};
use super::lookup;
use super::store::{SubscriptionStore, UsageStore};
use crate::config::QuotaConfig;
use crate::plans::{PlanCatalog, ResourceKind};

/// Computes on-demand usage reports for accounts.
///
/// Nothing is cached: every report re-reads the plan assignment and the
/// counts, so repeated calls always reflect the stores' current state.
pub struct UsageReporter<S, U> {
    catalog: PlanCatalog,
    subscriptions: S,
    usage: U,
    config: QuotaConfig,
}

impl<S: SubscriptionStore, U: UsageStore> UsageReporter<S, U> {
    /// Create a new usage reporter.
    #[must_use]
    pub fn new(catalog: PlanCatalog, subscriptions: S, usage: U, config: QuotaConfig) -> Self {
        Self {
            catalog,
            subscriptions,
            usage,
            config,
        }
    }

    /// The account's current usage against its plan.
    pub async fn report(&self, account_id: &str) -> Result<PlanUsage, QuotaError> {
        let deadline = self.config.store_timeout();

        let plan_id = lookup::resolve_plan(&self.subscriptions, deadline, account_id).await?;
        let plan = lookup::require_plan(&self.catalog, account_id, &plan_id)?;

        let mut counts = ResourceCounts::new();
        for kind in ResourceKind::ALL {
            let current = lookup::read_count(&self.usage, deadline, account_id, kind).await?;
            counts.insert(kind, current);
        }

        Ok(evaluator::evaluate(plan, &counts))
    }
}
