//! Admission control for resource-creating mutations.
//!
//! Creation endpoints call the gate before writing. Two tiers are provided:
//!
//! - [`AdmissionGate::can_create`] - advisory, lock-free pre-check used to
//!   return a friendly error early. It may race with competing creations.
//! - [`AdmissionGate::admit`] - **the authoritative enforcement point**. It
//!   serializes per `(account, kind)`, re-reads the count under the lock,
//!   and hands back an [`AdmissionPermit`] that keeps the key locked until
//!   the caller has performed the store write. With the lock held across
//!   read-decide-write, at most `limit` creations are ever admitted for a
//!   pair, no matter how many attempts run concurrently.
//!
//! If the backing resource store grows an atomic conditional insert
//! ("insert only if count < limit"), that insert becomes the authoritative
//! point and `admit` degrades to the advisory tier; until then, relying on
//! `can_create` alone under concurrent load is a correctness bug.
//!
//! Failures are fail-closed: a store outage or timeout denies the creation
//! with `ServiceUnavailable`, and a denied creation performs no writes.
//!
//! # Tracing Events
//!
//! - `quota.denied` - a creation was denied (limit reached)
//!
//! # Example
//!
//! ```rust,ignore
//! use platewise_quota::quota::AdmissionGate;
//! use platewise_quota::plans::ResourceKind;
//!
//! let permit = gate.admit(&account_id, ResourceKind::Recipe).await?;
//! recipe_store.insert(new_recipe).await?;
//! drop(permit); // releases the (account, kind) admission lock
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::QuotaError;
use super::lookup;
use super::store::{SubscriptionStore, UsageStore};
use crate::config::QuotaConfig;
use crate::plans::{Limit, PlanCatalog, ResourceKind};

/// Shrink the keyed-lock table every N admissions to keep idle keys from
/// accumulating.
const SHRINK_INTERVAL: u64 = 1000;

/// Outcome of an advisory admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// The creation may proceed.
    Allowed,
    /// The creation must be rejected for the contained reason.
    Denied(QuotaError),
}

impl AdmissionDecision {
    /// Check if the creation is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if denied.
    #[must_use]
    pub fn deny_reason(&self) -> Option<&QuotaError> {
        match self {
            Self::Allowed => None,
            Self::Denied(err) => Some(err),
        }
    }
}

/// Decide admission for one more resource at the given count and limit.
///
/// This is the entire decision: a pure function of the plan limit and the
/// current count, shared by both gate tiers.
#[must_use]
pub fn decide(kind: ResourceKind, current: u64, limit: Limit) -> AdmissionDecision {
    match limit {
        Limit::Unlimited => AdmissionDecision::Allowed,
        Limit::Finite(max) if current < max => AdmissionDecision::Allowed,
        Limit::Finite(max) => AdmissionDecision::Denied(QuotaError::LimitReached {
            kind,
            current,
            limit: max,
        }),
    }
}

/// Permission to create one resource, returned by [`AdmissionGate::admit`].
///
/// For finite-limit resources the permit holds the `(account, kind)`
/// admission lock, so no competing creation for the same pair can be
/// admitted while it is alive. Perform the store write, then drop the
/// permit. Unlimited resources carry no lock (there is nothing to race
/// for) and report a count of zero.
#[derive(Debug)]
pub struct AdmissionPermit {
    account_id: String,
    kind: ResourceKind,
    current: u64,
    limit: Limit,
    _serialized: Option<OwnedMutexGuard<()>>,
}

impl AdmissionPermit {
    /// The account the permit was issued to.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The resource kind the permit admits.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Count observed at decision time.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current
    }

    /// The plan's limit for this kind.
    #[must_use]
    pub fn limit(&self) -> Limit {
        self.limit
    }
}

/// Authoritative admission gate for resource-creating mutations.
///
/// Holds the immutable plan catalog and the read interfaces to the external
/// stores. The gate itself keeps no usage state between requests: every
/// decision re-reads the count from the store.
pub struct AdmissionGate<S, U> {
    catalog: PlanCatalog,
    subscriptions: S,
    usage: U,
    config: QuotaConfig,
    locks: DashMap<(String, ResourceKind), Arc<Mutex<()>>>,
    admissions: AtomicU64,
}

impl<S: SubscriptionStore, U: UsageStore> AdmissionGate<S, U> {
    /// Create a new admission gate.
    #[must_use]
    pub fn new(catalog: PlanCatalog, subscriptions: S, usage: U, config: QuotaConfig) -> Self {
        Self {
            catalog,
            subscriptions,
            usage,
            config,
            locks: DashMap::new(),
            admissions: AtomicU64::new(0),
        }
    }

    /// Advisory pre-check: would a creation be admitted right now?
    ///
    /// Runs the same decision logic as [`admit`](Self::admit) but takes no
    /// lock, so a competing creation may change the answer before the write
    /// happens. Use it to fail fast with a friendly error; use `admit` for
    /// the enforcement guarantee.
    pub async fn can_create(&self, account_id: &str, kind: ResourceKind) -> AdmissionDecision {
        let limit = match self.resolve_limit(account_id, kind).await {
            Ok(limit) => limit,
            Err(err) => return AdmissionDecision::Denied(err),
        };

        if limit.is_unlimited() {
            return AdmissionDecision::Allowed;
        }

        match lookup::read_count(&self.usage, self.config.store_timeout(), account_id, kind).await
        {
            Ok(current) => decide(kind, current, limit),
            Err(err) => AdmissionDecision::Denied(err),
        }
    }

    /// Admit one creation, serializing against competing attempts.
    ///
    /// On success the returned permit holds the `(account, kind)` admission
    /// lock; the caller performs the resource-store write and then drops the
    /// permit. On denial nothing is written and no lock is held.
    pub async fn admit(
        &self,
        account_id: &str,
        kind: ResourceKind,
    ) -> Result<AdmissionPermit, QuotaError> {
        let limit = self.resolve_limit(account_id, kind).await?;

        if limit.is_unlimited() {
            return Ok(AdmissionPermit {
                account_id: account_id.to_string(),
                kind,
                current: 0,
                limit,
                _serialized: None,
            });
        }

        let lock = self.admission_lock(account_id, kind);
        let guard = lock.lock_owned().await;

        // Re-read under the lock: the count may have moved while we waited.
        let current =
            lookup::read_count(&self.usage, self.config.store_timeout(), account_id, kind)
                .await?;

        match decide(kind, current, limit) {
            AdmissionDecision::Allowed => Ok(AdmissionPermit {
                account_id: account_id.to_string(),
                kind,
                current,
                limit,
                _serialized: Some(guard),
            }),
            AdmissionDecision::Denied(err) => {
                tracing::debug!(
                    target: "quota.denied",
                    account_id,
                    kind = kind.as_str(),
                    current,
                    limit = %limit,
                    "creation denied"
                );
                Err(err)
            }
        }
    }

    /// The number of admission locks currently tracked.
    #[must_use]
    pub fn lock_table_size(&self) -> usize {
        self.locks.len()
    }

    async fn resolve_limit(
        &self,
        account_id: &str,
        kind: ResourceKind,
    ) -> Result<Limit, QuotaError> {
        let plan_id =
            lookup::resolve_plan(&self.subscriptions, self.config.store_timeout(), account_id)
                .await?;
        let plan = lookup::require_plan(&self.catalog, account_id, &plan_id)?;
        Ok(plan.limit_for(kind))
    }

    fn admission_lock(&self, account_id: &str, kind: ResourceKind) -> Arc<Mutex<()>> {
        let count = self.admissions.fetch_add(1, Ordering::Relaxed);
        if count % SHRINK_INTERVAL == 0 && count > 0 {
            // A strong count of 1 means only the table holds the lock.
            self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }

        self.locks
            .entry((account_id.to_string(), kind))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::test::{InMemorySubscriptionStore, InMemoryUsageStore};
    use super::*;
    use crate::plans::FeatureId;

    fn test_catalog() -> PlanCatalog {
        PlanCatalog::builder()
            .plan("free")
            .limit(ResourceKind::Recipe, 10)
            .limit(ResourceKind::ShoppingList, 5)
            .features([FeatureId::BasicRecipes])
            .done()
            .plan("pro")
            .feature(FeatureId::AiRecommendations)
            .done()
            .build()
    }

    fn test_gate() -> (
        AdmissionGate<InMemorySubscriptionStore, InMemoryUsageStore>,
        InMemorySubscriptionStore,
        InMemoryUsageStore,
    ) {
        let subscriptions = InMemorySubscriptionStore::new();
        let usage = InMemoryUsageStore::new();
        let gate = AdmissionGate::new(
            test_catalog(),
            subscriptions.clone(),
            usage.clone(),
            QuotaConfig::default(),
        );
        (gate, subscriptions, usage)
    }

    #[test]
    fn test_decide_allow_iff_below_limit() {
        let limit = Limit::Finite(10);
        for current in 0..=15u64 {
            let decision = decide(ResourceKind::Recipe, current, limit);
            assert_eq!(
                decision.is_allowed(),
                current < 10,
                "wrong decision at count {current}"
            );
        }
    }

    #[test]
    fn test_decide_carries_limit_in_denial() {
        let decision = decide(ResourceKind::Recipe, 10, Limit::Finite(10));
        assert_eq!(
            decision.deny_reason(),
            Some(&QuotaError::LimitReached {
                kind: ResourceKind::Recipe,
                current: 10,
                limit: 10,
            })
        );
    }

    #[test]
    fn test_decide_unlimited_always_allows() {
        for current in [0, 1, 5000, u64::MAX] {
            assert!(decide(ResourceKind::Recipe, current, Limit::Unlimited).is_allowed());
        }
    }

    #[tokio::test]
    async fn test_can_create_under_and_at_limit() {
        let (gate, _, usage) = test_gate();

        for current in 0..=15u64 {
            usage.set_count("acct_1", ResourceKind::Recipe, current);
            let decision = gate.can_create("acct_1", ResourceKind::Recipe).await;
            assert_eq!(
                decision.is_allowed(),
                current < 10,
                "wrong decision at count {current}"
            );
        }
    }

    #[tokio::test]
    async fn test_can_create_denies_with_limit_details() {
        let (gate, _, usage) = test_gate();
        usage.set_count("acct_1", ResourceKind::Recipe, 10);

        let decision = gate.can_create("acct_1", ResourceKind::Recipe).await;
        assert_eq!(
            decision.deny_reason(),
            Some(&QuotaError::LimitReached {
                kind: ResourceKind::Recipe,
                current: 10,
                limit: 10,
            })
        );
    }

    #[tokio::test]
    async fn test_can_create_unlimited_plan() {
        let (gate, subscriptions, usage) = test_gate();
        subscriptions.set_plan("acct_pro", "pro");
        usage.set_count("acct_pro", ResourceKind::Recipe, 5000);

        let decision = gate.can_create("acct_pro", ResourceKind::Recipe).await;
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_can_create_unknown_plan_is_configuration_error() {
        let (gate, subscriptions, _) = test_gate();
        subscriptions.set_plan("acct_old", "enterprise-legacy");

        let decision = gate.can_create("acct_old", ResourceKind::Recipe).await;
        assert_eq!(
            decision.deny_reason(),
            Some(&QuotaError::ConfigurationError {
                plan_id: "enterprise-legacy".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_fail_closed_when_usage_store_down() {
        let (gate, _, usage) = test_gate();
        usage.set_available(false);

        let decision = gate.can_create("acct_1", ResourceKind::Recipe).await;
        assert!(matches!(
            decision.deny_reason(),
            Some(QuotaError::ServiceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_fail_closed_when_subscription_store_down() {
        let (gate, subscriptions, _) = test_gate();
        subscriptions.set_available(false);

        let decision = gate.can_create("acct_1", ResourceKind::Recipe).await;
        assert!(matches!(
            decision.deny_reason(),
            Some(QuotaError::ServiceUnavailable { .. })
        ));

        let err = gate.admit("acct_1", ResourceKind::Recipe).await.unwrap_err();
        assert!(matches!(err, QuotaError::ServiceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_admit_issues_permit_and_denies_at_limit() {
        let (gate, _, usage) = test_gate();
        usage.set_count("acct_1", ResourceKind::ShoppingList, 4);

        let permit = gate.admit("acct_1", ResourceKind::ShoppingList).await.unwrap();
        assert_eq!(permit.kind(), ResourceKind::ShoppingList);
        assert_eq!(permit.current(), 4);
        assert_eq!(permit.limit(), Limit::Finite(5));

        // The caller's write lands while the permit is held.
        usage.record_created("acct_1", ResourceKind::ShoppingList);
        drop(permit);

        let err = gate
            .admit("acct_1", ResourceKind::ShoppingList)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            QuotaError::LimitReached {
                kind: ResourceKind::ShoppingList,
                current: 5,
                limit: 5,
            }
        );
    }

    #[tokio::test]
    async fn test_admit_unlimited_takes_no_lock() {
        let (gate, subscriptions, _) = test_gate();
        subscriptions.set_plan("acct_pro", "pro");

        let permit = gate.admit("acct_pro", ResourceKind::Recipe).await.unwrap();
        assert!(permit.limit().is_unlimited());
        assert_eq!(gate.lock_table_size(), 0);
    }

    #[tokio::test]
    async fn test_admit_serializes_waiters() {
        let (gate, _, usage) = test_gate();
        let gate = Arc::new(gate);

        // One slot left under the limit; two racing attempts.
        usage.set_count("acct_1", ResourceKind::ShoppingList, 4);

        let first = gate.admit("acct_1", ResourceKind::ShoppingList).await.unwrap();

        let racer = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.admit("acct_1", ResourceKind::ShoppingList).await })
        };

        // The racer cannot be admitted while the permit is held.
        tokio::task::yield_now().await;
        assert!(!racer.is_finished());

        usage.record_created("acct_1", ResourceKind::ShoppingList);
        drop(first);

        let second = racer.await.unwrap();
        assert!(matches!(second, Err(QuotaError::LimitReached { .. })));
    }

    #[tokio::test]
    async fn test_denied_admit_releases_lock() {
        let (gate, _, usage) = test_gate();
        usage.set_count("acct_1", ResourceKind::Recipe, 10);

        // Denials must not leave the key locked.
        for _ in 0..3 {
            let err = gate.admit("acct_1", ResourceKind::Recipe).await.unwrap_err();
            assert!(matches!(err, QuotaError::LimitReached { .. }));
        }
    }
}
