//! Shared plan and count resolution with the fail-closed timeout discipline.
//!
//! Every store read crosses a service boundary, so each one carries the
//! configured deadline. A timeout is treated identically to an outage: the
//! caller gets `ServiceUnavailable` and must deny, never allow.
//!
//! # Tracing Events
//!
//! - `quota.store_unavailable` - a store read failed or timed out
//! - `quota.unknown_plan` - an account is assigned a plan missing from the catalog

use std::time::Duration;

use tokio::time::timeout;

use super::error::QuotaError;
use super::store::{SubscriptionStore, UsageStore};
use crate::plans::{PlanCatalog, PlanConfig, ResourceKind};

/// Resolve the account's plan identifier within `deadline`.
pub(crate) async fn resolve_plan<S: SubscriptionStore>(
    store: &S,
    deadline: Duration,
    account_id: &str,
) -> Result<String, QuotaError> {
    match timeout(deadline, store.plan_id(account_id)).await {
        Ok(Ok(plan_id)) => Ok(plan_id),
        Ok(Err(err)) => {
            tracing::warn!(
                target: "quota.store_unavailable",
                account_id,
                error = %err,
                "plan lookup failed"
            );
            Err(QuotaError::ServiceUnavailable { reason: err.reason })
        }
        Err(_) => {
            tracing::warn!(
                target: "quota.store_unavailable",
                account_id,
                "plan lookup timed out"
            );
            Err(QuotaError::ServiceUnavailable {
                reason: "plan lookup timed out".to_string(),
            })
        }
    }
}

/// Read the account's current count for `kind` within `deadline`.
pub(crate) async fn read_count<U: UsageStore>(
    store: &U,
    deadline: Duration,
    account_id: &str,
    kind: ResourceKind,
) -> Result<u64, QuotaError> {
    match timeout(deadline, store.resource_count(account_id, kind)).await {
        Ok(Ok(count)) => Ok(count),
        Ok(Err(err)) => {
            tracing::warn!(
                target: "quota.store_unavailable",
                account_id,
                kind = kind.as_str(),
                error = %err,
                "usage count read failed"
            );
            Err(QuotaError::ServiceUnavailable { reason: err.reason })
        }
        Err(_) => {
            tracing::warn!(
                target: "quota.store_unavailable",
                account_id,
                kind = kind.as_str(),
                "usage count read timed out"
            );
            Err(QuotaError::ServiceUnavailable {
                reason: "usage count read timed out".to_string(),
            })
        }
    }
}

/// Look up a plan in the catalog, logging a catalog miss as the operational
/// anomaly it is (a validated account should never carry an unknown plan).
pub(crate) fn require_plan<'a>(
    catalog: &'a PlanCatalog,
    account_id: &str,
    plan_id: &str,
) -> Result<&'a PlanConfig, QuotaError> {
    catalog.get(plan_id).ok_or_else(|| {
        tracing::error!(
            target: "quota.unknown_plan",
            account_id,
            plan_id,
            "account is assigned a plan missing from the catalog"
        );
        QuotaError::ConfigurationError {
            plan_id: plan_id.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::super::store::test::{InMemorySubscriptionStore, InMemoryUsageStore};
    use super::super::store::StoreUnavailable;
    use super::*;
    use async_trait::async_trait;

    struct StalledStore;

    #[async_trait]
    impl UsageStore for StalledStore {
        async fn resource_count(
            &self,
            _account_id: &str,
            _kind: ResourceKind,
        ) -> Result<u64, StoreUnavailable> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_resolve_plan_maps_outage() {
        let store = InMemorySubscriptionStore::new();
        store.set_available(false);

        let err = resolve_plan(&store, Duration::from_secs(1), "acct_1")
            .await
            .unwrap_err();
        assert!(matches!(err, QuotaError::ServiceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_read_count_times_out() {
        let err = read_count(
            &StalledStore,
            Duration::from_millis(20),
            "acct_1",
            ResourceKind::Recipe,
        )
        .await
        .unwrap_err();

        match err {
            QuotaError::ServiceUnavailable { reason } => {
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected ServiceUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_count_passes_through() {
        let store = InMemoryUsageStore::new();
        store.set_count("acct_1", ResourceKind::ShoppingList, 4);

        let count = read_count(
            &store,
            Duration::from_secs(1),
            "acct_1",
            ResourceKind::ShoppingList,
        )
        .await
        .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_require_plan() {
        let catalog = PlanCatalog::default_catalog();
        assert!(require_plan(&catalog, "acct_1", "free").is_ok());

        let err = require_plan(&catalog, "acct_1", "enterprise-legacy").unwrap_err();
        assert_eq!(
            err,
            QuotaError::ConfigurationError {
                plan_id: "enterprise-legacy".to_string()
            }
        );
    }
}
