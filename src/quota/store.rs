//! Read interfaces over the external account and resource stores.
//!
//! This subsystem owns no persistent state: plan assignment lives in the
//! account store and resource counts live in the recipe/shopping-list
//! stores. These traits are the narrow read surface the quota core needs.
//! Counts are re-read on every check — nothing here caches across requests.

use async_trait::async_trait;
use thiserror::Error;

use crate::plans::ResourceKind;

/// Failure raised when an external store cannot answer.
///
/// The quota core treats this as "cannot verify" and denies the operation;
/// it never fails open.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("store unavailable: {reason}")]
pub struct StoreUnavailable {
    /// What failed, for operators.
    pub reason: String,
}

impl StoreUnavailable {
    /// Create a new store failure with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Read access to the account's subscription state.
///
/// Implement this over your account store. An in-memory implementation is
/// provided for testing.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// The plan identifier currently assigned to the account.
    ///
    /// Accounts without an explicit assignment are on the `free` plan, so
    /// this always yields an identifier; whether it matches a catalog entry
    /// is the caller's concern.
    async fn plan_id(&self, account_id: &str) -> Result<String, StoreUnavailable>;
}

/// Read access to per-account resource counts.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Number of resources of `kind` currently owned by the account.
    async fn resource_count(
        &self,
        account_id: &str,
        kind: ResourceKind,
    ) -> Result<u64, StoreUnavailable>;
}

#[async_trait]
impl<T: SubscriptionStore + ?Sized> SubscriptionStore for std::sync::Arc<T> {
    async fn plan_id(&self, account_id: &str) -> Result<String, StoreUnavailable> {
        (**self).plan_id(account_id).await
    }
}

#[async_trait]
impl<T: UsageStore + ?Sized> UsageStore for std::sync::Arc<T> {
    async fn resource_count(
        &self,
        account_id: &str,
        kind: ResourceKind,
    ) -> Result<u64, StoreUnavailable> {
        (**self).resource_count(account_id, kind).await
    }
}

/// Trait-object alias used by the HTTP layer.
pub type SharedSubscriptionStore = std::sync::Arc<dyn SubscriptionStore>;
/// Trait-object alias used by the HTTP layer.
pub type SharedUsageStore = std::sync::Arc<dyn UsageStore>;

/// In-memory stores for testing.
#[cfg(any(test, feature = "test-store"))]
pub mod test {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, RwLock};

    /// In-memory subscription store for testing.
    ///
    /// Wraps data in Arc for cheap cloning. Unknown accounts resolve to the
    /// `free` plan, matching the account schema's column default.
    #[derive(Clone)]
    pub struct InMemorySubscriptionStore {
        inner: Arc<SubscriptionInner>,
    }

    struct SubscriptionInner {
        plans: RwLock<HashMap<String, String>>,
        available: AtomicBool,
    }

    impl Default for InMemorySubscriptionStore {
        fn default() -> Self {
            Self {
                inner: Arc::new(SubscriptionInner {
                    plans: RwLock::new(HashMap::new()),
                    available: AtomicBool::new(true),
                }),
            }
        }
    }

    impl InMemorySubscriptionStore {
        /// Create a new in-memory store.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Assign a plan to an account.
        pub fn set_plan(&self, account_id: &str, plan_id: &str) {
            self.inner
                .plans
                .write()
                .unwrap()
                .insert(account_id.to_string(), plan_id.to_string());
        }

        /// Simulate the store going down (or coming back).
        pub fn set_available(&self, available: bool) {
            self.inner.available.store(available, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SubscriptionStore for InMemorySubscriptionStore {
        async fn plan_id(&self, account_id: &str) -> Result<String, StoreUnavailable> {
            if !self.inner.available.load(Ordering::SeqCst) {
                return Err(StoreUnavailable::new("subscription store offline"));
            }
            Ok(self
                .inner
                .plans
                .read()
                .unwrap()
                .get(account_id)
                .cloned()
                .unwrap_or_else(|| "free".to_string()))
        }
    }

    /// In-memory usage store for testing.
    #[derive(Clone)]
    pub struct InMemoryUsageStore {
        inner: Arc<UsageInner>,
    }

    struct UsageInner {
        counts: RwLock<HashMap<(String, ResourceKind), u64>>,
        available: AtomicBool,
    }

    impl Default for InMemoryUsageStore {
        fn default() -> Self {
            Self {
                inner: Arc::new(UsageInner {
                    counts: RwLock::new(HashMap::new()),
                    available: AtomicBool::new(true),
                }),
            }
        }
    }

    impl InMemoryUsageStore {
        /// Create a new in-memory store.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Set the count for an account/kind pair.
        pub fn set_count(&self, account_id: &str, kind: ResourceKind, count: u64) {
            self.inner
                .counts
                .write()
                .unwrap()
                .insert((account_id.to_string(), kind), count);
        }

        /// Record one created resource, as the resource store would after an
        /// admitted write. Returns the new count.
        pub fn record_created(&self, account_id: &str, kind: ResourceKind) -> u64 {
            let mut counts = self.inner.counts.write().unwrap();
            let entry = counts.entry((account_id.to_string(), kind)).or_insert(0);
            *entry += 1;
            *entry
        }

        /// Simulate the store going down (or coming back).
        pub fn set_available(&self, available: bool) {
            self.inner.available.store(available, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl UsageStore for InMemoryUsageStore {
        async fn resource_count(
            &self,
            account_id: &str,
            kind: ResourceKind,
        ) -> Result<u64, StoreUnavailable> {
            if !self.inner.available.load(Ordering::SeqCst) {
                return Err(StoreUnavailable::new("resource store offline"));
            }
            Ok(self
                .inner
                .counts
                .read()
                .unwrap()
                .get(&(account_id.to_string(), kind))
                .copied()
                .unwrap_or(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test::{InMemorySubscriptionStore, InMemoryUsageStore};
    use super::*;

    #[tokio::test]
    async fn test_unknown_account_defaults_to_free() {
        let store = InMemorySubscriptionStore::new();
        assert_eq!(store.plan_id("acct_nobody").await.unwrap(), "free");

        store.set_plan("acct_paid", "pro");
        assert_eq!(store.plan_id("acct_paid").await.unwrap(), "pro");
    }

    #[tokio::test]
    async fn test_subscription_store_outage() {
        let store = InMemorySubscriptionStore::new();
        store.set_available(false);
        let err = store.plan_id("acct_1").await.unwrap_err();
        assert!(err.reason.contains("offline"));

        store.set_available(true);
        assert!(store.plan_id("acct_1").await.is_ok());
    }

    #[tokio::test]
    async fn test_usage_store_counts() {
        let store = InMemoryUsageStore::new();
        assert_eq!(
            store
                .resource_count("acct_1", ResourceKind::Recipe)
                .await
                .unwrap(),
            0
        );

        store.set_count("acct_1", ResourceKind::Recipe, 7);
        assert_eq!(
            store
                .resource_count("acct_1", ResourceKind::Recipe)
                .await
                .unwrap(),
            7
        );

        // Kinds are tracked independently.
        assert_eq!(
            store
                .resource_count("acct_1", ResourceKind::ShoppingList)
                .await
                .unwrap(),
            0
        );

        assert_eq!(store.record_created("acct_1", ResourceKind::Recipe), 8);
    }

    #[tokio::test]
    async fn test_arc_blanket_impl() {
        let store: SharedUsageStore = std::sync::Arc::new(InMemoryUsageStore::new());
        assert_eq!(
            store
                .resource_count("acct_1", ResourceKind::Recipe)
                .await
                .unwrap(),
            0
        );
    }
}
