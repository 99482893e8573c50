//! Feature gating.
//!
//! Plan-restricted capabilities (AI recommendations, recipe import, ...)
//! are granted or withheld wholesale by the account's plan; no counting is
//! involved. Feature-gated endpoints call [`FeatureGate::require_feature`]
//! before executing.

use super::error::QuotaError;
use super::lookup;
use super::store::SubscriptionStore;
use crate::config::QuotaConfig;
use crate::plans::{FeatureId, PlanCatalog, PlanConfig};

/// Gate for plan-restricted capabilities.
pub struct FeatureGate<S> {
    catalog: PlanCatalog,
    subscriptions: S,
    config: QuotaConfig,
}

impl<S: SubscriptionStore> FeatureGate<S> {
    /// Create a new feature gate.
    #[must_use]
    pub fn new(catalog: PlanCatalog, subscriptions: S, config: QuotaConfig) -> Self {
        Self {
            catalog,
            subscriptions,
            config,
        }
    }

    /// Check if the account's plan grants a feature.
    pub async fn has_feature(
        &self,
        account_id: &str,
        feature: FeatureId,
    ) -> Result<bool, QuotaError> {
        let plan = self.resolve_plan(account_id).await?;
        Ok(plan.has_feature(feature))
    }

    /// Require a feature, failing with [`QuotaError::FeatureDenied`] when the
    /// plan withholds it.
    pub async fn require_feature(
        &self,
        account_id: &str,
        feature: FeatureId,
    ) -> Result<(), QuotaError> {
        let plan = self.resolve_plan(account_id).await?;
        if plan.has_feature(feature) {
            Ok(())
        } else {
            Err(QuotaError::FeatureDenied {
                feature,
                plan_id: plan.id.clone(),
            })
        }
    }

    async fn resolve_plan(&self, account_id: &str) -> Result<&PlanConfig, QuotaError> {
        let plan_id =
            lookup::resolve_plan(&self.subscriptions, self.config.store_timeout(), account_id)
                .await?;
        lookup::require_plan(&self.catalog, account_id, &plan_id)
    }
}
