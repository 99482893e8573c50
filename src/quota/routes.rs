//! HTTP surface for the advisory usage report.
//!
//! One read-only endpoint, `GET /api/plan/usage`, safe to poll arbitrarily
//! often. The wire format keeps the legacy `-1 = unlimited` marker for the
//! `limit` field; everywhere else in the crate the limit stays tagged.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::evaluator::{PlanUsage, Severity, UsageSnapshot};
use super::report::UsageReporter;
use super::store::{SharedSubscriptionStore, SharedUsageStore};
use crate::error::AppError;
use crate::http::{AccountId, RouteModule};
use crate::plans::FeatureId;

/// Shared state for the quota routes.
#[derive(Clone)]
pub struct QuotaState {
    reporter: Arc<UsageReporter<SharedSubscriptionStore, SharedUsageStore>>,
}

impl QuotaState {
    /// Create route state around a reporter.
    #[must_use]
    pub fn new(reporter: UsageReporter<SharedSubscriptionStore, SharedUsageStore>) -> Self {
        Self {
            reporter: Arc::new(reporter),
        }
    }
}

/// Route module exposing the usage report.
pub struct UsageRoutes;

impl RouteModule<QuotaState> for UsageRoutes {
    fn routes(&self) -> Router<QuotaState> {
        Router::new().route("/plan/usage", get(plan_usage))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api")
    }
}

async fn plan_usage(
    State(state): State<QuotaState>,
    AccountId(account_id): AccountId,
) -> Result<Json<UsageReportBody>, AppError> {
    let usage = state.reporter.report(&account_id).await?;
    Ok(Json(UsageReportBody::from(usage)))
}

/// Wire shape of the usage report.
#[derive(Debug, Serialize)]
pub struct UsageReportBody {
    /// The account's plan identifier.
    pub plan: String,
    /// Per-resource usage, keyed by resource kind.
    pub usage: BTreeMap<&'static str, ResourceUsageBody>,
    /// Features granted by the plan.
    pub features: Vec<FeatureId>,
}

/// Wire shape of one resource's usage.
#[derive(Debug, Serialize)]
pub struct ResourceUsageBody {
    /// Count owned by the account.
    pub current: u64,
    /// The plan's cap, or `-1` for unlimited.
    pub limit: i64,
    /// Percent of the cap used; absent for unlimited resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,
    /// Advisory classification for client display.
    pub severity: Severity,
}

impl From<PlanUsage> for UsageReportBody {
    fn from(usage: PlanUsage) -> Self {
        Self {
            plan: usage.plan_id,
            usage: usage
                .resources
                .iter()
                .map(|snap| (snap.kind.as_str(), ResourceUsageBody::from(snap)))
                .collect(),
            features: usage.features,
        }
    }
}

impl From<&UsageSnapshot> for ResourceUsageBody {
    fn from(snap: &UsageSnapshot) -> Self {
        Self {
            current: snap.current,
            limit: snap.limit.as_wire(),
            percentage: snap.percentage,
            severity: snap.severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::{Limit, ResourceKind};
    use crate::quota::evaluator::snapshot;

    #[test]
    fn test_finite_resource_body() {
        let snap = snapshot(ResourceKind::Recipe, 8, Limit::Finite(10));
        let body = ResourceUsageBody::from(&snap);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current": 8,
                "limit": 10,
                "percentage": 80,
                "severity": "near_limit",
            })
        );
    }

    #[test]
    fn test_unlimited_resource_body_omits_percentage() {
        let snap = snapshot(ResourceKind::Recipe, 5000, Limit::Unlimited);
        let body = ResourceUsageBody::from(&snap);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current": 5000,
                "limit": -1,
                "severity": "normal",
            })
        );
        assert!(json.get("percentage").is_none());
    }

    #[test]
    fn test_report_body_keys() {
        let usage = PlanUsage {
            plan_id: "free".to_string(),
            resources: vec![
                snapshot(ResourceKind::Recipe, 1, Limit::Finite(50)),
                snapshot(ResourceKind::ShoppingList, 0, Limit::Finite(5)),
            ],
            features: vec![FeatureId::BasicRecipes],
        };

        let body = UsageReportBody::from(usage);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["plan"], "free");
        assert!(json["usage"]["recipes"].is_object());
        assert!(json["usage"]["shopping_lists"].is_object());
        assert_eq!(json["features"][0], "basic_recipes");
    }
}
