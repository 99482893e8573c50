//! Pure quota evaluation.
//!
//! No I/O and no hidden state: given a plan and a set of current counts,
//! produce per-resource snapshots and the plan's feature list. The admission
//! gate and the usage report both go through this module, so the advisory
//! and authoritative views can never disagree on classification.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::plans::{FeatureId, Limit, PlanConfig, ResourceKind};

/// Percentage at which a resource is reported as approaching its limit.
///
/// Fixed design constant, not per-plan configuration.
pub const NEAR_LIMIT_PERCENT: u64 = 80;

/// Advisory classification of a resource's usage, for client display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Comfortably under the limit (percentage below 80).
    Normal,
    /// Approaching the limit (percentage 80-99).
    NearLimit,
    /// At or over the limit; creations are denied.
    AtLimit,
}

/// Point-in-time usage of a single resource kind.
///
/// Derived on demand and never persisted; each request recomputes from the
/// authoritative counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSnapshot {
    /// The resource kind this snapshot describes.
    pub kind: ResourceKind,
    /// Count owned by the account at read time.
    pub current: u64,
    /// The plan's limit for this kind.
    pub limit: Limit,
    /// `floor(current * 100 / limit)`, clamped to 100 for display.
    /// `None` when the limit is unlimited.
    pub percentage: Option<u8>,
    /// Advisory classification. Unlimited resources are always `Normal`.
    pub severity: Severity,
}

impl UsageSnapshot {
    /// Whether another resource of this kind may be created.
    #[must_use]
    pub fn within_limit(&self) -> bool {
        self.severity != Severity::AtLimit
    }

    /// Whether the account has exhausted this resource's cap.
    #[must_use]
    pub fn is_at_limit(&self) -> bool {
        self.severity == Severity::AtLimit
    }
}

/// Current counts keyed by resource kind.
pub type ResourceCounts = BTreeMap<ResourceKind, u64>;

/// Usage of every resource kind under a plan, plus the plan's features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanUsage {
    /// The plan the snapshots were evaluated against.
    pub plan_id: String,
    /// One snapshot per resource kind, in [`ResourceKind::ALL`] order.
    pub resources: Vec<UsageSnapshot>,
    /// Features granted by the plan.
    pub features: Vec<FeatureId>,
}

impl PlanUsage {
    /// The snapshot for a specific kind.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> Option<&UsageSnapshot> {
        self.resources.iter().find(|s| s.kind == kind)
    }
}

/// Classify a raw (unclamped) percentage.
#[must_use]
pub fn severity_for(percentage: u64) -> Severity {
    if percentage >= 100 {
        Severity::AtLimit
    } else if percentage >= NEAR_LIMIT_PERCENT {
        Severity::NearLimit
    } else {
        Severity::Normal
    }
}

/// Evaluate one resource kind against its limit.
#[must_use]
pub fn snapshot(kind: ResourceKind, current: u64, limit: Limit) -> UsageSnapshot {
    match limit {
        Limit::Unlimited => UsageSnapshot {
            kind,
            current,
            limit,
            percentage: None,
            severity: Severity::Normal,
        },
        Limit::Finite(max) => {
            let raw = raw_percentage(current, max);
            UsageSnapshot {
                kind,
                current,
                limit,
                percentage: Some(raw.min(100) as u8),
                severity: severity_for(raw),
            }
        }
    }
}

/// Evaluate every resource kind for a plan. Kinds absent from `counts`
/// evaluate at zero.
#[must_use]
pub fn evaluate(plan: &PlanConfig, counts: &ResourceCounts) -> PlanUsage {
    let resources = ResourceKind::ALL
        .iter()
        .map(|&kind| {
            let current = counts.get(&kind).copied().unwrap_or(0);
            snapshot(kind, current, plan.limit_for(kind))
        })
        .collect();

    PlanUsage {
        plan_id: plan.id.clone(),
        resources,
        features: plan.features.iter().copied().collect(),
    }
}

/// `floor(current * 100 / max)`, with a zero cap pinned to 100 since it can
/// never admit anything.
fn raw_percentage(current: u64, max: u64) -> u64 {
    if max == 0 {
        return 100;
    }
    current.saturating_mul(100) / max
}
