//! Plan-tiered quotas, admission control, and feature entitlements.
//!
//! Creation endpoints gate their writes through [`AdmissionGate`], client
//! UI polls [`UsageRoutes`] for the advisory usage summary, and
//! feature-restricted endpoints check [`FeatureGate`]. All three derive
//! from the same immutable [`PlanCatalog`](crate::plans::PlanCatalog) and
//! the same pure [`evaluator`], so they cannot disagree on classification.
//!
//! # Example
//!
//! ```rust,ignore
//! use platewise_quota::plans::{PlanCatalog, ResourceKind};
//! use platewise_quota::quota::AdmissionGate;
//! use platewise_quota::QuotaConfig;
//!
//! let gate = AdmissionGate::new(
//!     PlanCatalog::default_catalog(),
//!     subscription_store,
//!     usage_store,
//!     QuotaConfig::default(),
//! );
//!
//! // In the recipe-creation handler:
//! let permit = gate.admit(&account_id, ResourceKind::Recipe).await?;
//! recipe_store.insert(new_recipe).await?;
//! drop(permit);
//! ```

pub mod admission;
pub mod error;
pub mod evaluator;
pub mod features;
mod lookup;
pub mod report;
pub mod routes;
pub mod store;

// Admission exports
pub use admission::{decide, AdmissionDecision, AdmissionGate, AdmissionPermit};

// Error exports
pub use error::QuotaError;

// Evaluator exports
pub use evaluator::{
    evaluate, severity_for, snapshot, PlanUsage, ResourceCounts, Severity, UsageSnapshot,
    NEAR_LIMIT_PERCENT,
};

// Feature gate exports
pub use features::FeatureGate;

// Report exports
pub use report::UsageReporter;

// Route exports
pub use routes::{QuotaState, ResourceUsageBody, UsageReportBody, UsageRoutes};

// Store exports
pub use store::{
    SharedSubscriptionStore, SharedUsageStore, StoreUnavailable, SubscriptionStore, UsageStore,
};

// Test exports
#[cfg(any(test, feature = "test-store"))]
pub use store::test::{InMemorySubscriptionStore, InMemoryUsageStore};
