//! Subscription plans: identifiers, limits, features, and the static catalog.

pub mod catalog;
pub mod types;

pub use catalog::{PlanBuilder, PlanCatalog, PlanCatalogBuilder, PlanConfig, PlanLimits};
pub use types::{FeatureId, Limit, ResourceKind};
