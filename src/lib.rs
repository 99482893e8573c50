//! Platewise quota - plan-tiered resource quotas, admission control, and
//! feature entitlements for the Platewise meal-planning API.
//!
//! Accounts belong to a subscription plan (`free`, `pro`, `family`); each
//! plan caps countable resources (recipes, shopping lists) and grants a set
//! of gated features. This crate:
//!
//! - computes current usage against plan limits ([`quota::UsageReporter`])
//! - authoritatively blocks creations that would exceed a limit
//!   ([`quota::AdmissionGate`]), fail-closed and race-free per account
//! - exposes the advisory usage summary at `GET /api/plan/usage`
//!   ([`quota::UsageRoutes`]) so the UI can warn before a limit is hit
//! - gates plan-restricted capabilities ([`quota::FeatureGate`])
//!
//! Identity, persistence of the counted resources, and billing are owned by
//! the surrounding application; this crate only reads plan assignment and
//! counts through the traits in [`quota::store`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use platewise_quota::{self, QuotaConfig};
//! use platewise_quota::plans::{PlanCatalog, ResourceKind};
//! use platewise_quota::quota::AdmissionGate;
//!
//! platewise_quota::init_tracing();
//!
//! let gate = AdmissionGate::new(
//!     PlanCatalog::default_catalog(),
//!     subscription_store,
//!     usage_store,
//!     QuotaConfig::builder().from_env().build(),
//! );
//!
//! match gate.admit(&account_id, ResourceKind::Recipe).await {
//!     Ok(permit) => {
//!         recipe_store.insert(new_recipe).await?;
//!         drop(permit);
//!     }
//!     Err(err) => return Err(err.into()),
//! }
//! ```

mod config;
mod error;
pub mod http;
pub mod plans;
pub mod quota;

// Re-exports for public API
pub use config::{QuotaConfig, QuotaConfigBuilder};
pub use error::{AppError, ErrorResponse, Result};
pub use http::{AccountId, RouteModule};
pub use plans::{FeatureId, Limit, PlanCatalog, PlanConfig, PlanLimits, ResourceKind};
pub use quota::{
    AdmissionDecision, AdmissionGate, AdmissionPermit, FeatureGate, PlanUsage, QuotaError,
    QuotaState, Severity, StoreUnavailable, SubscriptionStore, UsageReporter, UsageRoutes,
    UsageSnapshot, UsageStore,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "platewise_quota=debug")
/// - `PLATEWISE_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("PLATEWISE_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
