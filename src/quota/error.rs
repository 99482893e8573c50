//! Quota-specific error types.
//!
//! Every quota decision that does not allow an operation is expressed as one
//! of these four kinds, returned as a value so callers can branch on it and
//! render an appropriate message. Nothing in this module is raised as a
//! panic or swallowed.

use thiserror::Error;

use crate::error::AppError;
use crate::plans::{FeatureId, ResourceKind};

/// Reasons a quota-gated operation is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuotaError {
    /// The account already owns as many of this resource as its plan allows.
    ///
    /// User-recoverable by upgrading the plan or deleting existing
    /// resources; never retried automatically.
    #[error("{kind} limit reached ({current}/{limit})")]
    LimitReached {
        /// The capped resource kind.
        kind: ResourceKind,
        /// Count observed at decision time.
        current: u64,
        /// The plan's cap for this kind.
        limit: u64,
    },

    /// A store needed to verify the quota was unavailable or timed out.
    ///
    /// Transient; safe for the caller to retry with backoff. Creation is
    /// denied while this holds (fail-closed), never allowed.
    #[error("quota could not be verified: {reason}")]
    ServiceUnavailable {
        /// What failed, for operators.
        reason: String,
    },

    /// The account's plan assignment does not match any catalog entry.
    ///
    /// A data-integrity problem, not a user error; logged as an operational
    /// anomaly and surfaced as a generic server error.
    #[error("unknown plan '{plan_id}'")]
    ConfigurationError {
        /// The unrecognized plan identifier.
        plan_id: String,
    },

    /// The plan does not grant the requested feature.
    ///
    /// User-recoverable by upgrading.
    #[error("feature '{feature}' is not included in plan '{plan_id}'")]
    FeatureDenied {
        /// The gated feature.
        feature: FeatureId,
        /// The account's current plan.
        plan_id: String,
    },
}

impl QuotaError {
    /// Check if this is a client error (the caller can act on it).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::LimitReached { .. } | Self::FeatureDenied { .. })
    }

    /// Check if this is a server-side problem.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable { .. } | Self::ConfigurationError { .. }
        )
    }

    /// Check if the caller may retry the operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

impl From<QuotaError> for AppError {
    fn from(err: QuotaError) -> Self {
        match &err {
            // Both denial kinds point the user at an upgrade.
            QuotaError::LimitReached { .. } | QuotaError::FeatureDenied { .. } => {
                AppError::UpgradeRequired(err.to_string())
            }

            // Transient dependency failure, retryable by the client.
            QuotaError::ServiceUnavailable { .. } => {
                AppError::ServiceUnavailable(err.to_string())
            }

            // Data-integrity problem; details stay out of the response body.
            QuotaError::ConfigurationError { .. } => AppError::Internal(err.to_string()),
        }
    }
}
