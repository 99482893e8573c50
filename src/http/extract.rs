//! Request extractors for the identity supplied by the auth layer.
//!
//! Authentication itself is owned by the outer application: its middleware
//! verifies the caller and inserts an [`AccountId`] extension into the
//! request. These routes only consume that identity; they never resolve it.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::future::Future;

use crate::error::AppError;

/// Identity of the authenticated account.
///
/// Use this in a handler to require an authenticated caller. The request is
/// rejected with 401 if the auth middleware did not run (or did not
/// authenticate anyone).
///
/// # Example
///
/// ```rust,ignore
/// async fn plan_usage(
///     AccountId(account_id): AccountId,
/// ) -> Result<Json<UsageReportBody>, AppError> {
///     // ...
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountId(pub String);

impl AccountId {
    /// The raw account identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        Box::pin(async move {
            parts
                .extensions
                .get::<AccountId>()
                .cloned()
                .ok_or_else(|| AppError::unauthorized("Missing authenticated account identity"))
        })
    }
}
