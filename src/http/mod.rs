//! HTTP plumbing shared by route modules.

mod extract;
mod routes;

pub use extract::AccountId;
pub use routes::RouteModule;
