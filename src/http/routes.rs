use axum::Router;

/// Trait for composable route modules
///
/// Implement this trait to create modular, reusable route groups. Each
/// module registers its own routes and is composed into the application
/// router, with `S` being the shared handler state.
///
/// # Example
///
/// ```ignore
/// struct UsersModule;
///
/// impl RouteModule<AppState> for UsersModule {
///     fn routes(&self) -> Router<AppState> {
///         Router::new()
///             .route("/users", get(list_users))
///     }
/// }
/// ```
pub trait RouteModule<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Returns a router with all routes for this module
    ///
    /// The router should NOT have state applied - state is applied when the
    /// composed router is finalized with `with_state`.
    fn routes(&self) -> Router<S>
    where
        Self: Sized;

    /// Optional: specify a path prefix for all routes in this module
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Registers this module's routes into the application router
    fn register(self, router: Router<S>) -> Router<S>
    where
        Self: Sized,
    {
        let routes = self.routes();

        if let Some(prefix) = self.prefix() {
            router.nest(prefix, routes)
        } else {
            router.merge(routes)
        }
    }
}
