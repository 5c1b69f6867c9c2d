use axum::Router;

/// A business module that contributes HTTP routes to the server.
///
/// The daemon collects every module and nests each router under
/// `/{name}`.
pub trait Module: Send + Sync {
    /// Module name, used for logging and as the route prefix.
    fn name(&self) -> &str;

    /// Routes relative to the module prefix, with state already applied.
    fn routes(&self) -> Router;
}
