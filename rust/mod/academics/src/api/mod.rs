mod batches;

use std::sync::Arc;

use axum::Router;

use campus_core::PrincipalResolver;

use crate::service::BatchService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BatchService>,
    pub principals: Arc<dyn PrincipalResolver>,
}

/// Build the academics API router.
///
/// Routes are relative; the daemon nests them under `/academics`.
pub fn build_router(service: Arc<BatchService>, principals: Arc<dyn PrincipalResolver>) -> Router {
    Router::new()
        .merge(batches::routes())
        .with_state(AppState {
            service,
            principals,
        })
}
