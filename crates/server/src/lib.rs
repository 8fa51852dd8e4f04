pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use db::DBService;
use services::services::{config::Config, reports::ReportService};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub reports: Arc<ReportService>,
    pub config: Arc<Config>,
}

/// Assembles the full application router. Auth and health stay public;
/// everything else sits behind the bearer-token middleware.
pub fn app(state: AppState) -> Router {
    let public = routes::auth::router().merge(routes::health::router());
    let protected = routes::clients::router()
        .merge(routes::service_types::router())
        .merge(routes::tasks::router())
        .merge(routes::support::router())
        .merge(routes::licenses::router())
        .merge(routes::reports::router())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
