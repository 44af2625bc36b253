//! HTTP route table.
//!
//! Everything except health, triage, and account creation sits behind the
//! bearer-auth middleware. Middleware reads `AppState` from an Extension
//! layer (outermost); handlers get it via `State`.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::context::AppState;
use crate::api::endpoints;
use crate::api::middleware;

pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/appointments/urgent-notification",
            post(endpoints::appointments::urgent_notification),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail).put(endpoints::appointments::update),
        )
        .route(
            "/prescriptions",
            get(endpoints::prescriptions::list).post(endpoints::prescriptions::create),
        )
        .route(
            "/prescriptions/:id/fulfill",
            put(endpoints::prescriptions::fulfill),
        )
        .route("/inventory", get(endpoints::inventory::list))
        .route("/inventory/update", post(endpoints::inventory::upsert))
        .route("/inventory/low-stock", get(endpoints::inventory::low_stock))
        .route(
            "/inventory/reorder",
            post(endpoints::inventory::create_reorder),
        )
        .route(
            "/inventory/reorders",
            get(endpoints::inventory::list_reorders),
        )
        .route(
            "/inventory/reorder/:id",
            put(endpoints::inventory::advance_reorder),
        )
        .route(
            "/followups",
            get(endpoints::followups::list).post(endpoints::followups::create),
        )
        .route("/followups/:id", put(endpoints::followups::update))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::register),
        )
        .route("/patients/:id", get(endpoints::patients::detail))
        .route("/admin/users", get(endpoints::admin::users))
        .route("/admin/users/:id", delete(endpoints::admin::delete_user))
        .route("/video/invite", post(endpoints::video::invite))
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the middleware can reach AppState.
        .layer(axum::Extension(state.clone()));

    // Open routes: liveness, triage, account creation.
    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/ai/analyze-symptoms", post(endpoints::triage::analyze))
        .with_state(state);

    Router::new()
        .merge(protected)
        .merge(open)
        .layer(CorsLayer::permissive())
}
