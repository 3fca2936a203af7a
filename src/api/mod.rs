//! HTTP surface of the relay.
//!
//! - `/`: Health check
//! - `/oauth/xero/callback`: OAuth redirect landing
//! - `/firms/connect`: Register a firm's Xero connection
//! - `/clients/search`: Contact name search
//! - `/clients/resolve`: Flattened single contact

pub mod routes;
pub mod shape;

use crate::SharedState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::relay_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
