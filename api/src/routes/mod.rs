//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Health check endpoint (public)
//! - `/attendance` → Session creation, check-in, rosters, history (authenticated)
//! - `/reports` → Aggregate progress reports (authenticated)

use crate::auth::guards::allow_authenticated;
use axum::{middleware::from_fn, Router};
use util::state::AppState;

pub mod attendance;
pub mod common;
pub mod health;
pub mod reports;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has `AppState` as its state type and mounts all
/// core API routes under their respective base paths. Per-class
/// authorization (teacher-of-record or admin) happens inside handlers
/// via `services::access::has_elevated_access`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health::health_routes())
        .nest(
            "/attendance",
            attendance::attendance_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/reports",
            reports::report_routes().route_layer(from_fn(allow_authenticated)),
        )
}
