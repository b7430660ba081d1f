/// Health check endpoint
///
/// Provides a simple health check endpoint that verifies:
/// - The server is running
/// - Database connectivity, per role pool
///
/// # Endpoint
///
/// ```text
/// GET /api/health-check
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "message": "server running properly",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use folio_shared::db::health_check as ping;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Human-readable status line
    pub message: String,

    /// Application version
    pub version: String,

    /// Database status across both role pools
    pub database: String,
}

/// Health check handler
///
/// Returns service health status including database connectivity. Always
/// responds 200; a database outage is reported in the body, not the status
/// code, so load balancers can distinguish "down" from "degraded".
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let owner_ok = ping(&state.pools.owner).await.is_ok();
    let visitor_ok = ping(&state.pools.visitor).await.is_ok();

    let database = if owner_ok && visitor_ok {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthResponse {
        status: if owner_ok && visitor_ok {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        message: "server running properly".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}
