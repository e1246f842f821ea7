use axum::{
    extract::State, http::StatusCode, middleware::from_fn_with_state, response::IntoResponse,
    routing::get, Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::middleware::{auth_middleware, AuthOperator};
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    message: String,
}

/// Public health check endpoint
///
/// Returns status "ok" if the service is running
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            message: "Server is running".to_string(),
        }),
    )
}

/// Protected health check endpoint
///
/// Returns status "ok" along with the operator identity and the number of live sessions
#[utoipa::path(
    get,
    path = "/api/health/protected",
    responses(
        (status = 200, description = "Server is healthy and operator is authenticated", body = HealthResponse),
        (status = 401, description = "Unauthorized - Invalid or missing token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "health"
)]
pub async fn protected_health_check(
    operator: AuthOperator,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let active_sessions = state.sessions.active().await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            message: format!(
                "Server is running. Authenticated as operator: {}. Active notification sessions: {}",
                operator.operator_id, active_sessions
            ),
        }),
    )
}

pub fn routes(state: AppState) -> Router {
    Router::new().route("/api/health", get(health_check)).route(
        "/api/health/protected",
        get(protected_health_check)
            .route_layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state),
    )
}
