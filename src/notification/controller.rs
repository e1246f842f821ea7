use std::num::NonZeroU32;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::middleware::AuthOperator;
use crate::notification::display::NotificationView;
use crate::notification::model::{NewNotification, NotificationError, PointerTarget, PreferencesUpdate};
use crate::notification::session::SessionHandle;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationIdPathParam {
    id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationView>,
    pub unread_count: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClearRequest {
    /// Entries older than this many days are removed
    #[schema(example = 7, minimum = 1)]
    pub days: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearResponse {
    pub removed: usize,
    pub remaining: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DropdownRequest {
    pub visible: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PointerRequest {
    pub target: PointerTarget,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DropdownResponse {
    pub visible: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NavigationResponse {
    pub navigate_to: String,
}

impl IntoResponse for NotificationError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            NotificationError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            NotificationError::SessionNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        };
        info!("Notification request rejected: {}", self);

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

async fn session(state: &AppState, operator: &AuthOperator) -> SessionHandle {
    state.sessions.open(operator.operator_id).await
}

/// List notifications
///
/// Returns the operator's notifications, newest first, with the unread count.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notifications retrieved", body = NotificationListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    operator: AuthOperator,
    State(state): State<AppState>,
) -> Response {
    let handle = session(&state, &operator).await;
    let center = handle.lock().await;

    Json(NotificationListResponse {
        notifications: center.views(),
        unread_count: center.unread_count(),
    })
    .into_response()
}

/// Add a notification
///
/// Prepends a new unread notification and triggers the sound and platform
/// notification side effects allowed by the operator's preferences.
#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = NewNotification,
    responses(
        (status = 201, description = "Notification added", body = crate::notification::model::Notification),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn create_notification(
    operator: AuthOperator,
    State(state): State<AppState>,
    Json(input): Json<NewNotification>,
) -> Response {
    if input.title.trim().is_empty() {
        return NotificationError::InvalidInput("title must not be empty".to_string())
            .into_response();
    }

    let handle = session(&state, &operator).await;
    let notification = handle.lock().await.add_notification(input);

    (StatusCode::CREATED, Json(notification)).into_response()
}

/// Mark a notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/items/{id}/read",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification is read (unknown IDs are ignored)"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_as_read(
    operator: AuthOperator,
    Path(params): Path<NotificationIdPathParam>,
    State(state): State<AppState>,
) -> Response {
    let handle = session(&state, &operator).await;
    handle.lock().await.mark_as_read(params.id);
    StatusCode::NO_CONTENT.into_response()
}

/// Mark every notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 204, description = "All notifications are read"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_all_as_read(operator: AuthOperator, State(state): State<AppState>) -> Response {
    let handle = session(&state, &operator).await;
    handle.lock().await.mark_all_as_read();
    StatusCode::NO_CONTENT.into_response()
}

/// Remove a notification
#[utoipa::path(
    delete,
    path = "/api/notifications/items/{id}",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification removed (unknown IDs are ignored)"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn remove_notification(
    operator: AuthOperator,
    Path(params): Path<NotificationIdPathParam>,
    State(state): State<AppState>,
) -> Response {
    let handle = session(&state, &operator).await;
    handle.lock().await.remove_notification(params.id);
    StatusCode::NO_CONTENT.into_response()
}

/// Clear old notifications
///
/// Removes every notification whose timestamp is at or before now minus `days`.
#[utoipa::path(
    post,
    path = "/api/notifications/clear",
    request_body = ClearRequest,
    responses(
        (status = 200, description = "Old notifications removed", body = ClearResponse),
        (status = 400, description = "days must be a positive integer", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn clear_old_notifications(
    operator: AuthOperator,
    State(state): State<AppState>,
    Json(request): Json<ClearRequest>,
) -> Response {
    let Some(days) = NonZeroU32::new(request.days) else {
        return NotificationError::InvalidInput("days must be a positive integer".to_string())
            .into_response();
    };

    let handle = session(&state, &operator).await;
    let mut center = handle.lock().await;
    let removed = center.clear_old_notifications(days);

    Json(ClearResponse {
        removed,
        remaining: center.len(),
    })
    .into_response()
}

/// Select a notification
///
/// Marks it read, requests navigation to its action URL and closes the
/// dropdown when there is somewhere to go.
#[utoipa::path(
    post,
    path = "/api/notifications/items/{id}/select",
    params(("id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Selection handled", body = crate::notification::model::Selection),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn select_notification(
    operator: AuthOperator,
    Path(params): Path<NotificationIdPathParam>,
    State(state): State<AppState>,
) -> Response {
    let handle = session(&state, &operator).await;
    let selection = handle.lock().await.select_notification(params.id);
    Json(selection).into_response()
}

/// Bell and dropdown panel view
#[utoipa::path(
    get,
    path = "/api/notifications/panel",
    responses(
        (status = 200, description = "Panel view", body = crate::notification::display::PanelView),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn get_panel(operator: AuthOperator, State(state): State<AppState>) -> Response {
    let handle = session(&state, &operator).await;
    let panel = handle.lock().await.panel();
    Json(panel).into_response()
}

/// Show or hide the dropdown
#[utoipa::path(
    put,
    path = "/api/notifications/dropdown",
    request_body = DropdownRequest,
    responses(
        (status = 200, description = "Dropdown visibility", body = DropdownResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn set_dropdown(
    operator: AuthOperator,
    State(state): State<AppState>,
    Json(request): Json<DropdownRequest>,
) -> Response {
    let handle = session(&state, &operator).await;
    let mut center = handle.lock().await;
    center.set_dropdown_visible(request.visible);
    Json(DropdownResponse {
        visible: center.dropdown_visible(),
    })
    .into_response()
}

/// Toggle the dropdown from the bell trigger
#[utoipa::path(
    post,
    path = "/api/notifications/dropdown/toggle",
    responses(
        (status = 200, description = "Dropdown visibility", body = DropdownResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn toggle_dropdown(operator: AuthOperator, State(state): State<AppState>) -> Response {
    let handle = session(&state, &operator).await;
    let visible = handle.lock().await.toggle_dropdown();
    Json(DropdownResponse { visible }).into_response()
}

/// Report a pointer-down so clicks outside the bell close the dropdown
#[utoipa::path(
    post,
    path = "/api/notifications/dropdown/pointer",
    request_body = PointerRequest,
    responses(
        (status = 200, description = "Dropdown visibility", body = DropdownResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn pointer_down(
    operator: AuthOperator,
    State(state): State<AppState>,
    Json(request): Json<PointerRequest>,
) -> Response {
    let handle = session(&state, &operator).await;
    let visible = handle.lock().await.pointer_down(request.target);
    Json(DropdownResponse { visible }).into_response()
}

/// Open notification settings
#[utoipa::path(
    post,
    path = "/api/notifications/open-settings",
    responses(
        (status = 200, description = "Navigation requested", body = NavigationResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn open_settings(operator: AuthOperator, State(state): State<AppState>) -> Response {
    let handle = session(&state, &operator).await;
    let path = handle.lock().await.open_settings();
    Json(NavigationResponse {
        navigate_to: path.to_string(),
    })
    .into_response()
}

/// Get notification preferences
#[utoipa::path(
    get,
    path = "/api/notifications/preferences",
    responses(
        (status = 200, description = "Current preferences", body = crate::notification::model::NotificationPreferences),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn get_preferences(operator: AuthOperator, State(state): State<AppState>) -> Response {
    let handle = session(&state, &operator).await;
    let preferences = handle.lock().await.preferences().clone();
    Json(preferences).into_response()
}

/// Update notification preferences
///
/// Only the supplied fields change.
#[utoipa::path(
    patch,
    path = "/api/notifications/preferences",
    request_body = PreferencesUpdate,
    responses(
        (status = 200, description = "Updated preferences", body = crate::notification::model::NotificationPreferences),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn update_preferences(
    operator: AuthOperator,
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> Response {
    let handle = session(&state, &operator).await;
    let preferences = handle.lock().await.update_preferences(update).clone();
    info!(
        "Operator {} updated notification preferences",
        operator.operator_id
    );
    Json(preferences).into_response()
}

/// End the operator's session
///
/// Drops the operator's notifications and preferences.
#[utoipa::path(
    post,
    path = "/api/session/end",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No active session", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "session"
)]
pub async fn end_session(operator: AuthOperator, State(state): State<AppState>) -> Response {
    if state.sessions.end(&operator.operator_id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        warn!(
            "End of session requested for operator {} without an active session",
            operator.operator_id
        );
        NotificationError::SessionNotFound.into_response()
    }
}
