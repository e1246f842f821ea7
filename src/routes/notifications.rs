use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::middleware::auth_middleware;
use crate::notification::controller;
use crate::state::AppState;
use crate::websocket::notifications::ws_handler;

/// Create a router for notification center routes
pub fn routes(state: AppState) -> Router {
    let private_routes = Router::new()
        .route(
            "/api/notifications",
            get(controller::list_notifications).post(controller::create_notification),
        )
        .route("/api/notifications/read-all", post(controller::mark_all_as_read))
        .route("/api/notifications/clear", post(controller::clear_old_notifications))
        .route(
            "/api/notifications/items/:id",
            delete(controller::remove_notification),
        )
        .route(
            "/api/notifications/items/:id/read",
            post(controller::mark_as_read),
        )
        .route(
            "/api/notifications/items/:id/select",
            post(controller::select_notification),
        )
        .route("/api/notifications/panel", get(controller::get_panel))
        .route("/api/notifications/dropdown", put(controller::set_dropdown))
        .route(
            "/api/notifications/dropdown/toggle",
            post(controller::toggle_dropdown),
        )
        .route(
            "/api/notifications/dropdown/pointer",
            post(controller::pointer_down),
        )
        .route(
            "/api/notifications/open-settings",
            post(controller::open_settings),
        )
        .route(
            "/api/notifications/preferences",
            get(controller::get_preferences).patch(controller::update_preferences),
        )
        .route("/api/session/end", post(controller::end_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // The WebSocket authenticates through its query string
    let push_routes = Router::new()
        .route("/api/notifications/ws", get(ws_handler))
        .with_state(state);

    private_routes.merge(push_routes)
}
