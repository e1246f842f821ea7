use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Security scheme configuration for OpenAPI
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Daily Burst Coach Notification API",
        version = "0.1.0",
        description = "Notification center backing the Daily Burst Coach operator dashboard"
    ),
    paths(
        // Health
        crate::routes::health::health_check,
        crate::routes::health::protected_health_check,
        // Notification list
        crate::notification::controller::list_notifications,
        crate::notification::controller::create_notification,
        crate::notification::controller::mark_as_read,
        crate::notification::controller::mark_all_as_read,
        crate::notification::controller::remove_notification,
        crate::notification::controller::clear_old_notifications,
        crate::notification::controller::select_notification,
        // Bell and dropdown
        crate::notification::controller::get_panel,
        crate::notification::controller::set_dropdown,
        crate::notification::controller::toggle_dropdown,
        crate::notification::controller::pointer_down,
        crate::notification::controller::open_settings,
        // Preferences
        crate::notification::controller::get_preferences,
        crate::notification::controller::update_preferences,
        // Session
        crate::notification::controller::end_session
    ),
    components(
        schemas(
            crate::routes::health::HealthResponse,
            crate::notification::model::Notification,
            crate::notification::model::NewNotification,
            crate::notification::model::NotificationType,
            crate::notification::model::Priority,
            crate::notification::model::NotificationPreferences,
            crate::notification::model::PreferencesUpdate,
            crate::notification::model::Frequency,
            crate::notification::model::PointerTarget,
            crate::notification::model::Selection,
            crate::notification::display::NotificationView,
            crate::notification::display::GroupView,
            crate::notification::display::PanelView,
            crate::notification::display::Emphasis,
            crate::notification::grouping::DateGroup,
            crate::notification::effects::Permission,
            crate::notification::controller::ErrorResponse,
            crate::notification::controller::NotificationListResponse,
            crate::notification::controller::ClearRequest,
            crate::notification::controller::ClearResponse,
            crate::notification::controller::DropdownRequest,
            crate::notification::controller::PointerRequest,
            crate::notification::controller::DropdownResponse,
            crate::notification::controller::NavigationResponse
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "notifications", description = "Notification center endpoints"),
        (name = "session", description = "Operator session lifecycle")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_notification_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/notifications",
            "/api/notifications/items/{id}/select",
            "/api/notifications/panel",
            "/api/notifications/preferences",
            "/api/session/end",
            "/api/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("PanelView"));
    }
}
