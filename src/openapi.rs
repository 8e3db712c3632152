use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::SignupRequest;
use crate::models::{
    ActiveInvite, Appointment, AttendanceLevel, FridayEvening, LocalDayGroup, TimeGroups,
};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_upcoming,
        crate::handlers::get_by_day,
        crate::handlers::get_fridays,
        crate::handlers::post_signup,
        crate::handlers::delete_signup,
        crate::handlers::get_active_invites
    ),
    components(schemas(
        Appointment,
        TimeGroups,
        LocalDayGroup,
        FridayEvening,
        AttendanceLevel,
        ActiveInvite,
        SignupRequest
    )),
    tags(
        (name = "schedule", description = "Appointment lists"),
        (name = "fridays", description = "Friday evening signups"),
        (name = "invites", description = "Member invites")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/fridays/{date}/signup"));
        assert!(doc.paths.paths.contains_key("/appointments/by-day"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
