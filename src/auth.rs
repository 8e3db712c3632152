use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::error::ApiError;
use crate::settings::Settings;

/// Accepts the service token from the `Authorization` header or, for calendar
/// style links, from the `token` query parameter. The header wins when both are set.
pub fn verify_token(
    settings: &Settings,
    auth: Option<Authorization<Bearer>>,
    query_token: Option<&str>,
) -> Result<(), ApiError> {
    let header_token = auth.as_ref().map(|a| a.token());
    match header_token.or(query_token) {
        Some(token) if token == settings.auth_token => Ok(()),
        _ => Err(ApiError::Unauthorized("Invalid authentication token".into())),
    }
}
