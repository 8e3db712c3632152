use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::Utc;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    AppState,
    auth::verify_token,
    classify::{filter_future, group_by_time},
    error::ApiError,
    friday::{find_user_evening_appointment, friday_evenings, plan_signup},
    invites::{active_invites, to_active},
    local_day::group_by_local_date,
    models::{ActiveInvite, Appointment, FridayEvening, LocalDayGroup, TimeGroups},
    validation::{validate_count, validate_date, validate_user_id},
};

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

#[derive(Debug, Deserialize)]
pub struct AppointmentsQuery {
    pub user_id: Option<String>,
    pub tz: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FridaysQuery {
    pub user_id: Option<String>,
    pub count: Option<usize>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InvitesQuery {
    pub tz: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub user_id: String,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub user_id: String,
}

fn authorize(
    state: &AppState,
    auth: BearerHeader,
    query_token: Option<&str>,
) -> Result<(), ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query_token)
}

/// A timezone named by the request must be valid; otherwise the configured one applies.
fn resolve_timezone(state: &AppState, requested: Option<&str>) -> Result<Tz, ApiError> {
    match requested {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| ApiError::BadRequest(format!("unknown timezone '{name}'"))),
        None => Ok(state.settings.timezone()),
    }
}

async fn fetch_appointments(
    state: &AppState,
    user_id: Option<&str>,
) -> Result<Vec<Appointment>, ApiError> {
    let mut appointments = state.client.list_appointments().await?;
    if let Some(user_id) = user_id {
        appointments.retain(|appointment| appointment.user_id == user_id);
    }
    Ok(appointments)
}

#[utoipa::path(get, path = "/", tag = "schedule")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Club Schedule API",
        "endpoints": {
            "/appointments/upcoming": "Appointments split into past and future",
            "/appointments/by-day": "Upcoming appointments grouped by local day",
            "/fridays": "Friday evening signups",
            "/invites/active": "Invites that have not expired"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "schedule")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "schedule")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/appointments/upcoming",
    params(
        ("user_id" = Option<String>, Query, description = "Only this member's appointments"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Past and future appointments", body = TimeGroups),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "schedule"
)]
pub async fn get_upcoming(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<TimeGroups>, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let appointments = fetch_appointments(&state, query.user_id.as_deref()).await?;
    Ok(Json(group_by_time(&appointments, Utc::now())))
}

#[utoipa::path(
    get,
    path = "/appointments/by-day",
    params(
        ("user_id" = Option<String>, Query, description = "Only this member's appointments"),
        ("tz" = Option<String>, Query, description = "IANA timezone of the viewer"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Upcoming appointments by local day", body = [LocalDayGroup]),
        (status = 400, description = "Unknown timezone"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "schedule"
)]
pub async fn get_by_day(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<LocalDayGroup>>, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let tz = resolve_timezone(&state, query.tz.as_deref())?;
    let appointments = fetch_appointments(&state, query.user_id.as_deref()).await?;
    let upcoming = filter_future(&appointments, Utc::now());
    Ok(Json(group_by_local_date(&upcoming, tz)))
}

#[utoipa::path(
    get,
    path = "/fridays",
    params(
        ("user_id" = Option<String>, Query, description = "Member viewing the list"),
        ("count" = Option<usize>, Query, description = "Number of Fridays (1-12)"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Upcoming Friday evenings", body = [FridayEvening]),
        (status = 400, description = "Invalid count"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "fridays"
)]
pub async fn get_fridays(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<FridaysQuery>,
) -> Result<Json<Vec<FridayEvening>>, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;

    let mut rules = (*state.rules).clone();
    if let Some(count) = query.count {
        rules.fridays_to_show = validate_count(count)?;
    }

    let appointments = fetch_appointments(&state, None).await?;
    let today = Utc::now().date_naive();
    Ok(Json(friday_evenings(
        &appointments,
        today,
        query.user_id.as_deref(),
        &rules,
    )))
}

#[utoipa::path(
    post,
    path = "/fridays/{date}/signup",
    params(
        ("date" = String, Path, description = "Friday as YYYY-MM-DD"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Signed up", body = Appointment),
        (status = 400, description = "Not an open upcoming Friday"),
        (status = 401, description = "Invalid authentication token"),
        (status = 409, description = "Already signed up")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "fridays"
)]
pub async fn post_signup(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(date): Path<String>,
    Query(query): Query<TokenQuery>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let friday = validate_date(&date)?;
    let user_id = validate_user_id(&request.user_id)?;

    let appointments = fetch_appointments(&state, Some(user_id)).await?;
    let today = Utc::now().date_naive();
    let planned = plan_signup(&appointments, friday, user_id, today, &state.rules)?;

    let created = state.client.create_appointment(&planned).await?;
    info!(id = %created.id, %user_id, %friday, "friday evening signup created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/fridays/{date}/signup",
    params(
        ("date" = String, Path, description = "Friday as YYYY-MM-DD"),
        ("user_id" = String, Query, description = "Member withdrawing"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 204, description = "Signup withdrawn"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No signup for that Friday")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "fridays"
)]
pub async fn delete_signup(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(date): Path<String>,
    Query(query): Query<CancelQuery>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let friday = validate_date(&date)?;
    let user_id = validate_user_id(&query.user_id)?;

    let appointments = fetch_appointments(&state, Some(user_id)).await?;
    let existing = find_user_evening_appointment(
        &appointments,
        friday,
        user_id,
        state.rules.evening_start_hour,
    )
    .ok_or_else(|| ApiError::NotFound(format!("No signup for {friday}")))?;

    state.client.delete_appointment(&existing.id).await?;
    info!(id = %existing.id, %user_id, %friday, "friday evening signup withdrawn");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/invites/active",
    params(
        ("tz" = Option<String>, Query, description = "IANA timezone for the expiry display"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Invites that have not expired", body = [ActiveInvite]),
        (status = 400, description = "Unknown timezone"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "invites"
)]
pub async fn get_active_invites(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<InvitesQuery>,
) -> Result<Json<Vec<ActiveInvite>>, ApiError> {
    authorize(&state, auth, query.token.as_deref())?;
    let tz = resolve_timezone(&state, query.tz.as_deref())?;

    let invites = state.client.list_invites().await?;
    let active: Vec<ActiveInvite> = active_invites(&invites, Utc::now())
        .iter()
        .map(|invite| to_active(invite, tz))
        .collect();
    Ok(Json(active))
}
