//! Login/logout routes and the authenticated-pilot extractor.

use std::str::FromStr;

use axum::extract::{FromRequestParts, State};
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use racelink_api_types::FieldError;
use racelink_core::domain::PilotId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::verify_password;
use crate::auth::token::{generate_session_token, validate_session_token};

use super::error::{ApiError, LOGIN_PATH};
use super::state::AppState;

pub const SESSION_COOKIE: &str = "racelink_session";

/// The authenticated caller, resolved from the session cookie or an
/// `Authorization: Bearer` header. Handlers that take this parameter are
/// login-required; missing or invalid credentials redirect to the login
/// route.
#[derive(Debug, Clone)]
pub struct CurrentPilot {
    pub id: PilotId,
    pub username: String,
}

impl FromRequestParts<AppState> for CurrentPilot {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_token(&parts.headers))
            .ok_or(ApiError::Unauthorized)?;

        let claims =
            validate_session_token(&token, &state.auth).map_err(|_| ApiError::Unauthorized)?;
        let id = PilotId::from_str(&claims.sub).map_err(|_| ApiError::Unauthorized)?;

        Ok(CurrentPilot {
            id,
            username: claims.username,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/accounts/login/", get(login_form).post(login))
        .route("/accounts/logout/", post(logout))
}

#[derive(Debug, Serialize)]
struct LoginPrompt {
    detail: &'static str,
}

async fn login_form() -> Json<LoginPrompt> {
    Json(LoginPrompt {
        detail: "authentication required: POST username and password to this URL",
    })
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let username = form.username.trim();
    let Some(pilot) = state.pilots.find_by_username(username).await? else {
        return Err(invalid_credentials());
    };

    let verified = verify_password(&form.password, &pilot.password_hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password verification failed: {e}")))?;
    if !verified {
        return Err(invalid_credentials());
    }

    let token = generate_session_token(&pilot.id.to_string(), &pilot.username, &state.auth)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("token generation failed: {e}")))?;

    info!(username = %pilot.username, "pilot logged in");

    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/")))
}

async fn logout() -> impl IntoResponse {
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(LOGIN_PATH))
}

fn invalid_credentials() -> ApiError {
    // One message regardless of which part was wrong.
    ApiError::Validation(vec![FieldError::new(
        "username",
        "invalid username or password",
    )])
}
