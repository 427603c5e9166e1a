use anyhow::Context;
use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(field: Option<String>, name: &str) -> ApiResult<String> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{name} is required")))
}

/// Session cookie carrying the signed token. HTTP-only so the browser
/// client never reads it directly.
fn session_cookie(token: &str) -> String {
    format!("token={token}; HttpOnly; Path=/; SameSite=Lax")
}

fn clear_session_cookie() -> String {
    "token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0".to_string()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let first_name = required(payload.first_name, "First name")?;
    let last_name = required(payload.last_name, "Last name")?;
    let email = required(payload.email, "Email")?;
    let password = required(payload.password, "Password")?;

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    // Email is the identity key, compared case-sensitively.
    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Validation("Email already registered".into()));
    }

    let hash = hash_password(&password)?;
    let user = User::insert(
        &state.db,
        User::new(first_name, last_name, email, hash, payload.avatar),
    )
    .await?;

    info!(user_id = %user.id.map(|id| id.to_hex()).unwrap_or_default(), "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<PublicUser>)> {
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::NotFound("User not found".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, "login invalid password");
        return Err(ApiError::Validation("Password not correct".into()));
    }

    let user_id = user
        .id
        .ok_or_else(|| anyhow::anyhow!("stored user without id"))?;
    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user_id, &user.email)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&session_cookie(&token)).context("build session cookie")?,
    );

    info!(user_id = %user_id.to_hex(), "user logged in");
    Ok((headers, Json(PublicUser::from(user))))
}

#[instrument]
pub async fn logout() -> ApiResult<(HeaderMap, Json<bool>)> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&clear_session_cookie()).context("build session cookie")?,
    );
    Ok((headers, Json(true)))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, &identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(PublicUser::from(user)))
}
