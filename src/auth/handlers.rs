use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
        validate,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(username), Some(email), Some(password)) =
        (payload.username, payload.email, payload.password)
    else {
        return Err(ApiError::Validation(
            "Username, email, and password are required".into(),
        ));
    };
    let username = username.trim().to_string();
    let email = email.trim().to_lowercase();

    if !validate::is_valid_username(&username) {
        warn!(username = %username, "invalid username length");
        return Err(ApiError::Validation(
            "Username must be between 3 and 30 characters".into(),
        ));
    }
    if !validate::is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation(
            "Please enter a valid email address".into(),
        ));
    }
    if !validate::is_valid_password(&password) {
        warn!("password too short");
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }

    // Advisory pre-check; the unique constraints settle concurrent duplicates.
    if User::find_by_email_or_username(&state.db, &email, &username)
        .await?
        .is_some()
    {
        warn!(email = %email, username = %username, "duplicate registration");
        return Err(ApiError::Conflict(
            "User with this email or username already exists".into(),
        ));
    }

    let hash = hash_password(&password)?;
    let user = User::create(&state.db, &username, &email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".into(),
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::Validation(
            "Email and password are required".into(),
        ));
    };
    let email = email.trim().to_lowercase();

    // Uniform message whether the email is unknown or the password mismatches.
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::Auth("Invalid email or password".into()));
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth("Invalid email or password".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}
