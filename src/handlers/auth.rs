/// Authentication handlers
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AuthError,
    http::{clear_auth_cookies, set_auth_cookies, AmbientToken, CurrentUser},
    models::{
        LoginRequest, RegisterRequest, ResetPasswordRequest, TelegramLoginRequest, TokenPair,
        UserResponse,
    },
    services::{
        notification, select_live_token, Credentials, DefaultAuthStrategy, TelegramAuthStrategy,
    },
    AppState,
};

/// Generic error body (mirrors `AuthError`'s response mapping)
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn device_info_from_headers(headers: &HeaderMap) -> Option<String> {
    let user_agent = headers.get("user-agent").and_then(|h| h.to_str().ok());
    let ip = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok());
    notification::device_info_text(user_agent, ip)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Neither password nor telegram_id supplied", body = ErrorResponse),
        (status = 409, description = "Username or telegram_id taken", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let user = state.auth.signup(&payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 401, description = "Incorrect password", body = ErrorResponse),
        (status = 404, description = "No matching account", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let credentials = Credentials::Password {
        username: payload.username,
        password: payload.password,
        telegram_id: payload.telegram_id,
    };
    let strategy = DefaultAuthStrategy::new(state.codec.clone());
    let outcome = state
        .auth
        .signin(&credentials, &strategy, device_info_from_headers(&headers))
        .await?;

    let pair = TokenPair {
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
    };
    let mut response = Json(&pair).into_response();
    set_auth_cookies(
        &mut response,
        &state.config,
        &pair.access_token,
        &pair.refresh_token,
    );
    Ok(response)
}

/// Login with a Telegram HMAC signature
#[utoipa::path(
    post,
    path = "/api/v1/auth/login/telegram",
    tag = "Auth",
    request_body = TelegramLoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 401, description = "Bad or stale signature", body = ErrorResponse),
        (status = 404, description = "No matching account", body = ErrorResponse)
    )
)]
pub async fn login_telegram(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TelegramLoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let credentials = Credentials::Telegram {
        telegram_id: payload.telegram_id,
        signature: payload.signature,
        nonce: payload.nonce,
        timestamp: payload.timestamp,
    };
    let strategy = TelegramAuthStrategy::new(
        state.codec.clone(),
        state.config.signature_secret_key.clone(),
    );
    let outcome = state
        .auth
        .signin(&credentials, &strategy, device_info_from_headers(&headers))
        .await?;

    Ok(Json(TokenPair {
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
    }))
}

/// Rotate the ambient token into a new pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "New token pair issued", body = TokenPair),
        (status = 401, description = "Missing, expired, or revoked token", body = ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    AmbientToken(candidates): AmbientToken,
) -> Result<Response, AuthError> {
    let token = select_live_token(&state.codec, &candidates)?;
    let (_user, minted) = state.auth.refresh(token).await?;

    let pair = TokenPair {
        access_token: minted.access_token,
        refresh_token: minted.refresh_token,
    };
    let mut response = Json(&pair).into_response();
    set_auth_cookies(
        &mut response,
        &state.config,
        &pair.access_token,
        &pair.refresh_token,
    );
    Ok(response)
}

/// Check the ambient access token; never rotates
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Whether the token is valid", body = bool)
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    token: Option<AmbientToken>,
) -> Json<bool> {
    let Some(AmbientToken(candidates)) = token else {
        return Json(false);
    };
    for token in &candidates {
        if state.auth.verify(token).await {
            return Json(true);
        }
    }
    Json(false)
}

/// Change the caller's password; revokes every session they hold
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed, new pair issued", body = TokenPair),
        (status = 401, description = "Old password incorrect", body = ErrorResponse),
        (status = 422, description = "New password rejected", body = ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Response, AuthError> {
    let (_user, minted) = state
        .auth
        .reset_password(current.user.id, &payload)
        .await?;

    let pair = TokenPair {
        access_token: minted.access_token,
        refresh_token: minted.refresh_token,
    };
    let mut response = Json(&pair).into_response();
    set_auth_cookies(
        &mut response,
        &state.config,
        &pair.access_token,
        &pair.refresh_token,
    );
    Ok(response)
}

/// Logout from the current session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Response, AuthError> {
    state.auth.logout(&current.claims).await?;

    let mut response = Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
    .into_response();
    clear_auth_cookies(&mut response, &state.config);
    Ok(response)
}

/// Logout from every session
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout-all",
    tag = "Auth",
    responses(
        (status = 200, description = "All sessions revoked", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn logout_all(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Response, AuthError> {
    let revoked = state.auth.logout_all(current.user.id).await?;

    let mut response = Json(MessageResponse {
        message: format!("Revoked {} tokens", revoked),
    })
    .into_response();
    clear_auth_cookies(&mut response, &state.config);
    Ok(response)
}
