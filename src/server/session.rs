use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};

use crate::auth::RequireUser;
use crate::identity;
use crate::server::AppState;
use crate::server::dto::{GoogleLoginRequest, LoginRequest, RegisterRequest, SessionResponse};
use crate::server::extract::ApiJson;
use crate::server::response::{ApiError, ApiResponse};
use crate::types::User;

/// Issues a session for the user and sets it as a cookie.
fn start_session(state: &AppState, user: User, status: StatusCode) -> Result<Response, ApiError> {
    let token = state.sessions.issue(&user.id)?;
    let cookie = state.sessions.session_cookie(&token);

    Ok((
        status,
        [(SET_COOKIE, cookie.to_string())],
        Json(ApiResponse::success(SessionResponse { user, token })),
    )
        .into_response())
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    tracing::error!("Credential task failed: {e}");
    ApiError::internal("Internal server error")
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> impl IntoResponse {
    // Password hashing is CPU-bound; keep it off the async workers.
    let worker = Arc::clone(&state);
    let user = tokio::task::spawn_blocking(move || {
        identity::register(
            worker.store.as_ref(),
            &worker.passwords,
            &req.email,
            &req.password,
            req.name.as_deref(),
        )
    })
    .await
    .map_err(join_error)??;

    start_session(&state, user, StatusCode::CREATED)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> impl IntoResponse {
    let worker = Arc::clone(&state);
    let user = tokio::task::spawn_blocking(move || {
        identity::login(
            worker.store.as_ref(),
            &worker.passwords,
            &req.email,
            &req.password,
        )
    })
    .await
    .map_err(join_error)??;

    start_session(&state, user, StatusCode::OK)
}

pub async fn google_login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<GoogleLoginRequest>,
) -> impl IntoResponse {
    let verifier = state
        .oauth
        .as_ref()
        .ok_or_else(|| ApiError::internal("Google sign-in is not configured"))?;

    let profile = verifier.verify(&req.id_token).await.map_err(|e| {
        if e.is_rejection() {
            tracing::debug!("Rejected Google token: {e}");
            ApiError::unauthorized("Invalid Google token")
        } else {
            tracing::error!("Google token verification failed: {e}");
            ApiError::internal("Could not verify Google token")
        }
    })?;

    let user = identity::login_oauth(state.store.as_ref(), &profile)?;

    start_session(&state, user, StatusCode::OK)
}

pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = state.sessions.removal_cookie();
    (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie.to_string())])
}

pub async fn me(auth: RequireUser) -> impl IntoResponse {
    Json(ApiResponse::success(auth.user))
}
