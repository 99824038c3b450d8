use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MessageResponse, PublicUser},
        errors::AuthError,
        extractors::AuthUser,
        services::AuthService,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let LoginRequest { email, password } = payload;

    // argon2 is deliberately slow; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || auth.login(&email, &password))
        .await
        .map_err(|e| {
            error!(error = %e, "login task failed");
            AuthError::Internal(e.into())
        })??;

    Ok(Json(AuthResponse::bearer(outcome.token, outcome.user)))
}

/// Advisory only: the client discards its token, nothing is revoked.
#[instrument(skip_all)]
pub async fn logout(
    State(auth): State<AuthService>,
    user: Option<AuthUser>,
) -> Json<MessageResponse> {
    auth.logout(user.as_ref().map(|AuthUser(identity)| identity));
    Json(MessageResponse {
        message: "Logged out successfully",
    })
}

#[instrument(skip_all)]
pub async fn refresh(
    State(auth): State<AuthService>,
    AuthUser(identity): AuthUser,
) -> Result<Json<AuthResponse>, AuthError> {
    let token = auth.refresh(&identity)?;
    Ok(Json(AuthResponse::bearer(token, PublicUser::from(&identity))))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(identity): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&identity))
}
