use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::{
        errors::AuthError, extractors::AuthUser, repo_types::Role, services::AuthService,
    },
    state::AppState,
};

/// Roles allowed to list the directory.
const DIRECTORY_ROLES: &[Role] = &[Role::Admin, Role::Manager];

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserSummary>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}

#[instrument(skip_all)]
pub async fn list_users(
    State(auth): State<AuthService>,
    AuthUser(identity): AuthUser,
) -> Result<Json<UserList>, AuthError> {
    identity.require_role(DIRECTORY_ROLES)?;

    let users = auth
        .store()
        .records()
        .map(|u| UserSummary {
            id: u.id.clone(),
            email: u.email.clone(),
            name: u.name.clone(),
            role: u.role,
        })
        .collect();
    Ok(Json(UserList { users }))
}
