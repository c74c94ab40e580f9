/// User API routes
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use cadence_core::{CreateUser, User};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// POST /api/users
/// Register a user; the returned ID goes in `X-User-Id` on later requests
pub async fn create_user(
    State(app_state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ServerError::BadRequest("Username is required".to_string()));
    }

    let user = cadence_storage::users::create(
        &app_state.pool,
        CreateUser {
            username: username.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Created user");

    Ok((StatusCode::CREATED, Json(user)))
}
