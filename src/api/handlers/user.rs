//! User handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use super::required;
use crate::api::dto::CreateUserRequest;
use crate::app_state::AppState;
use crate::domain::User;
use crate::error::{ChatError, ErrorResponse};

/// `POST /users` — Create a user, idempotently by username.
///
/// Posting an existing username returns the existing user unchanged, so
/// clients can "log in" by re-posting their name.
///
/// # Errors
///
/// Returns [`ChatError::InvalidRequest`] when `username` is missing.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    summary = "Create or fetch a user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created or already present", body = User),
        (status = 400, description = "Missing username", body = ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let username = required(&req.username, "username")?;
    let user = state.chat_service.create_user(username).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user))
}
