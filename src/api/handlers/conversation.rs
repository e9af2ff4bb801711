//! Conversation handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use super::required;
use crate::api::dto::{ConversationListParams, CreateConversationRequest};
use crate::app_state::AppState;
use crate::domain::{Conversation, UserId};
use crate::error::{ChatError, ErrorResponse};

/// `POST /conversations` — Create a conversation with an initial member
/// list. Membership rows are created for each supplied user id.
///
/// # Errors
///
/// Returns [`ChatError::InvalidRequest`] when `title` is missing and
/// [`ChatError::Persistence`] when a member id references no user.
#[utoipa::path(
    post,
    path = "/conversations",
    tag = "Conversations",
    summary = "Create a conversation",
    request_body = CreateConversationRequest,
    responses(
        (status = 201, description = "Conversation created", body = Conversation),
        (status = 400, description = "Missing title or invalid member", body = ErrorResponse),
    )
)]
pub async fn create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let title = required(&req.title, "title")?;
    let member_ids: Vec<UserId> = req
        .member_user_ids
        .unwrap_or_default()
        .into_iter()
        .map(UserId::from)
        .collect();

    let conversation = state
        .chat_service
        .create_conversation(title, &member_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// `GET /conversations?userId=` — List the user's conversations, newest
/// first.
///
/// # Errors
///
/// Returns [`ChatError::InvalidRequest`] when `userId` is missing.
#[utoipa::path(
    get,
    path = "/conversations",
    tag = "Conversations",
    summary = "List a user's conversations",
    params(
        ("userId" = String, Query, description = "Member user id"),
    ),
    responses(
        (status = 200, description = "Conversations, newest first", body = Vec<Conversation>),
        (status = 400, description = "Missing userId", body = ErrorResponse),
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(params): Query<ConversationListParams>,
) -> Result<impl IntoResponse, ChatError> {
    let user_id = UserId::from(required(&params.user_id, "userId")?);
    let conversations = state.chat_service.conversations_for(&user_id).await?;
    Ok(Json(conversations))
}

/// Conversation routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/conversations",
        post(create_conversation).get(list_conversations),
    )
}
