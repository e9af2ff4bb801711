//! Message and reaction handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use super::required;
use crate::api::dto::{
    CreateMessageRequest, DeleteMessageRequest, DeleteMessageResponse, MessageListParams,
    ToggleReactionRequest, UpdateMessageRequest,
};
use crate::app_state::AppState;
use crate::domain::{ConversationId, Message, MessageId, UserId};
use crate::error::{ChatError, ErrorResponse};

/// `POST /messages` — Post a message; `message:new` is broadcast to the
/// room on success.
///
/// # Errors
///
/// Returns [`ChatError::InvalidRequest`] when a required field is missing
/// and [`ChatError::Persistence`] when the author or conversation id
/// references nothing.
#[utoipa::path(
    post,
    path = "/messages",
    tag = "Messages",
    summary = "Post a message",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = Message),
        (status = 400, description = "Missing field or bad reference", body = ErrorResponse),
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let conversation_id = ConversationId::from(required(&req.conversation_id, "conversationId")?);
    let author_id = UserId::from(required(&req.author_id, "authorId")?);
    let text = required(&req.text, "text")?;

    let message = state
        .chat_service
        .post_message(&conversation_id, &author_id, text)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /messages?conversationId=` — List a conversation's messages,
/// oldest first, hydrated with author and reactions.
///
/// # Errors
///
/// Returns [`ChatError::InvalidRequest`] when `conversationId` is
/// missing.
#[utoipa::path(
    get,
    path = "/messages",
    tag = "Messages",
    summary = "List a conversation's messages",
    params(
        ("conversationId" = String, Query, description = "Conversation id"),
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = Vec<Message>),
        (status = 400, description = "Missing conversationId", body = ErrorResponse),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageListParams>,
) -> Result<impl IntoResponse, ChatError> {
    let conversation_id = ConversationId::from(required(&params.conversation_id, "conversationId")?);
    let messages = state.chat_service.list_messages(&conversation_id).await?;
    Ok(Json(messages))
}

/// `PATCH /messages/{id}` — Edit a message's text; author-only.
/// `message:updated` is broadcast on success.
///
/// # Errors
///
/// Returns [`ChatError::MessageNotFound`] for an unknown id,
/// [`ChatError::Forbidden`] for a non-author caller, and
/// [`ChatError::InvalidRequest`] for missing fields.
#[utoipa::path(
    patch,
    path = "/messages/{id}",
    tag = "Messages",
    summary = "Edit a message",
    params(
        ("id" = String, Path, description = "Message id"),
    ),
    request_body = UpdateMessageRequest,
    responses(
        (status = 200, description = "Message updated", body = Message),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let id = MessageId::from(id);
    let author_id = UserId::from(required(&req.author_id, "authorId")?);
    let text = required(&req.text, "text")?;

    let message = state.chat_service.edit_message(&id, &author_id, text).await?;
    Ok(Json(message))
}

/// `DELETE /messages/{id}` — Delete a message; author-only.
/// `message:deleted` is broadcast on success.
///
/// # Errors
///
/// Returns [`ChatError::MessageNotFound`] for an unknown id,
/// [`ChatError::Forbidden`] for a non-author caller, and
/// [`ChatError::InvalidRequest`] for a missing `authorId`.
#[utoipa::path(
    delete,
    path = "/messages/{id}",
    tag = "Messages",
    summary = "Delete a message",
    params(
        ("id" = String, Path, description = "Message id"),
    ),
    request_body = DeleteMessageRequest,
    responses(
        (status = 200, description = "Message deleted", body = DeleteMessageResponse),
        (status = 400, description = "Missing authorId", body = ErrorResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DeleteMessageRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let id = MessageId::from(id);
    let author_id = UserId::from(required(&req.author_id, "authorId")?);

    let id = state.chat_service.delete_message(&id, &author_id).await?;
    Ok(Json(DeleteMessageResponse { success: true, id }))
}

/// `POST /messages/{id}/reactions` — Toggle a reaction on the
/// (message, user, emoji) triple. Broadcasts `reaction:added` or
/// `reaction:removed` and returns the refreshed message either way.
///
/// # Errors
///
/// Returns [`ChatError::MessageNotFound`] for an unknown id and
/// [`ChatError::InvalidRequest`] for missing fields.
#[utoipa::path(
    post,
    path = "/messages/{id}/reactions",
    tag = "Messages",
    summary = "Toggle a reaction",
    params(
        ("id" = String, Path, description = "Message id"),
    ),
    request_body = ToggleReactionRequest,
    responses(
        (status = 200, description = "Reaction toggled", body = Message),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ToggleReactionRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let id = MessageId::from(id);
    let user_id = UserId::from(required(&req.user_id, "userId")?);
    let emoji = required(&req.emoji, "emoji")?;

    let message = state.chat_service.toggle_reaction(&id, &user_id, emoji).await?;
    Ok(Json(message))
}

/// Message routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(create_message).get(list_messages))
        .route(
            "/messages/{id}",
            axum::routing::patch(update_message).delete(delete_message),
        )
        .route("/messages/{id}/reactions", post(toggle_reaction))
}
