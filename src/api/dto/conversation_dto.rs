//! Conversation endpoint DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /conversations`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// Conversation title. Required; empty counts as missing.
    pub title: Option<String>,
    /// Initial member user ids; memberships are created alongside.
    #[serde(default)]
    pub member_user_ids: Option<Vec<String>>,
}

/// Query of `GET /conversations`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListParams {
    /// User whose conversations to list. Required.
    pub user_id: Option<String>,
}
