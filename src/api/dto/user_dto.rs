//! User endpoint DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /users`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Username to create or fetch. Required; empty counts as missing.
    pub username: Option<String>,
}
