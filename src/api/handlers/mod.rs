//! REST endpoint handlers organized by resource.

pub mod conversation;
pub mod message;
pub mod system;
pub mod user;

use axum::Router;

use crate::app_state::AppState;
use crate::error::ChatError;

/// Composes all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(user::routes())
        .merge(conversation::routes())
        .merge(message::routes())
}

/// Extracts a required string field, treating empty/whitespace-only
/// values as missing (the original clients send `""` for cleared inputs).
pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ChatError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ChatError::InvalidRequest(format!("{name} required")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn required_accepts_present_values() {
        let value = Some("alice".to_string());
        assert!(matches!(required(&value, "username"), Ok("alice")));
    }

    #[test]
    fn required_rejects_missing_and_empty() {
        for value in [None, Some(String::new()), Some("   ".to_string())] {
            let Err(ChatError::InvalidRequest(msg)) = required(&value, "username") else {
                panic!("expected invalid request");
            };
            assert_eq!(msg, "username required");
        }
    }
}
