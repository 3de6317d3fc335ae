use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::state::AppState;
use crate::db::{Message, MessageRepository};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub from: String,
    pub to: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        MessageView {
            id: message.id.map(|id| id.to_hex()),
            from: message.from,
            to: message.to,
            text: message.text,
            timestamp: message.timestamp.to_chrono(),
        }
    }
}

/// POST /api/messages
pub async fn send_message(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageView>), AppError> {
    let message = MessageRepository::create(&state.db, req.from, req.to, req.text).await?;

    tracing::debug!("✉️ Message {} -> {}", message.from, message.to);
    Ok((StatusCode::CREATED, Json(message.into())))
}

/// GET /api/messages/:user_id/:chat_user_id
pub async fn get_conversation(
    State(state): State<AppState>,
    Path((user_id, chat_user_id)): Path<(String, String)>,
) -> Result<Json<Vec<MessageView>>, AppError> {
    let messages = MessageRepository::get_conversation(&state.db, &user_id, &chat_user_id).await?;

    Ok(Json(messages.into_iter().map(MessageView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_view_uses_rfc3339_timestamp() {
        let message = Message {
            id: Some(bson::oid::ObjectId::new()),
            from: "alice".into(),
            to: "bob".into(),
            text: "hi".into(),
            timestamp: bson::DateTime::from_millis(1_700_000_000_000),
        };

        let json = serde_json::to_value(MessageView::from(message)).unwrap();
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
        assert_eq!(json["from"], "alice");
        assert!(json["id"].is_string());
    }
}
