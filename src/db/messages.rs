use bson::{doc, DateTime, Document};
use futures::TryStreamExt;

use crate::db::models::Message;
use crate::db::Database;
use crate::error::AppError;

pub struct MessageRepository;

/// Messages exchanged between `a` and `b`, in either direction
pub fn conversation_filter(a: &str, b: &str) -> Document {
    doc! {
        "$or": [
            { "from": a, "to": b },
            { "from": b, "to": a },
        ]
    }
}

/// Oldest first; `_id` breaks timestamp ties
pub fn conversation_sort() -> Document {
    doc! { "timestamp": 1, "_id": 1 }
}

impl MessageRepository {
    pub async fn create(
        db: &Database,
        from: String,
        to: String,
        text: String,
    ) -> Result<Message, AppError> {
        let mut message = Message {
            id: None,
            from,
            to,
            text,
            timestamp: DateTime::now(),
        };

        let result = db.messages.insert_one(&message).await?;
        message.id = result.inserted_id.as_object_id();

        Ok(message)
    }

    pub async fn get_conversation(
        db: &Database,
        user_id: &str,
        chat_user_id: &str,
    ) -> Result<Vec<Message>, AppError> {
        let cursor = db
            .messages
            .find(conversation_filter(user_id, chat_user_id))
            .sort(conversation_sort())
            .await?;

        let messages = cursor.try_collect().await?;
        Ok(messages)
    }
}
