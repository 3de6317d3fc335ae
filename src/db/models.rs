use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Absent and `null` both read as the type's default. Nothing enforces a
/// schema on these collections, so older documents may carry either.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    /// Argon2 PHC string; Google-registered users have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, deserialize_with = "nullable")]
    pub from: String,
    #[serde(default, deserialize_with = "nullable")]
    pub to: String,
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
    pub timestamp: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "fileName", default, deserialize_with = "nullable")]
    pub file_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub file_type: String,
    /// Older documents spell the counter `like`
    #[serde(default, alias = "like", deserialize_with = "nullable")]
    pub likes: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub comments: Vec<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_legacy_like_field_reads_as_likes() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "fileName": "cat.png",
            "url": "http://localhost:8000/uploads/x.png",
            "type": "image/png",
            "like": 3_i64,
        };
        let file: FileDoc = bson::from_document(raw).unwrap();
        assert_eq!(file.likes, 3);
        assert!(file.comments.is_empty());
    }

    #[test]
    fn test_file_with_missing_metadata_still_decodes() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "fileName": "cat.png",
            "url": "http://localhost:8000/uploads/x.png",
            "likes": 2_i64,
            "comments": bson::Bson::Null,
        };
        let file: FileDoc = bson::from_document(raw).unwrap();
        assert_eq!(file.file_type, "");
        assert_eq!(file.likes, 2);
        assert!(file.comments.is_empty());
    }

    #[test]
    fn test_message_with_null_fields_still_decodes() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "from": "alice",
            "to": bson::Bson::Null,
            "text": bson::Bson::Null,
            "timestamp": DateTime::now(),
        };
        let message: Message = bson::from_document(raw).unwrap();
        assert_eq!(message.from, "alice");
        assert_eq!(message.to, "");
        assert_eq!(message.text, "");
    }

    #[test]
    fn test_google_user_has_no_password_field() {
        let user = User {
            id: None,
            email: "a@x.com".into(),
            username: "a".into(),
            password: None,
            created_at: None,
        };
        let doc = bson::to_document(&user).unwrap();
        assert!(!doc.contains_key("password"));
        assert!(!doc.contains_key("_id"));
    }
}
