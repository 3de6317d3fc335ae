use bson::{doc, DateTime, Document};
use futures::TryStreamExt;

use crate::db::models::User;
use crate::db::Database;
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    pub async fn create(
        db: &Database,
        email: String,
        username: String,
        password_hash: Option<String>,
    ) -> Result<User, AppError> {
        let mut user = User {
            id: None,
            email,
            username,
            password: password_hash,
            created_at: Some(DateTime::now()),
        };

        let result = db.users.insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();

        Ok(user)
    }

    pub async fn get_by_email(db: &Database, email: &str) -> Result<Option<User>, AppError> {
        let user = db.users.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    /// Every stored user document as-is, credentials stripped
    pub async fn list_documents(db: &Database) -> Result<Vec<Document>, AppError> {
        let cursor = db.user_documents.find(doc! {}).await?;
        let mut users: Vec<Document> = cursor.try_collect().await?;

        for user in users.iter_mut() {
            user.remove("password");
            user.remove("otp");
        }

        Ok(users)
    }
}
