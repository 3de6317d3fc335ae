use bson::{doc, oid::ObjectId, DateTime, Document};
use futures::TryStreamExt;
use mongodb::options::{ReturnDocument, UpdateModifications};
use serde::Deserialize;

use crate::db::models::{nullable, FileDoc};
use crate::db::Database;
use crate::error::AppError;

pub struct FileRepository;

/// Like counter after one toggle: an even count goes up, an odd count goes down
pub fn toggled_likes(current: i64) -> i64 {
    if current % 2 == 0 {
        current + 1
    } else {
        current - 1
    }
}

/// Stored like count: `likes`, else the legacy `like`, else 0
pub fn current_likes_expr() -> Document {
    doc! { "$ifNull": ["$likes", { "$ifNull": ["$like", 0] }] }
}

/// Server-side form of [`toggled_likes`]. Drops the legacy `like` field afterwards.
pub fn toggle_like_pipeline() -> Vec<Document> {
    let current = current_likes_expr();

    vec![
        doc! {
            "$set": {
                "likes": {
                    "$cond": [
                        { "$eq": [{ "$mod": [current.clone(), 2] }, 0] },
                        { "$add": [current.clone(), 1] },
                        { "$subtract": [current, 1] },
                    ]
                }
            }
        },
        doc! { "$unset": "like" },
    ]
}

/// Appends `comment` as the last element of `comments`
pub fn add_comment_update(comment: &str) -> Document {
    doc! { "$push": { "comments": comment } }
}

// Only the touched field is read back, so an update that was applied is never
// reported as failed because some other field of the document is malformed.
#[derive(Debug, Deserialize)]
struct LikesProjection {
    #[serde(default, deserialize_with = "nullable")]
    likes: i64,
}

#[derive(Debug, Deserialize)]
struct CommentsProjection {
    #[serde(default, deserialize_with = "nullable")]
    comments: Vec<String>,
}

impl FileRepository {
    pub async fn create(
        db: &Database,
        file_name: String,
        url: String,
        file_type: String,
    ) -> Result<FileDoc, AppError> {
        let mut file = FileDoc {
            id: None,
            file_name,
            url,
            file_type,
            likes: 0,
            comments: Vec::new(),
            created_at: Some(DateTime::now()),
        };

        let result = db.files.insert_one(&file).await?;
        file.id = result.inserted_id.as_object_id();

        Ok(file)
    }

    pub async fn list(db: &Database) -> Result<Vec<FileDoc>, AppError> {
        let cursor = db.files.find(doc! {}).await?;
        let files = cursor.try_collect().await?;
        Ok(files)
    }

    /// Atomically flip the like counter. `None` if the file does not exist.
    pub async fn toggle_like(db: &Database, id: ObjectId) -> Result<Option<i64>, AppError> {
        let updated = db
            .files
            .clone_with_type::<LikesProjection>()
            .find_one_and_update(
                doc! { "_id": id },
                UpdateModifications::Pipeline(toggle_like_pipeline()),
            )
            .projection(doc! { "_id": 0, "likes": 1 })
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated.map(|file| file.likes))
    }

    /// Atomically append a comment. `None` if the file does not exist.
    pub async fn add_comment(
        db: &Database,
        id: ObjectId,
        comment: &str,
    ) -> Result<Option<Vec<String>>, AppError> {
        let updated = db
            .files
            .clone_with_type::<CommentsProjection>()
            .find_one_and_update(doc! { "_id": id }, add_comment_update(comment))
            .projection(doc! { "_id": 0, "comments": 1 })
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated.map(|file| file.comments))
    }
}
