use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bson::oid::ObjectId;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::state::AppState;
use crate::db::{FileDoc, FileRepository};
use crate::error::AppError;
use crate::storage::unique_object_name;

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikesResponse {
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FileView {
    pub id: Option<String>,
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub likes: i64,
    pub comments: Vec<String>,
}

impl From<FileDoc> for FileView {
    fn from(file: FileDoc) -> Self {
        FileView {
            id: file.id.map(|id| id.to_hex()),
            file_name: file.file_name,
            url: file.url,
            file_type: file.file_type,
            likes: file.likes,
            comments: file.comments,
        }
    }
}

/// Fields of the upload form, all required
#[derive(Debug, Default)]
pub struct UploadForm {
    pub data: Option<Bytes>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?;
                    form.data = Some(data);
                }
                "fileName" | "type" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read {}: {}", name, e)))?;
                    if name == "fileName" {
                        form.file_name = Some(value);
                    } else {
                        form.file_type = Some(value);
                    }
                }
                other => tracing::debug!("Ignoring upload field {:?}", other),
            }
        }

        Ok(form)
    }

    /// (data, fileName, type) once every field is present and non-empty
    pub fn validate(self) -> Result<(Bytes, String, String), AppError> {
        let data = self.data.filter(|d| !d.is_empty());
        let file_name = self.file_name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let file_type = self.file_type.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        match (data, file_name, file_type) {
            (Some(data), Some(file_name), Some(file_type)) => Ok((data, file_name, file_type)),
            _ => Err(AppError::Validation(
                "Missing required fields: file, fileName and type".to_string(),
            )),
        }
    }
}

fn parse_file_id(id: &str) -> Result<ObjectId, AppError> {
    Ok(ObjectId::parse_str(id)?)
}

/// POST /api/upload-file
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let (data, file_name, file_type) = UploadForm::read(multipart).await?.validate()?;

    let object_name = unique_object_name(&file_name);
    let url = state.blobs.put(&object_name, data).await?;

    // A stored blob is not removed if this insert fails
    let file = FileRepository::create(&state.db, file_name, url.clone(), file_type).await?;

    tracing::info!("📁 Stored {} as {}", file.file_name, object_name);
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        url,
        id: file.id.map(|id| id.to_hex()),
    }))
}

/// PATCH /api/toggle-like/:id
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LikesResponse>, AppError> {
    let id = parse_file_id(&id)?;

    let likes = FileRepository::toggle_like(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok(Json(LikesResponse { likes }))
}

/// POST /api/add-comment/:id
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AddCommentRequest>,
) -> Result<Json<CommentsResponse>, AppError> {
    let id = parse_file_id(&id)?;

    let comment = req
        .comment
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Comment must be a non-empty string".to_string()))?;

    let comments = FileRepository::add_comment(&state.db, id, &comment)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    Ok(Json(CommentsResponse { comments }))
}

/// GET /api/get-files
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileView>>, AppError> {
    let files = FileRepository::list(&state.db).await?;
    Ok(Json(files.into_iter().map(FileView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(data: &'static [u8], file_name: Option<&str>, file_type: Option<&str>) -> UploadForm {
        UploadForm {
            data: Some(Bytes::from_static(data)),
            file_name: file_name.map(str::to_string),
            file_type: file_type.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_complete_form() {
        let (data, name, kind) = form(b"png", Some(" cat.png "), Some("image/png"))
            .validate()
            .unwrap();
        assert_eq!(&data[..], b"png");
        assert_eq!(name, "cat.png");
        assert_eq!(kind, "image/png");
    }

    #[test]
    fn test_validate_missing_fields() {
        assert!(form(b"png", None, Some("image/png")).validate().is_err());
        assert!(form(b"png", Some("cat.png"), Some("  ")).validate().is_err());
        assert!(form(b"", Some("cat.png"), Some("image/png")).validate().is_err());
        assert!(UploadForm::default().validate().is_err());
    }

    #[test]
    fn test_parse_file_id() {
        assert!(parse_file_id("507f1f77bcf86cd799439011").is_ok());
        assert!(matches!(parse_file_id("123"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_file_view_shape() {
        let view = FileView::from(FileDoc {
            id: Some(ObjectId::new()),
            file_name: "cat.png".into(),
            url: "http://localhost:8000/uploads/x.png".into(),
            file_type: "image/png".into(),
            likes: 1,
            comments: vec!["nice".into()],
            created_at: None,
        });
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["fileName"], "cat.png");
        assert_eq!(json["type"], "image/png");
        assert_eq!(json["likes"], 1);
    }
}
