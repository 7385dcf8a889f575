/// Form bodies and picture uploads
///
/// Registration and post creation accept either `multipart/form-data` (with an
/// optional `picture` file part) or a JSON object. Both are read into a
/// [`FormData`]; an uploaded picture is written to the asset directory under
/// its base file name.
use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Name of the file part that carries a picture.
pub const PICTURE_FIELD: &str = "picture";

/// Text parts larger than this are rejected.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub assets_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// A picture that has been written to the asset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub size: usize,
}

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub picture: Option<StoredFile>,
}

impl FormData {
    /// Take a text field out of the form, skipping blank values.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields
            .remove(name)
            .filter(|value| !value.trim().is_empty())
    }

    /// Like [`FormData::take`] but a missing field is a 400.
    pub fn require(&mut self, name: &str) -> Result<String> {
        self.take(name)
            .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
    }
}

/// Read a request body as multipart or JSON, depending on its content type.
pub async fn read_form(
    req: &HttpRequest,
    payload: web::Payload,
    settings: &UploadSettings,
) -> Result<FormData> {
    let content_type = req.content_type().to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        read_multipart(Multipart::new(req.headers(), payload), settings).await
    } else if content_type.starts_with("application/json") {
        read_json(payload, settings.max_upload_bytes).await
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported content type '{}'",
            content_type
        )))
    }
}

async fn read_json(mut payload: web::Payload, limit: usize) -> Result<FormData> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Body read error: {}", e)))?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::BadRequest("Request body too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }

    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?;

    let fields = object
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect();

    Ok(FormData {
        fields,
        picture: None,
    })
}

/// Running byte count for one multipart request.
///
/// Every part counts against the same cap: text fields, dropped file parts and
/// the picture itself.
#[derive(Debug)]
struct BodyBudget {
    used: usize,
    limit: usize,
}

impl BodyBudget {
    fn new(limit: usize) -> Self {
        Self { used: 0, limit }
    }

    fn consume(&mut self, bytes: usize) -> Result<()> {
        self.used = self.used.saturating_add(bytes);
        if self.used > self.limit {
            return Err(AppError::BadRequest(format!(
                "Upload exceeds {} bytes",
                self.limit
            )));
        }
        Ok(())
    }
}

async fn read_multipart(mut multipart: Multipart, settings: &UploadSettings) -> Result<FormData> {
    let mut form = FormData::default();
    let mut budget = BodyBudget::new(settings.max_upload_bytes);

    while let Some(item) = multipart.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        match file_name {
            Some(original) if name == PICTURE_FIELD => {
                let stored = save_field(&mut field, &original, settings, &mut budget).await?;
                tracing::info!(file_name = %stored.file_name, size = stored.size, "picture stored");
                form.picture = Some(stored);
            }
            Some(_) => {
                // Unknown file parts are drained and dropped.
                while let Some(chunk) = field.next().await {
                    let data = chunk
                        .map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
                    budget.consume(data.len())?;
                }
            }
            None => {
                let mut value = Vec::new();
                while let Some(chunk) = field.next().await {
                    let data = chunk
                        .map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
                    budget.consume(data.len())?;
                    if value.len() + data.len() > MAX_TEXT_FIELD_BYTES {
                        return Err(AppError::BadRequest(format!("Field {} is too large", name)));
                    }
                    value.extend_from_slice(&data);
                }
                let value = String::from_utf8(value)
                    .map_err(|_| AppError::BadRequest(format!("Field {} is not UTF-8", name)))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

async fn save_field(
    field: &mut actix_multipart::Field,
    original_name: &str,
    settings: &UploadSettings,
    budget: &mut BodyBudget,
) -> Result<StoredFile> {
    let file_name = sanitize_file_name(original_name)?;
    tokio::fs::create_dir_all(&settings.assets_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Cannot create asset directory: {}", e)))?;

    let final_path = settings.assets_dir.join(&file_name);
    let partial_path = partial_path_for(&settings.assets_dir, &file_name);

    match write_stream(field, &partial_path, budget).await {
        Ok(size) => {
            tokio::fs::rename(&partial_path, &final_path)
                .await
                .map_err(|e| AppError::Internal(format!("Cannot store upload: {}", e)))?;
            Ok(StoredFile { file_name, size })
        }
        Err(err) => {
            let _ = tokio::fs::remove_file(&partial_path).await;
            Err(err)
        }
    }
}

/// Hidden per-upload temp file, so concurrent uploads of one name never share it.
fn partial_path_for(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(format!(".{}.{}.part", file_name, Uuid::new_v4().simple()))
}

async fn write_stream(
    field: &mut actix_multipart::Field,
    path: &Path,
    budget: &mut BodyBudget,
) -> Result<usize> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| AppError::Internal(format!("Cannot store upload: {}", e)))?;

    let mut size = 0usize;
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
        budget.consume(data.len())?;
        size += data.len();
        file.write_all(&data)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot store upload: {}", e)))?;
    }
    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Cannot store upload: {}", e)))?;

    Ok(size)
}

/// Reduce a client-supplied file name to a safe base name.
///
/// Directory components are dropped; names that are empty, `.`, `..`, hidden
/// or contain control characters are rejected.
pub fn sanitize_file_name(raw: &str) -> Result<String> {
    let base = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if !is_safe_asset_name(base) {
        return Err(AppError::BadRequest(format!("Invalid file name '{}'", raw)));
    }
    Ok(base.to_string())
}

/// True for a plain file name that can be joined onto the asset directory.
pub fn is_safe_asset_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}
