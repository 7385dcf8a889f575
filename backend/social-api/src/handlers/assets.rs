use actix_web::{web, HttpResponse};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::uploads::is_safe_asset_name;

/// GET /assets/{filename}
pub async fn serve_asset(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let file_name = path.into_inner();
    if !is_safe_asset_name(&file_name) {
        return Err(AppError::NotFound("Asset not found".to_string()));
    }

    let bytes = match tokio::fs::read(state.uploads.assets_dir.join(&file_name)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Asset not found".to_string()))
        }
        Err(e) => return Err(AppError::Internal(format!("Cannot read asset: {}", e))),
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&file_name))
        .body(bytes))
}

fn content_type_for(file_name: &str) -> mime::Mime {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("gif") => mime::IMAGE_GIF,
        Some("svg") => mime::IMAGE_SVG,
        Some("bmp") => mime::IMAGE_BMP,
        Some("webp") => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        Some("txt") => mime::TEXT_PLAIN,
        Some("json") => mime::APPLICATION_JSON,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
