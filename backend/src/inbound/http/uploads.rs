//! Serving uploaded images under `/uploads/<uuid>.<ext>`.

use actix_web::{HttpResponse, get, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::immutable_upload_header;
use crate::inbound::http::state::HttpState;

/// Stream back a stored image.
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    params(("name" = String, Path, description = "Stored file name, `<uuid>.<ext>`")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "Unknown upload", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "getUpload",
    security([])
)]
#[get("/uploads/{name}")]
pub async fn get_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let image = state.media.open(&path).await?;
    Ok(HttpResponse::Ok()
        .content_type(image.kind.content_type())
        .insert_header(immutable_upload_header())
        .body(image.bytes))
}
