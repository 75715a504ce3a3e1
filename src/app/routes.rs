// ==========================================
// 商品目录导入系统 - HTTP 路由
// ==========================================
// POST /api/items/bulk-import  multipart: file + zip（或 archive）
// GET  /health
// 租户: 请求头 X-Tenant-Id（由上游认证网关写入）
// ==========================================

use crate::api::{ApiError, ARCHIVE_PART, TABULAR_PART};
use crate::app::state::AppState;
use crate::domain::import_job::{ImportReport, UploadedFile};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::debug;

pub const TENANT_HEADER: &str = "x-tenant-id";
const ARCHIVE_PART_ALIAS: &str = "archive";

/// 构建路由
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/items/bulk-import", post(bulk_import))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn bulk_import(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, ApiError> {
    let tenant_id = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let mut tabular = None;
    let mut archive = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let part = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().unwrap_or("").to_string();

        let slot = match part.as_str() {
            TABULAR_PART => &mut tabular,
            ARCHIVE_PART | ARCHIVE_PART_ALIAS => &mut archive,
            _ => {
                debug!(part = %part, "忽略未知表单字段");
                continue;
            }
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("Failed to read part {}: {}", part, e)))?;

        // 同名字段重复时保留第一个
        if slot.is_none() {
            *slot = Some(UploadedFile::new(file_name, bytes.to_vec()));
        }
    }

    let report = state
        .import_api
        .import_items(&tenant_id, tabular, archive, state.shutdown.child_token())
        .await?;

    Ok(Json(report))
}
