use axum::{
    extract::{Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::AppError;
use crate::models::{
    ExportFormat, ExportRequest, SummaryCard, UploadResponse, ViewRequest, ViewResponse,
};
use crate::services::dataset::DatasetKind;
use crate::services::{export, filter, format, ingest, paginate};
use crate::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/datasets/:kind/upload", post(upload_dataset))
        .route("/datasets/:kind/view", post(view_dataset))
        .route("/datasets/:kind/export", post(export_dataset))
        .layer(cors)
}

fn parse_kind(slug: &str) -> Result<DatasetKind, AppError> {
    DatasetKind::from_slug(slug)
        .ok_or_else(|| AppError::InvalidInput(format!("Conjunto de dados desconhecido: {}", slug)))
}

async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let start = std::time::Instant::now();

    let mut file_data: Option<bytes::Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Falha ao ler o upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Falha ao ler o upload: {}", e)))?;
            file_data = Some(data);
        }
    }

    let data = file_data
        .ok_or_else(|| AppError::InvalidInput("Nenhum arquivo enviado".to_string()))?;
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::InvalidInput(format!(
            "Arquivo excede o limite de {} bytes",
            state.config.max_upload_bytes
        )));
    }

    tracing::info!(
        "Received {} upload, size: {}KB",
        kind.label(),
        data.len() / 1024
    );

    let dataset = ingest::ingest_dataset(kind, &data)?;
    let response = UploadResponse {
        sheet: kind.label().to_string(),
        rows: dataset.rows.len(),
        columns: dataset.columns.clone(),
    };
    state.datasets.write().insert(kind, dataset);

    tracing::info!(
        "{} ready in {:?}: {} rows",
        kind.label(),
        start.elapsed(),
        response.rows
    );
    Ok(Json(response))
}

// Every view request recomputes filter → summary → paginate → format from
// the stored dataset; nothing is cached between interactions.
async fn view_dataset(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(request): Json<ViewRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let kind = parse_kind(&kind)?;

    let datasets = state.datasets.read();
    let dataset = datasets
        .get(&kind)
        .ok_or_else(|| AppError::DatasetMissing(kind.label().to_string()))?;

    let options = filter::options(dataset, kind);
    let filtered = filter::apply(dataset, &request.filters);
    let total_rows = filtered.rows.len();
    let total_pages = paginate::total_pages(total_rows);
    let page = request.page.clamp(1, total_pages);
    let amount = filtered.sum_numeric(kind.summary_column());
    let rows = format::display_rows(kind, &filtered, paginate::page_slice(&filtered.rows, page));

    Ok(Json(ViewResponse {
        columns: filtered.columns.clone(),
        rows,
        total_rows,
        page,
        total_pages,
        options,
        summary: SummaryCard {
            label: kind.summary_label().to_string(),
            amount,
            formatted: format::format_currency(amount),
        },
    }))
}

async fn export_dataset(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;

    if request.format == ExportFormat::Pdf {
        tracing::warn!("PDF export requested for {}", kind.label());
        return Ok((
            StatusCode::NOT_IMPLEMENTED,
            Json(serde_json::json!({
                "notice": "Exportação para PDF não implementada"
            })),
        )
            .into_response());
    }

    let datasets = state.datasets.read();
    let dataset = datasets
        .get(&kind)
        .ok_or_else(|| AppError::DatasetMissing(kind.label().to_string()))?;

    // Export covers the whole filtered dataset, never just the current page.
    let filtered = filter::apply(dataset, &request.filters);
    let bytes = export::to_xlsx(kind, &filtered)?;
    let filename = format!("{}.xlsx", kind.export_stem());

    tracing::info!("Exporting {} rows to {}", filtered.rows.len(), filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_slug_is_invalid_input() {
        assert!(parse_kind("produtos").is_ok());
        assert!(parse_kind("corretagem").is_ok());
        assert!(matches!(parse_kind("pdf"), Err(AppError::InvalidInput(_))));
    }
}
