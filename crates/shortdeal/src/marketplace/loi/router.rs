use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::LoiId;
use super::repository::LoiRepository;
use super::service::{LoiError, LoiService};
use crate::marketplace::response;

/// Router builder exposing the letter-of-intent endpoints.
pub fn loi_router<L>(service: Arc<LoiService<L>>) -> Router
where
    L: LoiRepository + 'static,
{
    Router::new()
        .route("/api/v1/loi", get(list_handler::<L>))
        .route("/api/v1/loi/:loi_id", get(detail_handler::<L>))
        .route("/api/v1/loi/:loi_id/pdf", get(download_handler::<L>))
        .route("/api/v1/loi/:loi_id/render", post(render_handler::<L>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoiListQuery {
    #[serde(default)]
    party: Option<String>,
}

fn loi_error_response(err: LoiError) -> Response {
    match err {
        LoiError::NotFound => response::error(StatusCode::NOT_FOUND, &err.to_string()),
        LoiError::ArtifactPending => response::error_with_code(
            StatusCode::SERVICE_UNAVAILABLE,
            "PDF_GENERATING",
            "PDF is being generated. Please try again in a few moments.",
        ),
        other => response::error(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
    }
}

pub(crate) async fn list_handler<L>(
    State(service): State<Arc<LoiService<L>>>,
    Query(query): Query<LoiListQuery>,
) -> Response
where
    L: LoiRepository + 'static,
{
    let Some(party) = query.party else {
        return response::error(StatusCode::BAD_REQUEST, "party query parameter is required");
    };

    match service.list_for_party(&party) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.view()).collect();
            response::success(StatusCode::OK, json!(views), "LOIs retrieved successfully")
        }
        Err(err) => loi_error_response(err),
    }
}

pub(crate) async fn detail_handler<L>(
    State(service): State<Arc<LoiService<L>>>,
    Path(loi_id): Path<String>,
) -> Response
where
    L: LoiRepository + 'static,
{
    match service.get(&LoiId(loi_id)) {
        Ok(record) => response::success(
            StatusCode::OK,
            json!(record.view()),
            "LOI retrieved successfully",
        ),
        Err(err) => loi_error_response(err),
    }
}

/// Regenerate the document, e.g. after a rendering failure left the
/// letter without an artifact.
pub(crate) async fn render_handler<L>(
    State(service): State<Arc<LoiService<L>>>,
    Path(loi_id): Path<String>,
) -> Response
where
    L: LoiRepository + 'static,
{
    match service.render(&LoiId(loi_id), Utc::now()) {
        Ok(record) => response::success(
            StatusCode::OK,
            json!(record.view()),
            "LOI document generated successfully",
        ),
        Err(err) => loi_error_response(err),
    }
}

pub(crate) async fn download_handler<L>(
    State(service): State<Arc<LoiService<L>>>,
    Path(loi_id): Path<String>,
) -> Response
where
    L: LoiRepository + 'static,
{
    match service.artifact(&LoiId(loi_id)) {
        Ok((document_number, document)) => {
            let disposition = format!("attachment; filename=\"{document_number}.pdf\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, document.content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Err(err) => loi_error_response(err),
    }
}
