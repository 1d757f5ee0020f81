use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{OfferId, OfferRequest};
use super::repository::{OfferFilter, OfferRepository};
use super::service::{OfferError, OfferService};
use crate::marketplace::loi::LoiRepository;
use crate::marketplace::notifications::NotificationPublisher;
use crate::marketplace::response;

/// Router builder exposing the offer negotiation endpoints.
pub fn offer_router<R, L, N>(service: Arc<OfferService<R, L, N>>) -> Router
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/offers",
            post(create_handler::<R, L, N>).get(list_handler::<R, L, N>),
        )
        .route("/api/v1/offers/:offer_id", get(detail_handler::<R, L, N>))
        .route(
            "/api/v1/offers/:offer_id/accept",
            post(accept_handler::<R, L, N>),
        )
        .route(
            "/api/v1/offers/:offer_id/reject",
            post(reject_handler::<R, L, N>),
        )
        .with_state(service)
}

/// Producer's accept/reject payload.
#[derive(Debug, Default, Deserialize)]
pub struct OfferResponseRequest {
    #[serde(default)]
    pub response_message: Option<String>,
}

fn offer_error_response(err: OfferError) -> Response {
    let status = match err {
        OfferError::NotFound => StatusCode::NOT_FOUND,
        OfferError::DuplicatePending => StatusCode::CONFLICT,
        OfferError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    response::error(status, &err.to_string())
}

pub(crate) async fn create_handler<R, L, N>(
    State(service): State<Arc<OfferService<R, L, N>>>,
    axum::Json(request): axum::Json<OfferRequest>,
) -> Response
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    match service.create(request, now) {
        Ok(record) => response::success(
            StatusCode::CREATED,
            json!(record.view(now)),
            "Offer created successfully",
        ),
        Err(err) => offer_error_response(err),
    }
}

pub(crate) async fn list_handler<R, L, N>(
    State(service): State<Arc<OfferService<R, L, N>>>,
    Query(filter): Query<OfferFilter>,
) -> Response
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    match service.list(&filter) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.view(now)).collect();
            response::success(
                StatusCode::OK,
                json!(views),
                "Offers retrieved successfully",
            )
        }
        Err(err) => offer_error_response(err),
    }
}

pub(crate) async fn detail_handler<R, L, N>(
    State(service): State<Arc<OfferService<R, L, N>>>,
    Path(offer_id): Path<String>,
) -> Response
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    match service.get(&OfferId(offer_id)) {
        Ok(record) => response::success(
            StatusCode::OK,
            json!(record.view(now)),
            "Offer retrieved successfully",
        ),
        Err(err) => offer_error_response(err),
    }
}

pub(crate) async fn accept_handler<R, L, N>(
    State(service): State<Arc<OfferService<R, L, N>>>,
    Path(offer_id): Path<String>,
    axum::Json(payload): axum::Json<OfferResponseRequest>,
) -> Response
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    match service.accept(&OfferId(offer_id), payload.response_message, now) {
        Ok((record, loi)) => response::success(
            StatusCode::OK,
            json!({
                "offer": record.view(now),
                "loi": loi.map(|loi| loi.view()),
            }),
            "Offer accepted successfully",
        ),
        Err(err) => offer_error_response(err),
    }
}

pub(crate) async fn reject_handler<R, L, N>(
    State(service): State<Arc<OfferService<R, L, N>>>,
    Path(offer_id): Path<String>,
    axum::Json(payload): axum::Json<OfferResponseRequest>,
) -> Response
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    match service.reject(&OfferId(offer_id), payload.response_message, now) {
        Ok(record) => response::success(
            StatusCode::OK,
            json!(record.view(now)),
            "Offer rejected successfully",
        ),
        Err(err) => offer_error_response(err),
    }
}
