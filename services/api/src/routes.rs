use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

use crate::infra::AppState;
use shortdeal::marketplace::loi::{loi_router, LoiRepository, LoiService};
use shortdeal::marketplace::notifications::NotificationPublisher;
use shortdeal::marketplace::offers::{offer_router, OfferRepository, OfferService};

pub(crate) fn with_marketplace_routes<R, L, N>(
    offers: Arc<OfferService<R, L, N>>,
    lois: Arc<LoiService<L>>,
) -> axum::Router
where
    R: OfferRepository + 'static,
    L: LoiRepository + 'static,
    N: NotificationPublisher + 'static,
{
    offer_router(offers)
        .merge(loi_router(lois))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        InMemoryLoiRepository, InMemoryNotificationPublisher, InMemoryOfferRepository,
    };
    use axum::body::Body;
    use axum::http::Request;
    use shortdeal::marketplace::loi::{FixedLayoutRenderer, LoiRenderer, RenderError};
    use tower::ServiceExt;

    fn marketplace_app(renderer: Arc<dyn LoiRenderer>) -> axum::Router {
        let offers_repo = Arc::new(InMemoryOfferRepository::default());
        let lois_repo = Arc::new(InMemoryLoiRepository::default());
        let lois = Arc::new(LoiService::new(lois_repo, renderer));
        let offers = Arc::new(OfferService::new(
            offers_repo,
            lois.clone(),
            Arc::new(InMemoryNotificationPublisher::default()),
        ));
        with_marketplace_routes(offers, lois)
    }

    fn offer_payload(content_id: &str) -> serde_json::Value {
        json!({
            "content": {
                "content_id": content_id,
                "producer": {
                    "handle": "studio-one",
                    "company_name": "Studio One",
                    "country": "Korea"
                },
                "title": "City Lights",
                "description": "Short-form documentary series.",
                "status": "public"
            },
            "buyer": {
                "handle": "acme-buyer",
                "company_name": "Acme Media",
                "country": "Germany"
            },
            "offered_price": "100.00",
            "currency": "USD",
            "message": "Interested in a one-year license.",
            "validity_days": 7
        })
    }

    async fn send(
        app: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        };

        let response = app.clone().oneshot(request).await.expect("handler runs");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        (status, bytes.to_vec())
    }

    fn parse(bytes: &[u8]) -> serde_json::Value {
        serde_json::from_slice(bytes).expect("json body")
    }

    #[tokio::test]
    async fn offer_accept_flow_returns_loi_and_document() {
        let app = marketplace_app(Arc::new(FixedLayoutRenderer));

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/offers",
            Some(offer_payload("content-1")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let body = parse(&body);
        assert_eq!(body["success"], json!(true));
        let offer_id = body["data"]["id"].as_str().expect("offer id").to_string();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/offers/{offer_id}/accept"),
            Some(json!({"response_message": "Deal."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = parse(&body);
        assert_eq!(body["data"]["offer"]["status"], json!("accepted"));
        let loi_id = body["data"]["loi"]["id"].as_str().expect("loi id").to_string();
        let document_number = body["data"]["loi"]["document_number"]
            .as_str()
            .expect("document number")
            .to_string();
        assert!(document_number.starts_with("LOI-"));
        assert_eq!(body["data"]["loi"]["document_ready"], json!(true));

        let (status, bytes) = send(&app, "GET", &format!("/api/v1/loi/{loi_id}/pdf"), None).await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(bytes).expect("utf8 artifact");
        assert!(text.contains(&document_number));
    }

    #[tokio::test]
    async fn duplicate_pending_offer_returns_conflict() {
        let app = marketplace_app(Arc::new(FixedLayoutRenderer));

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/offers",
            Some(offer_payload("content-1")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/offers",
            Some(offer_payload("content-1")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        let body = parse(&body);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn second_response_is_a_bad_request() {
        let app = marketplace_app(Arc::new(FixedLayoutRenderer));

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/offers",
            Some(offer_payload("content-1")),
        )
        .await;
        let offer_id = parse(&body)["data"]["id"]
            .as_str()
            .expect("offer id")
            .to_string();

        let accept_uri = format!("/api/v1/offers/{offer_id}/accept");
        let (status, _) = send(&app, "POST", &accept_uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "POST", &accept_uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = parse(&body);
        assert!(body["message"]
            .as_str()
            .expect("message")
            .contains("accepted"));
    }

    #[tokio::test]
    async fn pdf_download_is_unavailable_until_rendered() {
        struct OfflineRenderer;
        impl LoiRenderer for OfflineRenderer {
            fn render(
                &self,
                _loi: &shortdeal::marketplace::loi::LoiRecord,
                _generated_at: chrono::DateTime<chrono::Utc>,
            ) -> Result<shortdeal::marketplace::loi::RenderedDocument, RenderError> {
                Err(RenderError::Unavailable("pdf engine offline".to_string()))
            }
        }

        let app = marketplace_app(Arc::new(OfflineRenderer));

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/offers",
            Some(offer_payload("content-1")),
        )
        .await;
        let offer_id = parse(&body)["data"]["id"]
            .as_str()
            .expect("offer id")
            .to_string();

        let (_, body) = send(
            &app,
            "POST",
            &format!("/api/v1/offers/{offer_id}/accept"),
            Some(json!({})),
        )
        .await;
        let body = parse(&body);
        assert_eq!(body["data"]["loi"]["document_ready"], json!(false));
        let loi_id = body["data"]["loi"]["id"].as_str().expect("loi id").to_string();

        let (status, body) = send(&app, "GET", &format!("/api/v1/loi/{loi_id}/pdf"), None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let body = parse(&body);
        assert_eq!(body["error"]["code"], json!("PDF_GENERATING"));
    }

    #[tokio::test]
    async fn render_endpoint_repairs_a_failed_document() {
        struct RecoveringRenderer {
            attempts: std::sync::Mutex<u32>,
        }
        impl LoiRenderer for RecoveringRenderer {
            fn render(
                &self,
                loi: &shortdeal::marketplace::loi::LoiRecord,
                generated_at: chrono::DateTime<chrono::Utc>,
            ) -> Result<shortdeal::marketplace::loi::RenderedDocument, RenderError> {
                let mut attempts = self.attempts.lock().expect("attempt counter poisoned");
                *attempts += 1;
                if *attempts == 1 {
                    return Err(RenderError::Unavailable("pdf engine offline".to_string()));
                }
                FixedLayoutRenderer.render(loi, generated_at)
            }
        }

        let app = marketplace_app(Arc::new(RecoveringRenderer {
            attempts: std::sync::Mutex::new(0),
        }));

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/offers",
            Some(offer_payload("content-1")),
        )
        .await;
        let offer_id = parse(&body)["data"]["id"]
            .as_str()
            .expect("offer id")
            .to_string();

        let (_, body) = send(
            &app,
            "POST",
            &format!("/api/v1/offers/{offer_id}/accept"),
            Some(json!({})),
        )
        .await;
        let body = parse(&body);
        assert_eq!(body["data"]["loi"]["document_ready"], json!(false));
        let loi_id = body["data"]["loi"]["id"].as_str().expect("loi id").to_string();

        let (status, body) = send(&app, "POST", &format!("/api/v1/loi/{loi_id}/render"), None).await;
        assert_eq!(status, StatusCode::OK);
        let body = parse(&body);
        assert_eq!(body["data"]["document_ready"], json!(true));

        let (status, _) = send(&app, "GET", &format!("/api/v1/loi/{loi_id}/pdf"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn loi_listing_requires_a_party() {
        let app = marketplace_app(Arc::new(FixedLayoutRenderer));
        let (status, _) = send(&app, "GET", "/api/v1/loi", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "GET", "/api/v1/loi?party=acme-buyer", None).await;
        assert_eq!(status, StatusCode::OK);
        let body = parse(&body);
        assert_eq!(body["data"], json!([]));
    }
}
