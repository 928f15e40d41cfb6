use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use care_billing::billing::{
    billing_router, PayoutNotifier, SettlementRepository, SettlementService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_billing_routes<R, N>(service: Arc<SettlementService<R, N>>) -> axum::Router
where
    R: SettlementRepository + 'static,
    N: PayoutNotifier + 'static,
{
    billing_router(service)
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
    use crate::infra::{InMemoryPayoutNotifier, InMemorySettlementRepository};
    use care_billing::billing::PricingConfig;
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        let repository = Arc::new(InMemorySettlementRepository::default());
        let payouts = Arc::new(InMemoryPayoutNotifier::default());
        let service = Arc::new(SettlementService::new(
            repository,
            payouts,
            PricingConfig::standard(),
        ));
        with_billing_routes(service)
    }

    fn settle_payload() -> serde_json::Value {
        json!({
            "booking": {
                "booking_id": "bk-1001",
                "payee_id": "exp-100",
                "organization_id": null,
                "gross_amount_cents": 10_000,
                "currency": "EUR",
                "captured_at": "2025-11-03T09:30:00Z"
            },
            "plan": {
                "expert_id": "exp-100",
                "tier": "top",
                "plan_type": "annual"
            }
        })
    }

    async fn read_payload(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body is readable");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn composed_router_settles_and_round_trips() {
        let router = build_router();

        let response = router
            .clone()
            .oneshot(
                axum::http::Request::post("/api/v1/billing/settlements")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(settle_payload().to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(
                axum::http::Request::get("/api/v1/billing/settlements/bk-1001")
                    .body(axum::body::Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_payload(response).await;
        assert_eq!(payload.get("payee_net_cents"), Some(&json!(9_200)));
        assert_eq!(payload.get("status"), Some(&json!("payout_queued")));
    }

    #[tokio::test]
    async fn composed_router_previews_without_recording() {
        let repository = Arc::new(InMemorySettlementRepository::default());
        let payouts = Arc::new(InMemoryPayoutNotifier::default());
        let service = Arc::new(SettlementService::new(
            repository.clone(),
            payouts.clone(),
            PricingConfig::standard(),
        ));
        let router = with_billing_routes(service);

        let response = router
            .oneshot(
                axum::http::Request::post("/api/v1/billing/preview")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(settle_payload().to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_payload(response).await;
        assert_eq!(payload.get("platform_fee_cents"), Some(&json!(800)));
        assert!(repository
            .recent(10)
            .expect("repository is healthy")
            .is_empty());
        assert!(payouts.queued().is_empty());
    }
}
