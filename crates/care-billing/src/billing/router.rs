use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    Booking, BookingId, ExpertPlan, OrganizationFeeConfig, OrganizationId, PlanType,
    DEFAULT_COMBINED_FEE_MAXIMUM_BPS, DEFAULT_EXPERT_MINIMUM_SHARE_BPS,
};
use super::eligibility::{EligibilityError, TrailingMetrics};
use super::engine::CommissionError;
use super::repository::{PayoutNotifier, RepositoryError, SettlementRepository};
use super::service::{SettlementError, SettlementService};

#[derive(Debug, Serialize, Deserialize)]
pub struct SettleRequest {
    pub booking: Booking,
    pub plan: ExpertPlan,
    #[serde(default)]
    pub organization: Option<OrganizationFeeConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarketingFeeChangeRequest {
    pub marketing_fee_bps: u16,
    #[serde(default)]
    pub expert_minimum_share_bps: Option<u16>,
    #[serde(default)]
    pub combined_fee_maximum_bps: Option<u16>,
    pub expert_plans: Vec<ExpertPlan>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpgradeAssessmentRequest {
    pub plan: ExpertPlan,
    #[serde(default)]
    pub alternate_plan: Option<PlanType>,
    pub metrics: TrailingMetrics,
}

/// Router builder exposing HTTP endpoints for settlement and fee governance.
pub fn billing_router<R, N>(service: Arc<SettlementService<R, N>>) -> Router
where
    R: SettlementRepository + 'static,
    N: PayoutNotifier + 'static,
{
    Router::new()
        .route("/api/v1/billing/settlements", post(settle_handler::<R, N>))
        .route(
            "/api/v1/billing/settlements/:booking_id",
            get(settlement_handler::<R, N>),
        )
        .route(
            "/api/v1/billing/organizations/:organization_id/marketing-fee",
            post(marketing_fee_handler::<R, N>),
        )
        .route(
            "/api/v1/billing/upgrade-eligibility",
            post(eligibility_handler::<R, N>),
        )
        .route("/api/v1/billing/preview", post(preview_handler::<R, N>))
        .with_state(service)
}

pub(crate) async fn settle_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    axum::Json(request): axum::Json<SettleRequest>,
) -> Response
where
    R: SettlementRepository + 'static,
    N: PayoutNotifier + 'static,
{
    match service.settle_booking(request.booking, &request.plan, request.organization.as_ref()) {
        Ok(record) => {
            let view = record.view();
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(SettlementError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "booking already settled",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(
            error @ SettlementError::Commission(CommissionError::UnknownPlanConfiguration { .. }),
        ) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(error @ SettlementError::Commission(_)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(
            error @ (SettlementError::PlanMismatch { .. }
            | SettlementError::MissingOrganizationConfig { .. }
            | SettlementError::OrganizationMismatch { .. }
            | SettlementError::UnexpectedOrganizationConfig { .. }),
        ) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn preview_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    axum::Json(request): axum::Json<SettleRequest>,
) -> Response
where
    R: SettlementRepository + 'static,
    N: PayoutNotifier + 'static,
{
    match service.preview(&request.booking, &request.plan, request.organization.as_ref()) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(
            error @ SettlementError::Commission(CommissionError::UnknownPlanConfiguration { .. }),
        ) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(error @ SettlementError::Commission(_)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(
            error @ (SettlementError::PlanMismatch { .. }
            | SettlementError::MissingOrganizationConfig { .. }
            | SettlementError::OrganizationMismatch { .. }
            | SettlementError::UnexpectedOrganizationConfig { .. }),
        ) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn settlement_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    Path(booking_id): Path<String>,
) -> Response
where
    R: SettlementRepository + 'static,
    N: PayoutNotifier + 'static,
{
    let id = BookingId(booking_id);
    match service.settlement(&id) {
        Ok(record) => {
            let view = record.view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(SettlementError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "settlement not found",
                "booking_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn marketing_fee_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    Path(organization_id): Path<String>,
    axum::Json(request): axum::Json<MarketingFeeChangeRequest>,
) -> Response
where
    R: SettlementRepository + 'static,
    N: PayoutNotifier + 'static,
{
    let proposed = OrganizationFeeConfig {
        organization_id: OrganizationId(organization_id),
        marketing_fee_bps: request.marketing_fee_bps,
        expert_minimum_share_bps: request
            .expert_minimum_share_bps
            .unwrap_or(DEFAULT_EXPERT_MINIMUM_SHARE_BPS),
        combined_fee_maximum_bps: request
            .combined_fee_maximum_bps
            .unwrap_or(DEFAULT_COMBINED_FEE_MAXIMUM_BPS),
    };

    match service.validate_marketing_fee(&proposed, &request.expert_plans) {
        Ok(()) => {
            let payload = json!({
                "organization_id": proposed.organization_id.0,
                "marketing_fee_bps": proposed.marketing_fee_bps,
                "status": "accepted",
                "experts_checked": request.expert_plans.len(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn eligibility_handler<R, N>(
    State(service): State<Arc<SettlementService<R, N>>>,
    axum::Json(request): axum::Json<UpgradeAssessmentRequest>,
) -> Response
where
    R: SettlementRepository + 'static,
    N: PayoutNotifier + 'static,
{
    let alternate = request.alternate_plan.unwrap_or(PlanType::Annual);
    match service.assess_upgrade(&request.plan, alternate, &request.metrics) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(error @ EligibilityError::Commission(_)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
