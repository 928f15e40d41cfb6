use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::billing::domain::{
    Booking, BookingId, ExpertId, ExpertPlan, ExpertTier, OrganizationFeeConfig, OrganizationId,
    PlanType,
};
use crate::billing::eligibility::TrailingMetrics;
use crate::billing::engine::CommissionEngine;
use crate::billing::rates::PricingConfig;
use crate::billing::repository::{
    NotifyError, PayoutInstruction, PayoutNotifier, RepositoryError, SettlementRecord,
    SettlementRepository,
};
use crate::billing::{billing_router, SettlementService};

pub(super) fn booking(id: &str, gross_amount_cents: u64) -> Booking {
    Booking {
        booking_id: BookingId(id.to_string()),
        payee_id: ExpertId("exp-100".to_string()),
        organization_id: None,
        gross_amount_cents,
        currency: "EUR".to_string(),
        captured_at: Utc
            .with_ymd_and_hms(2025, 11, 3, 9, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn organization_booking(id: &str, gross_amount_cents: u64) -> Booking {
    let mut booking = booking(id, gross_amount_cents);
    booking.organization_id = Some(OrganizationId("org-lisbon".to_string()));
    booking
}

pub(super) fn plan(tier: ExpertTier, plan_type: PlanType) -> ExpertPlan {
    ExpertPlan {
        expert_id: ExpertId("exp-100".to_string()),
        tier,
        plan_type,
    }
}

pub(super) fn org_config(marketing_fee_bps: u16) -> OrganizationFeeConfig {
    OrganizationFeeConfig::with_defaults(
        OrganizationId("org-lisbon".to_string()),
        marketing_fee_bps,
    )
}

pub(super) fn engine() -> CommissionEngine {
    CommissionEngine::new(PricingConfig::standard())
}

pub(super) fn healthy_metrics() -> TrailingMetrics {
    TrailingMetrics {
        months_active: 3,
        average_monthly_revenue_cents: 20_000,
        completed_bookings: 20,
        average_rating: 4.2,
    }
}

pub(super) fn build_service() -> (
    SettlementService<MemoryRepository, MemoryPayouts>,
    Arc<MemoryRepository>,
    Arc<MemoryPayouts>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let payouts = Arc::new(MemoryPayouts::default());
    let service = SettlementService::new(
        repository.clone(),
        payouts.clone(),
        PricingConfig::standard(),
    );
    (service, repository, payouts)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<BookingId, SettlementRecord>>>,
}

impl SettlementRepository for MemoryRepository {
    fn insert(&self, record: SettlementRecord) -> Result<SettlementRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.booking.booking_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.booking.booking_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: SettlementRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.booking.booking_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, booking_id: &BookingId) -> Result<Option<SettlementRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(booking_id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<SettlementRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<SettlementRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.settled_at.cmp(&a.settled_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPayouts {
    queued: Arc<Mutex<Vec<PayoutInstruction>>>,
}

impl MemoryPayouts {
    pub(super) fn queued(&self) -> Vec<PayoutInstruction> {
        self.queued.lock().expect("payout mutex poisoned").clone()
    }
}

impl PayoutNotifier for MemoryPayouts {
    fn queue(&self, instruction: PayoutInstruction) -> Result<(), NotifyError> {
        self.queued
            .lock()
            .expect("payout mutex poisoned")
            .push(instruction);
        Ok(())
    }
}

pub(super) struct ConflictRepository;

impl SettlementRepository for ConflictRepository {
    fn insert(&self, _record: SettlementRecord) -> Result<SettlementRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: SettlementRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _booking_id: &BookingId) -> Result<Option<SettlementRecord>, RepositoryError> {
        Ok(None)
    }

    fn recent(&self, _limit: usize) -> Result<Vec<SettlementRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl SettlementRepository for UnavailableRepository {
    fn insert(&self, _record: SettlementRecord) -> Result<SettlementRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: SettlementRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _booking_id: &BookingId) -> Result<Option<SettlementRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<SettlementRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct FailingPayouts;

impl PayoutNotifier for FailingPayouts {
    fn queue(&self, _instruction: PayoutInstruction) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("payout queue offline".to_string()))
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn billing_router_with_service(
    service: SettlementService<MemoryRepository, MemoryPayouts>,
) -> axum::Router {
    billing_router(Arc::new(service))
}
