use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{Booking, BookingId, CommissionBreakdown, ExpertId, OrganizationId};

/// Lifecycle of a recorded settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Recorded,
    PayoutQueued,
}

impl SettlementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SettlementStatus::Recorded => "recorded",
            SettlementStatus::PayoutQueued => "payout_queued",
        }
    }
}

/// A settled booking: the captured snapshot plus its computed breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub booking: Booking,
    pub breakdown: CommissionBreakdown,
    pub status: SettlementStatus,
    pub settled_at: DateTime<Utc>,
}

impl SettlementRecord {
    pub fn view(&self) -> SettlementView {
        SettlementView {
            booking_id: self.booking.booking_id.clone(),
            payee_id: self.booking.payee_id.clone(),
            organization_id: self.booking.organization_id.clone(),
            status: self.status.label(),
            currency: self.breakdown.currency.clone(),
            gross_amount_cents: self.breakdown.gross_amount_cents,
            platform_fee_bps: self.breakdown.platform_fee_bps,
            platform_fee_cents: self.breakdown.platform_fee_cents,
            organization_fee_bps: self.breakdown.organization_fee_bps,
            organization_fee_cents: self.breakdown.organization_fee_cents,
            payee_net_cents: self.breakdown.payee_net_cents,
            settled_at: self.settled_at,
        }
    }

    pub fn payout_instruction(&self) -> PayoutInstruction {
        PayoutInstruction {
            booking_id: self.booking.booking_id.clone(),
            payee_id: self.booking.payee_id.clone(),
            organization_id: self.booking.organization_id.clone(),
            currency: self.breakdown.currency.clone(),
            payee_net_cents: self.breakdown.payee_net_cents,
            organization_fee_cents: self.breakdown.organization_fee_cents,
            platform_fee_cents: self.breakdown.platform_fee_cents,
        }
    }
}

/// Storage boundary for settlements.
///
/// `insert` is the idempotency gate: a second insert for the same booking id
/// must return [`RepositoryError::Conflict`] and leave the stored record
/// untouched.
pub trait SettlementRepository: Send + Sync {
    fn insert(&self, record: SettlementRecord) -> Result<SettlementRecord, RepositoryError>;
    fn update(&self, record: SettlementRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, booking_id: &BookingId) -> Result<Option<SettlementRecord>, RepositoryError>;
    fn recent(&self, limit: usize) -> Result<Vec<SettlementRecord>, RepositoryError>;
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("settlement already recorded for this booking")]
    Conflict,
    #[error("settlement not found")]
    NotFound,
    #[error("settlement store unavailable: {0}")]
    Unavailable(String),
}

/// Amounts to disburse for one settled booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutInstruction {
    pub booking_id: BookingId,
    pub payee_id: ExpertId,
    pub organization_id: Option<OrganizationId>,
    pub currency: String,
    pub payee_net_cents: u64,
    pub organization_fee_cents: u64,
    pub platform_fee_cents: u64,
}

/// Downstream payout queue boundary.
pub trait PayoutNotifier: Send + Sync {
    fn queue(&self, instruction: PayoutInstruction) -> Result<(), NotifyError>;
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("payout queue unreachable: {0}")]
    Transport(String),
}

/// Flattened settlement representation returned by the HTTP surface.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementView {
    pub booking_id: BookingId,
    pub payee_id: ExpertId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<OrganizationId>,
    pub status: &'static str,
    pub currency: String,
    pub gross_amount_cents: u64,
    pub platform_fee_bps: u16,
    pub platform_fee_cents: u64,
    pub organization_fee_bps: u16,
    pub organization_fee_cents: u64,
    pub payee_net_cents: u64,
    pub settled_at: DateTime<Utc>,
}
