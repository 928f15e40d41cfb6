use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use super::domain::{
    Booking, BookingId, CommissionBreakdown, ExpertId, ExpertPlan, OrganizationFeeConfig,
    OrganizationId, PlanType,
};
use super::eligibility::{
    EligibilityError, TrailingMetrics, UpgradeAssessment, UpgradeEvaluator,
};
use super::engine::{CommissionEngine, CommissionError};
use super::protection::{self, FeeChangeError};
use super::repository::{
    NotifyError, PayoutNotifier, RepositoryError, SettlementRecord, SettlementRepository,
    SettlementStatus,
};
use super::rates::PricingConfig;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("booking payee {} does not match plan expert {}", .payee_id.0, .plan_expert_id.0)]
    PlanMismatch {
        payee_id: ExpertId,
        plan_expert_id: ExpertId,
    },
    #[error("booking references organization {} but no fee config was supplied", .organization_id.0)]
    MissingOrganizationConfig { organization_id: OrganizationId },
    #[error(
        "booking organization {} does not match fee config organization {}",
        .booking_organization_id.0,
        .config_organization_id.0
    )]
    OrganizationMismatch {
        booking_organization_id: OrganizationId,
        config_organization_id: OrganizationId,
    },
    #[error("fee config for organization {} supplied for a solo booking", .config_organization_id.0)]
    UnexpectedOrganizationConfig { config_organization_id: OrganizationId },
    #[error(transparent)]
    Commission(#[from] CommissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Payout(#[from] NotifyError),
}

/// Orchestrates settlement of captured bookings.
///
/// Wraps the pure [`CommissionEngine`] with persistence and payout queueing.
/// Generic over the storage and notifier boundaries so tests can run against
/// in-memory fakes.
pub struct SettlementService<R, N> {
    engine: CommissionEngine,
    evaluator: UpgradeEvaluator,
    repository: Arc<R>,
    payouts: Arc<N>,
}

impl<R, N> SettlementService<R, N>
where
    R: SettlementRepository,
    N: PayoutNotifier,
{
    pub fn new(repository: Arc<R>, payouts: Arc<N>, config: PricingConfig) -> Self {
        Self {
            engine: CommissionEngine::new(config.clone()),
            evaluator: UpgradeEvaluator::new(config),
            repository,
            payouts,
        }
    }

    /// Computes a breakdown without persisting or queueing anything.
    pub fn preview(
        &self,
        booking: &Booking,
        plan: &ExpertPlan,
        organization: Option<&OrganizationFeeConfig>,
    ) -> Result<CommissionBreakdown, SettlementError> {
        check_snapshot_consistency(booking, plan, organization)?;
        self.compute(booking, plan, organization)
    }

    /// Settles one captured booking: computes the breakdown, records it, and
    /// queues the payout.
    ///
    /// A booking id that is already settled stops the flow at the repository
    /// with [`RepositoryError::Conflict`] and queues nothing.
    pub fn settle_booking(
        &self,
        booking: Booking,
        plan: &ExpertPlan,
        organization: Option<&OrganizationFeeConfig>,
    ) -> Result<SettlementRecord, SettlementError> {
        check_snapshot_consistency(&booking, plan, organization)?;
        let breakdown = self.compute(&booking, plan, organization)?;

        let record = SettlementRecord {
            booking,
            breakdown,
            status: SettlementStatus::Recorded,
            settled_at: Utc::now(),
        };
        let mut stored = self.repository.insert(record)?;

        self.payouts.queue(stored.payout_instruction())?;
        stored.status = SettlementStatus::PayoutQueued;
        self.repository.update(stored.clone())?;

        tracing::info!(
            booking_id = %stored.booking.booking_id.0,
            payee_net_cents = stored.breakdown.payee_net_cents,
            "settlement recorded and payout queued"
        );
        Ok(stored)
    }

    pub fn settlement(&self, booking_id: &BookingId) -> Result<SettlementRecord, SettlementError> {
        let record = self
            .repository
            .fetch(booking_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Validates a proposed marketing fee against the platform band and every
    /// supplied expert plan.
    pub fn validate_marketing_fee(
        &self,
        proposed: &OrganizationFeeConfig,
        expert_plans: &[ExpertPlan],
    ) -> Result<(), FeeChangeError> {
        let config = self.engine.config();
        protection::validate_fee_change(proposed, &config.marketing_band, &config.rates, expert_plans)
    }

    pub fn assess_upgrade(
        &self,
        plan: &ExpertPlan,
        alternate: PlanType,
        metrics: &TrailingMetrics,
    ) -> Result<UpgradeAssessment, EligibilityError> {
        self.evaluator.assess(plan, alternate, metrics)
    }

    fn compute(
        &self,
        booking: &Booking,
        plan: &ExpertPlan,
        organization: Option<&OrganizationFeeConfig>,
    ) -> Result<CommissionBreakdown, SettlementError> {
        self.engine
            .compute(booking, plan, organization)
            .map_err(|err| {
                if let CommissionError::UnknownPlanConfiguration { tier, plan_type } = &err {
                    tracing::error!(
                        booking_id = %booking.booking_id.0,
                        ?tier,
                        ?plan_type,
                        "platform rate table is missing an entry"
                    );
                }
                SettlementError::from(err)
            })
    }
}

/// Rejects a settlement request whose pieces disagree with each other.
///
/// The booking snapshot, the expert plan, and the optional organization fee
/// config all arrive from upstream; they must describe the same expert and
/// the same organization before any money math runs.
fn check_snapshot_consistency(
    booking: &Booking,
    plan: &ExpertPlan,
    organization: Option<&OrganizationFeeConfig>,
) -> Result<(), SettlementError> {
    if booking.payee_id != plan.expert_id {
        return Err(SettlementError::PlanMismatch {
            payee_id: booking.payee_id.clone(),
            plan_expert_id: plan.expert_id.clone(),
        });
    }

    match (&booking.organization_id, organization) {
        (Some(booking_org), Some(config)) if config.organization_id != *booking_org => {
            Err(SettlementError::OrganizationMismatch {
                booking_organization_id: booking_org.clone(),
                config_organization_id: config.organization_id.clone(),
            })
        }
        (Some(booking_org), None) => Err(SettlementError::MissingOrganizationConfig {
            organization_id: booking_org.clone(),
        }),
        (None, Some(config)) => Err(SettlementError::UnexpectedOrganizationConfig {
            config_organization_id: config.organization_id.clone(),
        }),
        _ => Ok(()),
    }
}
