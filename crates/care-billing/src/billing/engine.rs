use thiserror::Error;

use super::domain::{
    Booking, CommissionBreakdown, ExpertPlan, ExpertTier, OrganizationFeeConfig, PlanType,
};
use super::protection;
use super::rates::{fee_at_rate, PricingConfig};

/// Reasons a commission computation can be refused.
#[derive(Debug, Error)]
pub enum CommissionError {
    #[error("no platform rate configured for {tier:?} tier on {plan_type:?} plan")]
    UnknownPlanConfiguration {
        tier: ExpertTier,
        plan_type: PlanType,
    },
    #[error("fees of {total_fee_cents} cents exceed the gross amount of {gross_amount_cents} cents")]
    NegativePayeeShare {
        gross_amount_cents: u64,
        total_fee_cents: u64,
    },
    #[error("payee share of {actual_bps} bps falls below the protected minimum of {required_bps} bps")]
    PayeeShareBelowMinimum { actual_bps: u32, required_bps: u16 },
    #[error("combined fees of {actual_bps} bps exceed the allowed maximum of {maximum_bps} bps")]
    CombinedFeeExceedsMaximum { actual_bps: u32, maximum_bps: u16 },
}

/// Splits a captured booking amount between platform, organization, and payee.
///
/// Pure computation over the injected [`PricingConfig`]: no storage, no
/// clock, no network. Every cent of the gross amount lands in exactly one of
/// the three buckets.
#[derive(Debug, Clone)]
pub struct CommissionEngine {
    config: PricingConfig,
}

impl CommissionEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Computes the full fee breakdown for one booking.
    ///
    /// Pass the organization's fee config when the booking was sold through
    /// an organization; solo bookings carry no organization fee and skip the
    /// protection checks tied to one.
    pub fn compute(
        &self,
        booking: &Booking,
        plan: &ExpertPlan,
        organization: Option<&OrganizationFeeConfig>,
    ) -> Result<CommissionBreakdown, CommissionError> {
        let platform_fee_bps = self
            .config
            .rates
            .platform_fee_bps(plan.tier, plan.plan_type)
            .ok_or(CommissionError::UnknownPlanConfiguration {
                tier: plan.tier,
                plan_type: plan.plan_type,
            })?;

        let platform_fee_cents = fee_at_rate(booking.gross_amount_cents, platform_fee_bps);
        let (organization_fee_bps, organization_fee_cents) = match organization {
            Some(config) => (
                config.marketing_fee_bps,
                fee_at_rate(booking.gross_amount_cents, config.marketing_fee_bps),
            ),
            None => (0, 0),
        };

        let total_fee_cents = platform_fee_cents.saturating_add(organization_fee_cents);
        let payee_net_cents = booking
            .gross_amount_cents
            .checked_sub(total_fee_cents)
            .ok_or(CommissionError::NegativePayeeShare {
                gross_amount_cents: booking.gross_amount_cents,
                total_fee_cents,
            })?;

        let breakdown = CommissionBreakdown {
            gross_amount_cents: booking.gross_amount_cents,
            currency: booking.currency.clone(),
            platform_fee_bps,
            platform_fee_cents,
            organization_fee_bps,
            organization_fee_cents,
            payee_net_cents,
        };

        if let Some(config) = organization {
            protection::check_breakdown(&breakdown, config)?;
        }

        Ok(breakdown)
    }
}
