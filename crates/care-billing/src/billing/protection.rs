use thiserror::Error;

use super::domain::{CommissionBreakdown, ExpertId, ExpertPlan, OrganizationFeeConfig};
use super::engine::CommissionError;
use super::rates::{MarketingFeeBand, RateTable, BPS_DENOMINATOR};

/// Reasons an organization's proposed marketing-fee change is refused.
#[derive(Debug, Error)]
pub enum FeeChangeError {
    #[error(
        "proposed marketing fee of {proposed_bps} bps sits outside the {minimum_bps}-{maximum_bps} bps band"
    )]
    OutsideAllowedBand {
        proposed_bps: u16,
        minimum_bps: u16,
        maximum_bps: u16,
    },
    #[error("fee change would violate protections for expert {}", .expert_id.0)]
    ExpertProtection {
        expert_id: ExpertId,
        #[source]
        source: CommissionError,
    },
}

/// Verifies a computed breakdown against the organization's protection limits.
///
/// The share floor compares actual cent amounts so rounding in the payee's
/// favor counts for them; the combined-fee ceiling compares nominal rates and
/// applies even when the gross amount is zero.
pub(crate) fn check_breakdown(
    breakdown: &CommissionBreakdown,
    config: &OrganizationFeeConfig,
) -> Result<(), CommissionError> {
    if breakdown.gross_amount_cents > 0 {
        let net = u128::from(breakdown.payee_net_cents);
        let gross = u128::from(breakdown.gross_amount_cents);
        let floor = u128::from(config.expert_minimum_share_bps);

        if net * BPS_DENOMINATOR < gross * floor {
            let actual_bps = (net * BPS_DENOMINATOR / gross) as u32;
            return Err(CommissionError::PayeeShareBelowMinimum {
                actual_bps,
                required_bps: config.expert_minimum_share_bps,
            });
        }
    }

    let combined = breakdown.combined_fee_bps();
    if combined > u32::from(config.combined_fee_maximum_bps) {
        return Err(CommissionError::CombinedFeeExceedsMaximum {
            actual_bps: combined,
            maximum_bps: config.combined_fee_maximum_bps,
        });
    }

    Ok(())
}

/// Validates a proposed marketing fee for an organization's whole roster.
///
/// The change is all-or-nothing: the proposed rate must sit inside the
/// allowed band and must leave every affiliated expert's protections intact
/// at the rate level, or the first violation rejects the entire change.
pub fn validate_fee_change(
    proposed: &OrganizationFeeConfig,
    band: &MarketingFeeBand,
    rates: &RateTable,
    expert_plans: &[ExpertPlan],
) -> Result<(), FeeChangeError> {
    if !band.contains(proposed.marketing_fee_bps) {
        return Err(FeeChangeError::OutsideAllowedBand {
            proposed_bps: proposed.marketing_fee_bps,
            minimum_bps: band.minimum_bps,
            maximum_bps: band.maximum_bps,
        });
    }

    for plan in expert_plans {
        check_rates_for_plan(proposed, rates, plan).map_err(|source| {
            FeeChangeError::ExpertProtection {
                expert_id: plan.expert_id.clone(),
                source,
            }
        })?;
    }

    Ok(())
}

fn check_rates_for_plan(
    proposed: &OrganizationFeeConfig,
    rates: &RateTable,
    plan: &ExpertPlan,
) -> Result<(), CommissionError> {
    let platform_bps = rates
        .platform_fee_bps(plan.tier, plan.plan_type)
        .ok_or(CommissionError::UnknownPlanConfiguration {
            tier: plan.tier,
            plan_type: plan.plan_type,
        })?;

    let combined = u32::from(platform_bps) + u32::from(proposed.marketing_fee_bps);
    let payee_share = (BPS_DENOMINATOR as u32).saturating_sub(combined);

    if payee_share < u32::from(proposed.expert_minimum_share_bps) {
        return Err(CommissionError::PayeeShareBelowMinimum {
            actual_bps: payee_share,
            required_bps: proposed.expert_minimum_share_bps,
        });
    }

    if combined > u32::from(proposed.combined_fee_maximum_bps) {
        return Err(CommissionError::CombinedFeeExceedsMaximum {
            actual_bps: combined,
            maximum_bps: proposed.combined_fee_maximum_bps,
        });
    }

    Ok(())
}
