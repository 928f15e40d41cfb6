use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::{ExpertPlan, PlanType};
use super::engine::CommissionError;
use super::rates::{fee_at_rate, PricingConfig, TierThresholds};

/// Trailing performance metrics for one expert, gathered upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingMetrics {
    pub months_active: u32,
    pub average_monthly_revenue_cents: u64,
    pub completed_bookings: u32,
    pub average_rating: f32,
}

/// A threshold the expert has not met yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    MonthsActive,
    AverageMonthlyRevenue,
    CompletedBookings,
    AverageRating,
}

impl RequirementKind {
    pub const fn label(self) -> &'static str {
        match self {
            RequirementKind::MonthsActive => "months_active",
            RequirementKind::AverageMonthlyRevenue => "average_monthly_revenue",
            RequirementKind::CompletedBookings => "completed_bookings",
            RequirementKind::AverageRating => "average_rating",
        }
    }
}

/// Projected annual savings from moving off the commission plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub alternate_plan: PlanType,
    pub projected_annual_revenue_cents: u64,
    pub projected_annual_commission_cents: u64,
    pub alternate_plan_annual_fee_cents: u64,
    pub projected_savings_cents: i64,
    pub savings_percentage: f64,
}

/// Outcome of an upgrade eligibility assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeAssessment {
    Eligible { savings: SavingsProjection },
    NotYetEligible {
        metrics: TrailingMetrics,
        requirements: TierThresholds,
        unmet: Vec<RequirementKind>,
    },
}

impl UpgradeAssessment {
    pub fn is_eligible(&self) -> bool {
        matches!(self, UpgradeAssessment::Eligible { .. })
    }

    /// One-line summary suitable for operator-facing output.
    pub fn summary(&self) -> String {
        match self {
            UpgradeAssessment::Eligible { savings } => format!(
                "eligible: projected savings of {} cents per year ({:.1}% of commission)",
                savings.projected_savings_cents, savings.savings_percentage
            ),
            UpgradeAssessment::NotYetEligible { unmet, .. } => {
                let missing: Vec<&str> = unmet.iter().map(|kind| kind.label()).collect();
                format!("not yet eligible: below threshold on {}", missing.join(", "))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("trailing metrics rejected: {detail}")]
    InvalidMetricsInput { detail: String },
    #[error("expert is on the {current:?} plan, only commission plans can be assessed")]
    NotOnCommissionPlan { current: PlanType },
    #[error("alternate plan {alternate:?} carries no subscription fee to compare against")]
    AlternateNotSubscription { alternate: PlanType },
    #[error(transparent)]
    Commission(#[from] CommissionError),
}

/// Decides whether a commission-plan expert should be offered a subscription.
///
/// All four trailing thresholds for the expert's tier must hold before any
/// savings projection is produced.
#[derive(Debug, Clone)]
pub struct UpgradeEvaluator {
    config: PricingConfig,
}

impl UpgradeEvaluator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn assess(
        &self,
        plan: &ExpertPlan,
        alternate: PlanType,
        metrics: &TrailingMetrics,
    ) -> Result<UpgradeAssessment, EligibilityError> {
        validate_metrics(metrics)?;

        if plan.plan_type != PlanType::Commission {
            return Err(EligibilityError::NotOnCommissionPlan {
                current: plan.plan_type,
            });
        }

        let alternate_fee_cents = self
            .config
            .subscription
            .annual_cost_cents(alternate)
            .ok_or(EligibilityError::AlternateNotSubscription { alternate })?;

        let requirements = self.config.thresholds.for_tier(plan.tier);
        let unmet = unmet_requirements(metrics, &requirements);
        if !unmet.is_empty() {
            return Ok(UpgradeAssessment::NotYetEligible {
                metrics: *metrics,
                requirements,
                unmet,
            });
        }

        let commission_bps = self
            .config
            .rates
            .platform_fee_bps(plan.tier, PlanType::Commission)
            .ok_or(CommissionError::UnknownPlanConfiguration {
                tier: plan.tier,
                plan_type: PlanType::Commission,
            })?;

        let savings = project_savings(metrics, commission_bps, alternate, alternate_fee_cents)?;
        Ok(UpgradeAssessment::Eligible { savings })
    }
}

fn validate_metrics(metrics: &TrailingMetrics) -> Result<(), EligibilityError> {
    if !metrics.average_rating.is_finite() {
        return Err(EligibilityError::InvalidMetricsInput {
            detail: "average rating is not a finite number".into(),
        });
    }
    if !(0.0..=5.0).contains(&metrics.average_rating) {
        return Err(EligibilityError::InvalidMetricsInput {
            detail: format!(
                "average rating {} outside the 0.0-5.0 scale",
                metrics.average_rating
            ),
        });
    }
    Ok(())
}

fn unmet_requirements(
    metrics: &TrailingMetrics,
    requirements: &TierThresholds,
) -> Vec<RequirementKind> {
    let mut unmet = Vec::new();
    if metrics.months_active < requirements.min_months_active {
        unmet.push(RequirementKind::MonthsActive);
    }
    if metrics.average_monthly_revenue_cents < requirements.min_average_monthly_revenue_cents {
        unmet.push(RequirementKind::AverageMonthlyRevenue);
    }
    if metrics.completed_bookings < requirements.min_completed_bookings {
        unmet.push(RequirementKind::CompletedBookings);
    }
    if metrics.average_rating < requirements.min_average_rating {
        unmet.push(RequirementKind::AverageRating);
    }
    unmet
}

fn project_savings(
    metrics: &TrailingMetrics,
    commission_bps: u16,
    alternate: PlanType,
    alternate_fee_cents: u64,
) -> Result<SavingsProjection, EligibilityError> {
    let annual_revenue_cents = metrics
        .average_monthly_revenue_cents
        .checked_mul(12)
        .ok_or_else(|| EligibilityError::InvalidMetricsInput {
            detail: "average monthly revenue too large to annualize".into(),
        })?;

    let annual_commission_cents = fee_at_rate(annual_revenue_cents, commission_bps);

    let savings = i128::from(annual_commission_cents) - i128::from(alternate_fee_cents);
    let projected_savings_cents =
        savings.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;

    let savings_percentage = if annual_commission_cents == 0 {
        0.0
    } else {
        projected_savings_cents as f64 / annual_commission_cents as f64 * 100.0
    };

    Ok(SavingsProjection {
        alternate_plan: alternate,
        projected_annual_revenue_cents: annual_revenue_cents,
        projected_annual_commission_cents: annual_commission_cents,
        alternate_plan_annual_fee_cents: alternate_fee_cents,
        projected_savings_cents,
        savings_percentage,
    })
}
