use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{ExpertTier, PlanType};

/// Basis-point denominator; 10_000 bps is 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// One (tier, plan) slot in the platform rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub tier: ExpertTier,
    pub plan_type: PlanType,
    pub rate_bps: u16,
}

/// Platform commission rates per (tier, plan) pair.
///
/// Higher tier and longer commitment monotonically reduce the rate. The table
/// is injected configuration: a missing slot is a deployment bug surfaced as
/// `UnknownPlanConfiguration` by callers, never silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    entries: Vec<RateEntry>,
}

impl RateTable {
    pub fn new(entries: Vec<RateEntry>) -> Self {
        Self { entries }
    }

    /// The platform's published rate card.
    pub fn standard() -> Self {
        Self::new(vec![
            RateEntry {
                tier: ExpertTier::Community,
                plan_type: PlanType::Commission,
                rate_bps: 2_000,
            },
            RateEntry {
                tier: ExpertTier::Community,
                plan_type: PlanType::Monthly,
                rate_bps: 1_500,
            },
            RateEntry {
                tier: ExpertTier::Community,
                plan_type: PlanType::Annual,
                rate_bps: 1_400,
            },
            RateEntry {
                tier: ExpertTier::Top,
                plan_type: PlanType::Commission,
                rate_bps: 1_200,
            },
            RateEntry {
                tier: ExpertTier::Top,
                plan_type: PlanType::Monthly,
                rate_bps: 1_000,
            },
            RateEntry {
                tier: ExpertTier::Top,
                plan_type: PlanType::Annual,
                rate_bps: 800,
            },
        ])
    }

    pub fn platform_fee_bps(&self, tier: ExpertTier, plan_type: PlanType) -> Option<u16> {
        self.entries
            .iter()
            .find(|entry| entry.tier == tier && entry.plan_type == plan_type)
            .map(|entry| entry.rate_bps)
    }
}

/// Fixed subscription fees charged to experts on recurring plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPricing {
    pub monthly_fee_cents: u64,
    pub annual_fee_cents: u64,
}

impl SubscriptionPricing {
    pub fn standard() -> Self {
        Self {
            monthly_fee_cents: 2_999,
            annual_fee_cents: 29_990,
        }
    }

    /// Annualized cost of a plan; `None` for plans with no fixed fee.
    pub fn annual_cost_cents(&self, plan_type: PlanType) -> Option<u64> {
        match plan_type {
            PlanType::Commission => None,
            PlanType::Monthly => self.monthly_fee_cents.checked_mul(12),
            PlanType::Annual => Some(self.annual_fee_cents),
        }
    }
}

/// Range an organization may set its marketing fee within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketingFeeBand {
    pub minimum_bps: u16,
    pub maximum_bps: u16,
}

impl MarketingFeeBand {
    pub fn standard() -> Self {
        Self {
            minimum_bps: 1_000,
            maximum_bps: 2_500,
        }
    }

    pub fn contains(&self, rate_bps: u16) -> bool {
        rate_bps >= self.minimum_bps && rate_bps <= self.maximum_bps
    }
}

/// Minimum trailing performance before an expert is offered a plan change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub min_months_active: u32,
    pub min_average_monthly_revenue_cents: u64,
    pub min_completed_bookings: u32,
    pub min_average_rating: f32,
}

/// Per-tier eligibility requirements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityThresholds {
    pub community: TierThresholds,
    pub top: TierThresholds,
}

impl EligibilityThresholds {
    pub fn standard() -> Self {
        Self {
            community: TierThresholds {
                min_months_active: 3,
                min_average_monthly_revenue_cents: 16_000,
                min_completed_bookings: 15,
                min_average_rating: 4.0,
            },
            top: TierThresholds {
                min_months_active: 6,
                min_average_monthly_revenue_cents: 50_000,
                min_completed_bookings: 50,
                min_average_rating: 4.5,
            },
        }
    }

    pub fn for_tier(&self, tier: ExpertTier) -> TierThresholds {
        match tier {
            ExpertTier::Community => self.community,
            ExpertTier::Top => self.top,
        }
    }
}

/// Injected pricing configuration covering rates, subscription fees, the
/// marketing-fee band, and upgrade thresholds. Immutable for the duration of
/// any single computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub rates: RateTable,
    pub subscription: SubscriptionPricing,
    pub marketing_band: MarketingFeeBand,
    pub thresholds: EligibilityThresholds,
}

impl PricingConfig {
    pub fn standard() -> Self {
        Self {
            rates: RateTable::standard(),
            subscription: SubscriptionPricing::standard(),
            marketing_band: MarketingFeeBand::standard(),
            thresholds: EligibilityThresholds::standard(),
        }
    }
}

/// Fee owed on `amount_cents` at `rate_bps`, rounded half to even.
///
/// Widens through u128 so the product never overflows; rates above 100%
/// saturate at `u64::MAX`, which downstream subtraction rejects.
pub fn fee_at_rate(amount_cents: u64, rate_bps: u16) -> u64 {
    let product = u128::from(amount_cents) * u128::from(rate_bps);
    let quotient = product / BPS_DENOMINATOR;
    let remainder = product % BPS_DENOMINATOR;

    let rounded = match (remainder * 2).cmp(&BPS_DENOMINATOR) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 1 => quotient + 1,
        Ordering::Equal => quotient,
    };

    u64::try_from(rounded).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_rounds_half_to_even() {
        // 1% of 250 is 2.5: ties round toward the even quotient.
        assert_eq!(fee_at_rate(250, 100), 2);
        // 1% of 350 is 3.5: the odd quotient rounds up.
        assert_eq!(fee_at_rate(350, 100), 4);
        // 1% of 50 is 0.5.
        assert_eq!(fee_at_rate(50, 100), 0);
        // 1% of 150 is 1.5.
        assert_eq!(fee_at_rate(150, 100), 2);
        // Non-tie remainders round to nearest.
        assert_eq!(fee_at_rate(126, 100), 1);
        assert_eq!(fee_at_rate(176, 100), 2);
    }

    #[test]
    fn fee_at_full_rate_returns_amount_exactly() {
        assert_eq!(fee_at_rate(u64::MAX, 10_000), u64::MAX);
        assert_eq!(fee_at_rate(987_654_321, 10_000), 987_654_321);
    }

    #[test]
    fn fee_on_zero_amount_is_zero() {
        for rate in [0, 800, 2_000, 10_000] {
            assert_eq!(fee_at_rate(0, rate), 0);
        }
    }

    #[test]
    fn standard_table_orders_rates_by_tier_and_commitment() {
        let table = RateTable::standard();
        let rate = |tier, plan| {
            table
                .platform_fee_bps(tier, plan)
                .expect("standard table is complete")
        };

        assert!(
            rate(ExpertTier::Community, PlanType::Commission)
                > rate(ExpertTier::Community, PlanType::Monthly)
        );
        assert!(
            rate(ExpertTier::Community, PlanType::Monthly)
                > rate(ExpertTier::Community, PlanType::Annual)
        );
        assert!(
            rate(ExpertTier::Community, PlanType::Annual)
                > rate(ExpertTier::Top, PlanType::Commission)
        );
        assert!(
            rate(ExpertTier::Top, PlanType::Commission) > rate(ExpertTier::Top, PlanType::Monthly)
        );
        assert!(rate(ExpertTier::Top, PlanType::Monthly) > rate(ExpertTier::Top, PlanType::Annual));
    }

    #[test]
    fn missing_table_entry_resolves_to_none() {
        let table = RateTable::new(vec![RateEntry {
            tier: ExpertTier::Top,
            plan_type: PlanType::Annual,
            rate_bps: 800,
        }]);

        assert_eq!(
            table.platform_fee_bps(ExpertTier::Top, PlanType::Annual),
            Some(800)
        );
        assert_eq!(
            table.platform_fee_bps(ExpertTier::Community, PlanType::Commission),
            None
        );
    }

    #[test]
    fn monthly_plan_annualizes_to_twelve_payments() {
        let pricing = SubscriptionPricing::standard();
        assert_eq!(
            pricing.annual_cost_cents(PlanType::Monthly),
            Some(12 * 2_999)
        );
        assert_eq!(pricing.annual_cost_cents(PlanType::Annual), Some(29_990));
        assert_eq!(pricing.annual_cost_cents(PlanType::Commission), None);
    }

    #[test]
    fn marketing_band_is_inclusive_at_both_edges() {
        let band = MarketingFeeBand::standard();
        assert!(band.contains(1_000));
        assert!(band.contains(2_500));
        assert!(!band.contains(999));
        assert!(!band.contains(2_501));
    }
}
