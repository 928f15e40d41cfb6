use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for captured bookings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

/// Identifier wrapper for service-providing experts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpertId(pub String);

/// Identifier wrapper for organizations that employ or represent experts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

/// Performance tier the marketplace assigns to an expert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertTier {
    Community,
    Top,
}

impl ExpertTier {
    pub const fn ordered() -> [Self; 2] {
        [Self::Community, Self::Top]
    }

    pub const fn label(self) -> &'static str {
        match self {
            ExpertTier::Community => "community",
            ExpertTier::Top => "top",
        }
    }
}

/// How an expert pays the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Commission,
    Monthly,
    Annual,
}

impl PlanType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Commission, Self::Monthly, Self::Annual]
    }

    pub const fn label(self) -> &'static str {
        match self {
            PlanType::Commission => "commission",
            PlanType::Monthly => "monthly",
            PlanType::Annual => "annual",
        }
    }

    pub const fn is_subscription(self) -> bool {
        matches!(self, PlanType::Monthly | PlanType::Annual)
    }
}

/// Payment capture handed to the billing engine exactly once per booking.
///
/// Amounts are integers in minor currency units; the engine never touches
/// floating-point money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub payee_id: ExpertId,
    pub organization_id: Option<OrganizationId>,
    pub gross_amount_cents: u64,
    pub currency: String,
    pub captured_at: DateTime<Utc>,
}

/// Billing arrangement an expert currently holds with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertPlan {
    pub expert_id: ExpertId,
    pub tier: ExpertTier,
    pub plan_type: PlanType,
}

pub const DEFAULT_EXPERT_MINIMUM_SHARE_BPS: u16 = 6_000;
pub const DEFAULT_COMBINED_FEE_MAXIMUM_BPS: u16 = 4_000;

/// Fee settings owned by one organization, snapshotted per computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationFeeConfig {
    pub organization_id: OrganizationId,
    pub marketing_fee_bps: u16,
    pub expert_minimum_share_bps: u16,
    pub combined_fee_maximum_bps: u16,
}

impl OrganizationFeeConfig {
    /// Organization config carrying the platform's standard protection bounds.
    pub fn with_defaults(organization_id: OrganizationId, marketing_fee_bps: u16) -> Self {
        Self {
            organization_id,
            marketing_fee_bps,
            expert_minimum_share_bps: DEFAULT_EXPERT_MINIMUM_SHARE_BPS,
            combined_fee_maximum_bps: DEFAULT_COMBINED_FEE_MAXIMUM_BPS,
        }
    }
}

/// Validated split of a single booking's gross amount.
///
/// Write-once and historical: refunds and reversals are modeled as new
/// compensating records, never edits to an existing breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub gross_amount_cents: u64,
    pub currency: String,
    pub platform_fee_bps: u16,
    pub platform_fee_cents: u64,
    pub organization_fee_bps: u16,
    pub organization_fee_cents: u64,
    pub payee_net_cents: u64,
}

impl CommissionBreakdown {
    pub fn combined_fee_bps(&self) -> u32 {
        u32::from(self.platform_fee_bps) + u32::from(self.organization_fee_bps)
    }

    pub fn total_fee_cents(&self) -> u64 {
        self.platform_fee_cents + self.organization_fee_cents
    }
}
