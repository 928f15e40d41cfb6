//! Commission settlement, fee protection, and plan-upgrade assessment.
//!
//! The engine itself is pure arithmetic over an injected [`rates::PricingConfig`];
//! persistence and payout queueing sit behind the [`repository`] traits so the
//! same service drives production stores and in-memory test fakes alike.

pub mod domain;
pub(crate) mod eligibility;
pub(crate) mod engine;
pub mod import;
pub(crate) mod protection;
pub mod rates;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Booking, BookingId, CommissionBreakdown, ExpertId, ExpertPlan, ExpertTier,
    OrganizationFeeConfig, OrganizationId, PlanType, DEFAULT_COMBINED_FEE_MAXIMUM_BPS,
    DEFAULT_EXPERT_MINIMUM_SHARE_BPS,
};
pub use eligibility::{
    EligibilityError, RequirementKind, SavingsProjection, TrailingMetrics, UpgradeAssessment,
    UpgradeEvaluator,
};
pub use engine::{CommissionEngine, CommissionError};
pub use import::{CaptureCsvImporter, CaptureImportError};
pub use protection::{validate_fee_change, FeeChangeError};
pub use rates::{
    fee_at_rate, EligibilityThresholds, MarketingFeeBand, PricingConfig, RateEntry, RateTable,
    SubscriptionPricing, TierThresholds, BPS_DENOMINATOR,
};
pub use repository::{
    NotifyError, PayoutInstruction, PayoutNotifier, RepositoryError, SettlementRecord,
    SettlementRepository, SettlementStatus, SettlementView,
};
pub use router::{
    billing_router, MarketingFeeChangeRequest, SettleRequest, UpgradeAssessmentRequest,
};
pub use service::{SettlementError, SettlementService};
