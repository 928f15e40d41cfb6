use crate::infra::{InMemoryPayoutNotifier, InMemorySettlementRepository};
use care_billing::billing::{
    Booking, BookingId, CaptureCsvImporter, CommissionEngine, ExpertId, ExpertPlan, ExpertTier,
    OrganizationFeeConfig, OrganizationId, PlanType, PricingConfig, SettlementRecord,
    SettlementRepository, SettlementService, TrailingMetrics, UpgradeAssessment,
};
use care_billing::error::AppError;
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct BreakdownArgs {
    /// Gross captured amount for the booking, in cents
    #[arg(long)]
    pub(crate) amount_cents: u64,
    /// Currency code to echo through the breakdown
    #[arg(long, default_value = "EUR")]
    pub(crate) currency: String,
    /// Expert tier (community or top)
    #[arg(long, value_parser = crate::infra::parse_tier)]
    pub(crate) tier: ExpertTier,
    /// Billing plan (commission, monthly, or annual)
    #[arg(long, value_parser = crate::infra::parse_plan)]
    pub(crate) plan: PlanType,
    /// Stack an organization marketing fee on top of the platform fee
    #[arg(long)]
    pub(crate) marketing_fee_bps: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional capture export CSV to settle during the demo
    #[arg(long)]
    pub(crate) captures: Option<PathBuf>,
}

pub(crate) fn run_breakdown(args: BreakdownArgs) -> Result<(), AppError> {
    let BreakdownArgs {
        amount_cents,
        currency,
        tier,
        plan,
        marketing_fee_bps,
    } = args;

    let organization = marketing_fee_bps.map(|bps| {
        OrganizationFeeConfig::with_defaults(OrganizationId("org-demo".to_string()), bps)
    });
    let booking = Booking {
        booking_id: BookingId("bk-demo".to_string()),
        payee_id: ExpertId("exp-demo".to_string()),
        organization_id: organization
            .as_ref()
            .map(|config| config.organization_id.clone()),
        gross_amount_cents: amount_cents,
        currency,
        captured_at: Utc::now(),
    };
    let plan = ExpertPlan {
        expert_id: ExpertId("exp-demo".to_string()),
        tier,
        plan_type: plan,
    };

    let engine = CommissionEngine::new(PricingConfig::standard());
    let breakdown = engine.compute(&booking, &plan, organization.as_ref())?;
    match serde_json::to_string_pretty(&breakdown) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("breakdown unavailable: {err}"),
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { captures } = args;

    println!("Care marketplace billing demo");

    let repository = Arc::new(InMemorySettlementRepository::default());
    let payouts = Arc::new(InMemoryPayoutNotifier::default());
    let service = Arc::new(SettlementService::new(
        repository.clone(),
        payouts.clone(),
        PricingConfig::standard(),
    ));

    println!("\nSolo booking settlement");
    let plan = demo_plan("exp-ada", ExpertTier::Top, PlanType::Annual);
    match service.settle_booking(demo_booking("bk-1001", "exp-ada", None, 10_000), &plan, None) {
        Ok(record) => render_settlement(&record),
        Err(err) => println!("  Settlement rejected: {err}"),
    }

    println!("\nClinic booking with a marketing fee");
    let clinic =
        OrganizationFeeConfig::with_defaults(OrganizationId("org-lisbon".to_string()), 1_500);
    let plan = demo_plan("exp-eva", ExpertTier::Top, PlanType::Annual);
    match service.settle_booking(
        demo_booking("bk-1002", "exp-eva", Some("org-lisbon"), 10_000),
        &plan,
        Some(&clinic),
    ) {
        Ok(record) => render_settlement(&record),
        Err(err) => println!("  Settlement rejected: {err}"),
    }

    println!("\nGreedy fee configuration");
    let greedy =
        OrganizationFeeConfig::with_defaults(OrganizationId("org-lisbon".to_string()), 2_500);
    let plan = demo_plan("exp-ines", ExpertTier::Community, PlanType::Commission);
    match service.settle_booking(
        demo_booking("bk-1003", "exp-ines", Some("org-lisbon"), 10_000),
        &plan,
        Some(&greedy),
    ) {
        Ok(record) => render_settlement(&record),
        Err(err) => println!("  Settlement rejected: {err}"),
    }

    println!("\nMarketing fee validation across the roster");
    let roster = vec![
        demo_plan("exp-ada", ExpertTier::Top, PlanType::Annual),
        demo_plan("exp-ines", ExpertTier::Community, PlanType::Commission),
    ];
    for proposed_bps in [1_500, 2_500] {
        let proposed = OrganizationFeeConfig::with_defaults(
            OrganizationId("org-lisbon".to_string()),
            proposed_bps,
        );
        match service.validate_marketing_fee(&proposed, &roster) {
            Ok(()) => println!("  {proposed_bps} bps accepted for {} experts", roster.len()),
            Err(err) => println!("  {proposed_bps} bps rejected: {err}"),
        }
    }

    println!("\nSubscription upgrade check");
    let plan = demo_plan("exp-ines", ExpertTier::Community, PlanType::Commission);
    let metrics = TrailingMetrics {
        months_active: 3,
        average_monthly_revenue_cents: 20_000,
        completed_bookings: 20,
        average_rating: 4.2,
    };
    match service.assess_upgrade(&plan, PlanType::Annual, &metrics) {
        Ok(assessment) => {
            println!("  {}", assessment.summary());
            if let UpgradeAssessment::Eligible { savings } = assessment {
                match serde_json::to_string_pretty(&savings) {
                    Ok(json) => println!("  Savings projection:\n{json}"),
                    Err(err) => println!("  Savings projection unavailable: {err}"),
                }
            }
        }
        Err(err) => println!("  Assessment unavailable: {err}"),
    }

    if let Some(path) = captures {
        println!("\nCapture export settlement");
        let bookings = CaptureCsvImporter::from_path(&path)?;
        println!("  Imported {} captured bookings", bookings.len());
        for booking in bookings {
            let plan = ExpertPlan {
                expert_id: booking.payee_id.clone(),
                tier: ExpertTier::Community,
                plan_type: PlanType::Commission,
            };
            let organization = booking
                .organization_id
                .clone()
                .map(|id| OrganizationFeeConfig::with_defaults(id, 1_500));
            let booking_id = booking.booking_id.clone();
            match service.settle_booking(booking, &plan, organization.as_ref()) {
                Ok(record) => render_settlement(&record),
                Err(err) => println!("  Skipped {}: {err}", booking_id.0),
            }
        }
    }

    println!("\nRecent settlements");
    match repository.recent(10) {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(SettlementRecord::view).collect();
            match serde_json::to_string_pretty(&views) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("  Settlement listing unavailable: {err}"),
            }
        }
        Err(err) => println!("  Repository unavailable: {err}"),
    }

    println!("\nQueued payout instructions: {}", payouts.queued().len());

    Ok(())
}

fn demo_booking(
    booking_id: &str,
    expert_id: &str,
    organization_id: Option<&str>,
    gross_amount_cents: u64,
) -> Booking {
    Booking {
        booking_id: BookingId(booking_id.to_string()),
        payee_id: ExpertId(expert_id.to_string()),
        organization_id: organization_id.map(|id| OrganizationId(id.to_string())),
        gross_amount_cents,
        currency: "EUR".to_string(),
        captured_at: Utc::now(),
    }
}

fn demo_plan(expert_id: &str, tier: ExpertTier, plan_type: PlanType) -> ExpertPlan {
    ExpertPlan {
        expert_id: ExpertId(expert_id.to_string()),
        tier,
        plan_type,
    }
}

fn render_settlement(record: &SettlementRecord) {
    let view = record.view();
    let organization_note = match &view.organization_id {
        Some(id) => format!(" via {}", id.0),
        None => String::new(),
    };
    println!(
        "  {}{} | gross {} {} | platform fee {} | organization fee {} | expert keeps {}",
        view.booking_id.0,
        organization_note,
        view.gross_amount_cents,
        view.currency,
        view.platform_fee_cents,
        view.organization_fee_cents,
        view.payee_net_cents
    );
}
