use care_billing::billing::{
    BookingId, ExpertTier, NotifyError, PayoutInstruction, PayoutNotifier, PlanType,
    RepositoryError, SettlementRecord, SettlementRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySettlementRepository {
    records: Arc<Mutex<HashMap<BookingId, SettlementRecord>>>,
}

impl SettlementRepository for InMemorySettlementRepository {
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
        if guard.contains_key(&record.booking.booking_id) {
            guard.insert(record.booking.booking_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryPayoutNotifier {
    instructions: Arc<Mutex<Vec<PayoutInstruction>>>,
}

impl PayoutNotifier for InMemoryPayoutNotifier {
    fn queue(&self, instruction: PayoutInstruction) -> Result<(), NotifyError> {
        let mut guard = self.instructions.lock().expect("payout mutex poisoned");
        guard.push(instruction);
        Ok(())
    }
}

impl InMemoryPayoutNotifier {
    pub(crate) fn queued(&self) -> Vec<PayoutInstruction> {
        self.instructions.lock().expect("payout mutex poisoned").clone()
    }
}

pub(crate) fn parse_tier(raw: &str) -> Result<ExpertTier, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "community" => Ok(ExpertTier::Community),
        "top" => Ok(ExpertTier::Top),
        other => Err(format!(
            "unknown expert tier '{other}' (expected community or top)"
        )),
    }
}

pub(crate) fn parse_plan(raw: &str) -> Result<PlanType, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "commission" => Ok(PlanType::Commission),
        "monthly" => Ok(PlanType::Monthly),
        "annual" => Ok(PlanType::Annual),
        other => Err(format!(
            "unknown plan type '{other}' (expected commission, monthly, or annual)"
        )),
    }
}
