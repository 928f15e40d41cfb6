use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{Booking, BookingId, ExpertId, OrganizationId};

#[derive(Debug)]
pub enum CaptureImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: usize, detail: String },
}

impl std::fmt::Display for CaptureImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureImportError::Io(err) => write!(f, "failed to read capture export: {}", err),
            CaptureImportError::Csv(err) => write!(f, "invalid capture CSV data: {}", err),
            CaptureImportError::Row { line, detail } => {
                write!(f, "capture row {} rejected: {}", line, detail)
            }
        }
    }
}

impl std::error::Error for CaptureImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureImportError::Io(err) => Some(err),
            CaptureImportError::Csv(err) => Some(err),
            CaptureImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for CaptureImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CaptureImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads booking captures from a payment-provider CSV export.
///
/// Rejects any malformed row with its line number instead of silently
/// dropping it; a clean export parses into settlement-ready [`Booking`]s.
pub struct CaptureCsvImporter;

impl CaptureCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Booking>, CaptureImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Booking>, CaptureImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut bookings = Vec::new();

        for (index, record) in csv_reader.deserialize::<CaptureRow>().enumerate() {
            // Header occupies line 1; the first data row is line 2.
            let line = index + 2;
            let row = record?;
            bookings.push(row.into_booking(line)?);
        }

        Ok(bookings)
    }
}

#[derive(Debug, Deserialize)]
struct CaptureRow {
    #[serde(rename = "Booking ID")]
    booking_id: String,
    #[serde(rename = "Captured At")]
    captured_at: String,
    #[serde(rename = "Amount Cents")]
    amount_cents: String,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Expert ID")]
    expert_id: String,
    #[serde(
        rename = "Organization ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    organization_id: Option<String>,
}

impl CaptureRow {
    fn into_booking(self, line: usize) -> Result<Booking, CaptureImportError> {
        if self.booking_id.is_empty() {
            return Err(reject(line, "missing booking id"));
        }
        if self.expert_id.is_empty() {
            return Err(reject(line, "missing expert id"));
        }
        if self.currency.is_empty() {
            return Err(reject(line, "missing currency"));
        }

        let captured_at = parse_timestamp(&self.captured_at)
            .ok_or_else(|| reject(line, "unparseable capture time"))?;
        let gross_amount_cents = self
            .amount_cents
            .parse::<u64>()
            .map_err(|_| reject(line, "amount is not a whole number of cents"))?;

        Ok(Booking {
            booking_id: BookingId(self.booking_id),
            payee_id: ExpertId(self.expert_id),
            organization_id: self.organization_id.map(OrganizationId),
            gross_amount_cents,
            currency: self.currency,
            captured_at,
        })
    }
}

fn reject(line: usize, detail: &str) -> CaptureImportError {
    CaptureImportError::Row {
        line,
        detail: detail.to_string(),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}
