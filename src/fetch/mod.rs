//! Outbound market-data fetchers and their shared outcome type.

pub mod price;
pub mod volume;

use chrono::NaiveDateTime;

/// Result of one fetch attempt.
///
/// Absence is a valid outcome, not an error: any failure inside a fetcher
/// (transport, status, body shape, API-reported error) degrades to `Absent`
/// carrying the time the attempt started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchOutcome {
    Sampled { value: f64, received_at: NaiveDateTime },
    Absent { started_at: NaiveDateTime },
}

impl FetchOutcome {
    pub fn sampled(value: f64, received_at: NaiveDateTime) -> Self {
        Self::Sampled { value, received_at }
    }

    pub fn absent(started_at: NaiveDateTime) -> Self {
        Self::Absent { started_at }
    }

    /// The sampled value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Sampled { value, .. } => Some(*value),
            Self::Absent { .. } => None,
        }
    }

    /// Completion time for samples, start time for absences.
    pub fn received_at(&self) -> NaiveDateTime {
        match self {
            Self::Sampled { received_at, .. } => *received_at,
            Self::Absent { started_at } => *started_at,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent { .. })
    }
}
