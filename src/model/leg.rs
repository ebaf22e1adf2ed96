//! Transit legs: the travel segments between consecutive stops.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookingStatus;

/// How a leg is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitMode {
    Bus,
    Train,
    Flight,
    Ferry,
}

impl TransitMode {
    /// Short label for CLI display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Train => "train",
            Self::Flight => "flight",
            Self::Ferry => "ferry",
        }
    }
}

/// A directed travel segment from one stop to the next in sequence.
///
/// Legs consume no calendar days: `departure_date` is always the
/// check-out date of the from-stop, and the traveller is assumed to
/// arrive the same day. `duration_hint` is a rough travel-time estimate
/// for display ("7h", "overnight") and never moves any date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitLeg {
    pub id: Uuid,

    pub from_stop: Uuid,
    pub to_stop: Uuid,

    /// The day travel begins. Derived from the from-stop's `end_date`;
    /// recomputed on every reschedule, never edited directly.
    pub departure_date: Date,

    pub mode: TransitMode,
    pub duration_hint: Option<String>,

    pub booking: BookingStatus,
}
