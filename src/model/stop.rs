//! Stop: one destination visit with a date range.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::BookingStatus;

/// A single destination visit.
///
/// `end_date` has check-out semantics: a stay from the 1st to the 5th
/// covers four nights, and the 5th is the day travel to the next stop
/// begins. Nights are always derived from the dates, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: Uuid,

    /// Where this stop is. Immutable once the stop exists; rescheduling
    /// only ever touches the dates and the booking state.
    pub city: String,
    pub country: String,

    /// Check-in date.
    pub start_date: Date,

    /// Check-out date (exclusive: the night before is the last night).
    pub end_date: Date,

    pub booking: BookingStatus,
}

impl Stop {
    /// Number of nights spent at this stop: `end_date − start_date` in days.
    pub fn nights(&self) -> i32 {
        (self.end_date - self.start_date).get_days()
    }
}
