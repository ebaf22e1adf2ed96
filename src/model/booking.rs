//! Booking state shared by stops and transit legs.

use serde::{Deserialize, Serialize};

/// Where a booking stands for one stop or leg.
///
/// Orthogonal to dates, with one coupling: a `Booked` stop or leg whose
/// dates move is demoted to `Pending` by the reschedule pass. It is never
/// left claiming a confirmation that no longer matches the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    /// No booking attempted yet.
    NotBooked,

    /// Reserved but not confirmed — either never confirmed, or confirmed
    /// once and since invalidated by a date change.
    Pending,

    /// Confirmed for the current dates.
    Booked,
}

impl BookingStatus {
    /// Short label for CLI display.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotBooked => "not booked",
            Self::Pending => "pending",
            Self::Booked => "booked",
        }
    }
}

/// Per-status counts over a trip's stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub booked: usize,
    pub pending: usize,
    pub not_booked: usize,
}

impl BookingStats {
    /// Total number of stops counted.
    pub fn total(&self) -> usize {
        self.booked + self.pending + self.not_booked
    }
}
