//! Core data model for Trek.
//!
//! These types represent the itinerary: trips, stops, the transit legs
//! between them, booking state, and the revision log of applied edits.

mod booking;
mod leg;
mod stop;
mod trip;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub use booking::{BookingStats, BookingStatus};
pub use leg::{TransitLeg, TransitMode};
pub use stop::Stop;
pub use trip::{Trip, TripError};

use crate::cascade::{Edit, StalenessReport};

/// A single entry in a trip's revision log, serialized as one line of JSONL.
///
/// Written after each applied reschedule, so the edit history of an
/// itinerary can be audited alongside the latest snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionEntry {
    /// The edit that was applied.
    pub edit: Edit,

    /// Bookings the edit invalidated.
    pub stale: StalenessReport,

    /// The version the edit produced.
    pub version: u64,

    /// When the edit was applied.
    pub applied_at: Timestamp,
}
