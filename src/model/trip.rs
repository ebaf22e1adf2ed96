//! Trip: the ordered aggregate of stops and transit legs.

use std::collections::HashSet;

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BookingStats, BookingStatus, Stop, TransitLeg};

/// An invariant violation in a trip snapshot.
///
/// A well-formed trip never produces these; they surface when a snapshot
/// read from disk (or assembled by hand in tests) is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TripError {
    #[error("duplicate id {0} in trip")]
    DuplicateId(Uuid),

    #[error("expected {expected} transit legs for {stops} stops, found {found}")]
    LegCount {
        stops: usize,
        expected: usize,
        found: usize,
    },

    #[error("stop {city} checks out on or before check-in ({start} to {end})")]
    EmptyStay {
        city: String,
        start: Date,
        end: Date,
    },

    #[error("stop {city} starts {start}, before the previous stop checks out {previous_end}")]
    OverlappingStops {
        city: String,
        start: Date,
        previous_end: Date,
    },

    #[error("leg {position} does not connect its consecutive stops")]
    LegEndpoints { position: usize },

    #[error("leg {position} departs {departure}, but its stop checks out {end}")]
    LegDeparture {
        position: usize,
        departure: Date,
        end: Date,
    },
}

/// An ordered itinerary: stops in visiting order, one leg between each
/// consecutive pair.
///
/// A trip is only ever replaced wholesale by a new consistent snapshot:
/// rescheduling produces a fresh `Trip`, it never patches fields of a
/// shared one. `version` counts those replacements so a caller holding an
/// old snapshot can be detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub name: String,
    pub created_at: Timestamp,

    /// Bumped each time a reschedule changes any date.
    pub version: u64,

    pub stops: Vec<Stop>,
    pub legs: Vec<TransitLeg>,
}

impl Trip {
    /// Creates an empty trip at version 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Timestamp::now(),
            version: 0,
            stops: Vec::new(),
            legs: Vec::new(),
        }
    }

    /// Check-in date of the first stop. `None` for an empty trip.
    pub fn start_date(&self) -> Option<Date> {
        self.stops.first().map(|s| s.start_date)
    }

    /// Check-out date of the last stop. `None` for an empty trip.
    pub fn end_date(&self) -> Option<Date> {
        self.stops.last().map(|s| s.end_date)
    }

    /// Whole-trip length in days, check-in to final check-out.
    pub fn duration_days(&self) -> i32 {
        match (self.start_date(), self.end_date()) {
            (Some(start), Some(end)) => (end - start).get_days(),
            _ => 0,
        }
    }

    /// Looks up a stop by id.
    pub fn stop(&self, id: Uuid) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    /// 1-based display position of a stop ("stop 2 of 4").
    pub fn stop_position(&self, id: Uuid) -> Option<usize> {
        self.stops.iter().position(|s| s.id == id).map(|i| i + 1)
    }

    /// The leg connecting two specific stops, if one exists.
    pub fn leg_between(&self, from: Uuid, to: Uuid) -> Option<&TransitLeg> {
        self.legs
            .iter()
            .find(|l| l.from_stop == from && l.to_stop == to)
    }

    /// The leg departing a stop, if any. The last stop has none.
    pub fn outgoing_leg(&self, stop_id: Uuid) -> Option<&TransitLeg> {
        self.legs.iter().find(|l| l.from_stop == stop_id)
    }

    /// Counts stops per booking status.
    pub fn booking_stats(&self) -> BookingStats {
        let mut stats = BookingStats::default();
        for stop in &self.stops {
            match stop.booking {
                BookingStatus::Booked => stats.booked += 1,
                BookingStatus::Pending => stats.pending += 1,
                BookingStatus::NotBooked => stats.not_booked += 1,
            }
        }
        stats
    }

    /// Checks every structural invariant of the itinerary.
    ///
    /// - ids are unique across stops and legs
    /// - `n` stops are connected by exactly `n − 1` legs
    /// - every stop spans at least one night
    /// - stops are ordered: each starts no earlier than its predecessor
    ///   checks out (the gap between them is travel time, usually zero)
    /// - leg `k` connects stop `k` to stop `k + 1` and departs on stop
    ///   `k`'s check-out date
    pub fn validate(&self) -> Result<(), TripError> {
        let mut ids = HashSet::new();
        for id in self
            .stops
            .iter()
            .map(|s| s.id)
            .chain(self.legs.iter().map(|l| l.id))
        {
            if !ids.insert(id) {
                return Err(TripError::DuplicateId(id));
            }
        }

        let expected_legs = self.stops.len().saturating_sub(1);
        if self.legs.len() != expected_legs {
            return Err(TripError::LegCount {
                stops: self.stops.len(),
                expected: expected_legs,
                found: self.legs.len(),
            });
        }

        for (i, stop) in self.stops.iter().enumerate() {
            if stop.end_date <= stop.start_date {
                return Err(TripError::EmptyStay {
                    city: stop.city.clone(),
                    start: stop.start_date,
                    end: stop.end_date,
                });
            }
            if i > 0 {
                let previous = &self.stops[i - 1];
                if stop.start_date < previous.end_date {
                    return Err(TripError::OverlappingStops {
                        city: stop.city.clone(),
                        start: stop.start_date,
                        previous_end: previous.end_date,
                    });
                }
            }
        }

        for (k, leg) in self.legs.iter().enumerate() {
            let from = &self.stops[k];
            let to = &self.stops[k + 1];
            if leg.from_stop != from.id || leg.to_stop != to.id {
                return Err(TripError::LegEndpoints { position: k + 1 });
            }
            if leg.departure_date != from.end_date {
                return Err(TripError::LegDeparture {
                    position: k + 1,
                    departure: leg.departure_date,
                    end: from.end_date,
                });
            }
        }

        Ok(())
    }
}
