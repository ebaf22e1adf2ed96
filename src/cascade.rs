//! Rescheduling: propagating one stop's date change through the itinerary.
//!
//! The engine is a pure function from (trip, edit) to a new trip plus a
//! report of invalidated bookings. Editing a stop never touches anything
//! before it; every stop after it is re-placed against its recomputed
//! predecessor so that each stop keeps its own night count and each pair
//! of stops keeps the calendar gap between them. Confirmed bookings whose
//! dates moved are demoted to pending and reported, so the caller can
//! drive re-confirmation.

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{BookingStatus, Trip};

/// A requested date change for one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub stop_id: Uuid,
    pub new_start: Date,
    pub new_end: Date,

    /// The trip version this edit was computed against, when the caller
    /// tracks one. A mismatch means the snapshot the caller saw has been
    /// superseded and the edit must be recomputed.
    pub expected_version: Option<u64>,
}

impl Edit {
    /// Parses an edit from ISO 8601 date strings (`2026-03-14`).
    pub fn parse(stop_id: Uuid, new_start: &str, new_end: &str) -> Result<Self, EditError> {
        Ok(Self {
            stop_id,
            new_start: new_start.parse().map_err(EditError::InvalidDate)?,
            new_end: new_end.parse().map_err(EditError::InvalidDate)?,
            expected_version: None,
        })
    }

    /// Attaches the version the edit was computed against.
    pub fn against_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Stops and legs whose confirmed bookings were invalidated by an edit.
///
/// Everything listed here was `Booked` before the edit, had its dates
/// moved by it, and is now `Pending` awaiting re-confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StalenessReport {
    pub stop_ids: Vec<Uuid>,
    pub leg_ids: Vec<Uuid>,
}

impl StalenessReport {
    pub fn is_empty(&self) -> bool {
        self.stop_ids.is_empty() && self.leg_ids.is_empty()
    }
}

/// A successfully applied edit: the new snapshot plus what went stale.
#[derive(Debug, Clone)]
pub struct Rescheduled {
    pub trip: Trip,
    pub stale: StalenessReport,
}

/// Why an edit was rejected.
///
/// The trip is untouched in every case; there is no partial failure.
/// Every rejection is recoverable by submitting a corrected edit.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("no stop {0} in this trip")]
    UnknownStop(Uuid),

    #[error("check-out must be after check-in: {start} to {end} is not at least one night")]
    EmptyStay { start: Date, end: Date },

    #[error("not a calendar date: {0}")]
    InvalidDate(#[source] jiff::Error),

    #[error("stay would start {start}, before the previous stop checks out {previous_end}")]
    OverlapsPredecessor { start: Date, previous_end: Date },

    #[error("edit was computed against version {expected}, trip is now at version {actual}")]
    StaleVersion { expected: u64, actual: u64 },

    #[error("shifted dates leave the supported calendar range: {0}")]
    DateRange(#[source] jiff::Error),
}

/// Applies a date edit to one stop and cascades the change downstream.
///
/// Returns a new snapshot; the input trip is never modified. Re-applying
/// an edit that matches the stop's current dates returns the trip as-is,
/// same version, with an empty report.
pub fn reschedule(trip: &Trip, edit: &Edit) -> Result<Rescheduled, EditError> {
    if let Some(expected) = edit.expected_version
        && expected != trip.version
    {
        return Err(EditError::StaleVersion {
            expected,
            actual: trip.version,
        });
    }
    if edit.new_end <= edit.new_start {
        return Err(EditError::EmptyStay {
            start: edit.new_start,
            end: edit.new_end,
        });
    }
    let edited = trip
        .stops
        .iter()
        .position(|s| s.id == edit.stop_id)
        .ok_or(EditError::UnknownStop(edit.stop_id))?;

    // Stops before the edited one never move, so the new stay must not
    // reach back into its predecessor.
    if edited > 0 {
        let previous_end = trip.stops[edited - 1].end_date;
        if edit.new_start < previous_end {
            return Err(EditError::OverlapsPredecessor {
                start: edit.new_start,
                previous_end,
            });
        }
    }

    let mut stops = trip.stops.clone();
    stops[edited].start_date = edit.new_start;
    stops[edited].end_date = edit.new_end;

    // Walk the chain once, left to right. Each downstream stop is placed
    // against its recomputed predecessor rather than by propagating one
    // scalar delta, keeping its own night count and the gap before it.
    for j in edited + 1..stops.len() {
        let gap = (trip.stops[j].start_date - trip.stops[j - 1].end_date).get_days();
        let nights = trip.stops[j].nights();
        let start = add_days(stops[j - 1].end_date, gap)?;
        let end = add_days(start, nights)?;
        stops[j].start_date = start;
        stops[j].end_date = end;
    }

    if stops
        .iter()
        .zip(&trip.stops)
        .all(|(new, old)| new.start_date == old.start_date && new.end_date == old.end_date)
    {
        // Nothing moved: hand the snapshot back unchanged.
        return Ok(Rescheduled {
            trip: trip.clone(),
            stale: StalenessReport::default(),
        });
    }

    // A leg departs the day its from-stop checks out. Duration hints are
    // descriptive and never consume calendar days.
    let mut legs = trip.legs.clone();
    for leg in &mut legs {
        if let Some(from) = stops.iter().find(|s| s.id == leg.from_stop) {
            leg.departure_date = from.end_date;
        }
    }

    // Staleness pass. Only downstream stops are demoted; the edited
    // stop's own booking is the caller's concern, not a cascade effect.
    // A booking that was already pending signals nothing new.
    let mut stale = StalenessReport::default();
    for j in edited + 1..stops.len() {
        let old = &trip.stops[j];
        let stop = &mut stops[j];
        if stop.start_date == old.start_date && stop.end_date == old.end_date {
            continue;
        }
        if stop.booking == BookingStatus::Booked {
            stop.booking = BookingStatus::Pending;
            stale.stop_ids.push(stop.id);
        }
    }
    for (leg, old) in legs.iter_mut().zip(&trip.legs) {
        if leg.departure_date == old.departure_date {
            continue;
        }
        if leg.booking == BookingStatus::Booked {
            leg.booking = BookingStatus::Pending;
            stale.leg_ids.push(leg.id);
        }
    }

    let rescheduled = Trip {
        id: trip.id,
        name: trip.name.clone(),
        created_at: trip.created_at,
        version: trip.version + 1,
        stops,
        legs,
    };
    debug_assert!(
        trip.validate().is_err() || rescheduled.validate().is_ok(),
        "reschedule broke an itinerary invariant"
    );

    Ok(Rescheduled {
        trip: rescheduled,
        stale,
    })
}

fn add_days(date: Date, days: i32) -> Result<Date, EditError> {
    date.checked_add(i64::from(days).days())
        .map_err(EditError::DateRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::{BookingStatus, Stop, TransitLeg, TransitMode};

    fn stop(city: &str, start: Date, end: Date, booking: BookingStatus) -> Stop {
        Stop {
            id: Uuid::new_v4(),
            city: city.into(),
            country: "Thailand".into(),
            start_date: start,
            end_date: end,
            booking,
        }
    }

    fn leg(from: &Stop, to: &Stop, mode: TransitMode, booking: BookingStatus) -> TransitLeg {
        TransitLeg {
            id: Uuid::new_v4(),
            from_stop: from.id,
            to_stop: to.id,
            departure_date: from.end_date,
            mode,
            duration_hint: None,
            booking,
        }
    }

    /// Four stops, three legs, a one-day travel gap before Hanoi.
    ///
    /// Bangkok    Mar 1–5   booked     ──flight, booked──▶
    /// Chiang Mai Mar 5–9   booked     ──bus, not booked──▶  (gap day Mar 9)
    /// Hanoi      Mar 10–14 pending    ──train, booked──▶
    /// Hoi An     Mar 14–17 booked
    fn sample_trip() -> Trip {
        let a = stop(
            "Bangkok",
            date(2026, 3, 1),
            date(2026, 3, 5),
            BookingStatus::Booked,
        );
        let b = stop(
            "Chiang Mai",
            date(2026, 3, 5),
            date(2026, 3, 9),
            BookingStatus::Booked,
        );
        let c = stop(
            "Hanoi",
            date(2026, 3, 10),
            date(2026, 3, 14),
            BookingStatus::Pending,
        );
        let d = stop(
            "Hoi An",
            date(2026, 3, 14),
            date(2026, 3, 17),
            BookingStatus::Booked,
        );
        let legs = vec![
            leg(&a, &b, TransitMode::Flight, BookingStatus::Booked),
            leg(&b, &c, TransitMode::Bus, BookingStatus::NotBooked),
            leg(&c, &d, TransitMode::Train, BookingStatus::Booked),
        ];
        let mut trip = Trip::new("Southeast Asia");
        trip.stops = vec![a, b, c, d];
        trip.legs = legs;
        assert_eq!(trip.validate(), Ok(()));
        trip
    }

    fn edit(trip: &Trip, position: usize, start: Date, end: Date) -> Edit {
        Edit {
            stop_id: trip.stops[position].id,
            new_start: start,
            new_end: end,
            expected_version: None,
        }
    }

    #[test]
    fn extending_a_stay_pushes_everything_after_it() {
        let trip = sample_trip();
        // Two more nights in Chiang Mai.
        let out = reschedule(&trip, &edit(&trip, 1, date(2026, 3, 5), date(2026, 3, 11))).unwrap();

        let stops = &out.trip.stops;
        // Bangkok untouched.
        assert_eq!(stops[0].start_date, date(2026, 3, 1));
        assert_eq!(stops[0].end_date, date(2026, 3, 5));
        // Hanoi keeps its gap day and its four nights.
        assert_eq!(stops[2].start_date, date(2026, 3, 12));
        assert_eq!(stops[2].end_date, date(2026, 3, 16));
        // Hoi An follows directly.
        assert_eq!(stops[3].start_date, date(2026, 3, 16));
        assert_eq!(stops[3].end_date, date(2026, 3, 19));

        // Legs depart on the (new) check-out dates.
        assert_eq!(out.trip.legs[0].departure_date, date(2026, 3, 5));
        assert_eq!(out.trip.legs[1].departure_date, date(2026, 3, 11));
        assert_eq!(out.trip.legs[2].departure_date, date(2026, 3, 16));

        assert_eq!(out.trip.version, trip.version + 1);
        assert_eq!(out.trip.validate(), Ok(()));
    }

    #[test]
    fn worked_example_two_booked_stops() {
        // A Mar 1–5 booked, B Mar 6–10 booked, leg departs Mar 5.
        let a = stop(
            "Lisbon",
            date(2026, 3, 1),
            date(2026, 3, 5),
            BookingStatus::Booked,
        );
        let b = stop(
            "Porto",
            date(2026, 3, 6),
            date(2026, 3, 10),
            BookingStatus::Booked,
        );
        let l = leg(&a, &b, TransitMode::Train, BookingStatus::Booked);
        let mut trip = Trip::new("Portugal");
        trip.stops = vec![a, b];
        trip.legs = vec![l];

        // Extend A to Mar 1–8: nights 4 → 7.
        let out = reschedule(&trip, &edit(&trip, 0, date(2026, 3, 1), date(2026, 3, 8))).unwrap();

        assert_eq!(out.trip.stops[0].end_date, date(2026, 3, 8));
        assert_eq!(out.trip.stops[1].start_date, date(2026, 3, 9));
        assert_eq!(out.trip.stops[1].end_date, date(2026, 3, 13));
        assert_eq!(out.trip.stops[1].nights(), 4);
        assert_eq!(out.trip.legs[0].departure_date, date(2026, 3, 8));

        // B and the leg were booked and moved; A is the edited stop itself
        // and stays out of the report with its booking untouched.
        assert_eq!(out.stale.stop_ids, vec![trip.stops[1].id]);
        assert_eq!(out.stale.leg_ids, vec![trip.legs[0].id]);
        assert_eq!(out.trip.stops[0].booking, BookingStatus::Booked);
        assert_eq!(out.trip.stops[1].booking, BookingStatus::Pending);
        assert_eq!(out.trip.legs[0].booking, BookingStatus::Pending);
    }

    #[test]
    fn nights_are_conserved_for_every_other_stop() {
        let trip = sample_trip();
        let before: Vec<i32> = trip.stops.iter().map(Stop::nights).collect();

        let out = reschedule(&trip, &edit(&trip, 1, date(2026, 3, 7), date(2026, 3, 10))).unwrap();

        for (j, stop) in out.trip.stops.iter().enumerate() {
            if j != 1 {
                assert_eq!(stop.nights(), before[j], "stop {j} changed night count");
            }
        }
        assert_eq!(out.trip.stops[1].nights(), 3);
    }

    #[test]
    fn gaps_are_conserved_beyond_the_edited_stop() {
        let trip = sample_trip();
        let gap = |t: &Trip, j: usize| (t.stops[j].start_date - t.stops[j - 1].end_date).get_days();
        let before: Vec<i32> = (1..trip.stops.len()).map(|j| gap(&trip, j)).collect();

        let out = reschedule(&trip, &edit(&trip, 0, date(2026, 2, 20), date(2026, 3, 2))).unwrap();

        for j in 1..out.trip.stops.len() {
            assert_eq!(gap(&out.trip, j), before[j - 1], "gap before stop {j} changed");
        }
    }

    #[test]
    fn reapplying_current_dates_is_a_no_op() {
        let trip = sample_trip();
        let current = edit(&trip, 2, date(2026, 3, 10), date(2026, 3, 14));

        let out = reschedule(&trip, &current).unwrap();

        assert_eq!(out.trip, trip);
        assert_eq!(out.trip.version, trip.version);
        assert!(out.stale.is_empty());
    }

    #[test]
    fn shifting_the_first_stop_moves_the_whole_trip() {
        let trip = sample_trip();
        // Three days later, same night count.
        let out = reschedule(&trip, &edit(&trip, 0, date(2026, 3, 4), date(2026, 3, 8))).unwrap();

        for (new, old) in out.trip.stops.iter().zip(&trip.stops) {
            assert_eq!(new.start_date, add_days(old.start_date, 3).unwrap());
            assert_eq!(new.end_date, add_days(old.end_date, 3).unwrap());
        }
        for (new, old) in out.trip.legs.iter().zip(&trip.legs) {
            assert_eq!(new.departure_date, add_days(old.departure_date, 3).unwrap());
        }
        assert_eq!(out.trip.start_date(), Some(date(2026, 3, 4)));
        assert_eq!(out.trip.end_date(), Some(date(2026, 3, 20)));
    }

    #[test]
    fn shortening_a_stay_pulls_the_tail_earlier() {
        let trip = sample_trip();
        // One night fewer in Bangkok.
        let out = reschedule(&trip, &edit(&trip, 0, date(2026, 3, 1), date(2026, 3, 4))).unwrap();

        assert_eq!(out.trip.stops[1].start_date, date(2026, 3, 4));
        assert_eq!(out.trip.stops[3].end_date, date(2026, 3, 16));
        assert_eq!(out.trip.validate(), Ok(()));
    }

    #[test]
    fn later_arrival_with_same_checkout_leaves_downstream_alone() {
        let trip = sample_trip();
        // Arrive in Bangkok two days later, still check out Mar 5.
        let out = reschedule(&trip, &edit(&trip, 0, date(2026, 3, 3), date(2026, 3, 5))).unwrap();

        for (j, (new, old)) in out.trip.stops.iter().zip(&trip.stops).enumerate().skip(1) {
            assert_eq!(new.start_date, old.start_date, "stop {j} moved");
            assert_eq!(new.booking, old.booking, "stop {j} booking changed");
        }
        assert!(out.stale.is_empty());
        // The edited stop's own dates did change, so this is a new snapshot.
        assert_eq!(out.trip.version, trip.version + 1);
    }

    #[test]
    fn staleness_skips_pending_and_untouched_bookings() {
        let trip = sample_trip();
        let out = reschedule(&trip, &edit(&trip, 1, date(2026, 3, 5), date(2026, 3, 11))).unwrap();

        // Hanoi moved but was only pending, so it is not newly stale.
        assert_eq!(out.trip.stops[2].booking, BookingStatus::Pending);
        // Hoi An moved and was booked: demoted and reported.
        assert_eq!(out.trip.stops[3].booking, BookingStatus::Pending);
        assert_eq!(out.stale.stop_ids, vec![trip.stops[3].id]);
        // Bangkok sits before the edit and keeps its confirmation.
        assert_eq!(out.trip.stops[0].booking, BookingStatus::Booked);

        // The Bangkok→Chiang Mai flight still departs Mar 5; only the
        // train out of Hanoi was booked and moved.
        assert_eq!(out.trip.legs[0].booking, BookingStatus::Booked);
        assert_eq!(out.stale.leg_ids, vec![trip.legs[2].id]);
    }

    #[test]
    fn edited_stop_booking_is_left_to_the_caller() {
        let trip = sample_trip();
        let out = reschedule(&trip, &edit(&trip, 1, date(2026, 3, 5), date(2026, 3, 12))).unwrap();

        assert_eq!(out.trip.stops[1].booking, BookingStatus::Booked);
        assert!(!out.stale.stop_ids.contains(&trip.stops[1].id));
    }

    #[test]
    fn rejects_unknown_stop() {
        let trip = sample_trip();
        let bad = Edit {
            stop_id: Uuid::new_v4(),
            new_start: date(2026, 3, 1),
            new_end: date(2026, 3, 2),
            expected_version: None,
        };
        assert!(matches!(
            reschedule(&trip, &bad),
            Err(EditError::UnknownStop(_))
        ));
    }

    #[test]
    fn rejects_checkout_on_or_before_checkin() {
        let trip = sample_trip();
        let backwards = edit(&trip, 1, date(2026, 3, 9), date(2026, 3, 5));
        assert!(matches!(
            reschedule(&trip, &backwards),
            Err(EditError::EmptyStay { .. })
        ));

        let zero_nights = edit(&trip, 1, date(2026, 3, 5), date(2026, 3, 5));
        assert!(matches!(
            reschedule(&trip, &zero_nights),
            Err(EditError::EmptyStay { .. })
        ));
    }

    #[test]
    fn rejects_start_before_predecessor_checkout() {
        let trip = sample_trip();
        // Chiang Mai cannot begin while Bangkok is still underway.
        let overlapping = edit(&trip, 1, date(2026, 3, 3), date(2026, 3, 9));
        assert!(matches!(
            reschedule(&trip, &overlapping),
            Err(EditError::OverlapsPredecessor { .. })
        ));
    }

    #[test]
    fn rejects_edit_against_superseded_version() {
        let trip = sample_trip();
        let stale = edit(&trip, 0, date(2026, 3, 2), date(2026, 3, 6)).against_version(7);
        assert!(matches!(
            reschedule(&trip, &stale),
            Err(EditError::StaleVersion {
                expected: 7,
                actual: 0
            })
        ));
    }

    #[test]
    fn accepts_edit_against_matching_version() {
        let trip = sample_trip();
        let current = edit(&trip, 0, date(2026, 3, 2), date(2026, 3, 6)).against_version(0);
        assert!(reschedule(&trip, &current).is_ok());
    }

    #[test]
    fn parse_accepts_iso_dates_and_rejects_garbage() {
        let id = Uuid::new_v4();
        let parsed = Edit::parse(id, "2026-03-01", "2026-03-05").unwrap();
        assert_eq!(parsed.new_start, date(2026, 3, 1));
        assert_eq!(parsed.new_end, date(2026, 3, 5));

        assert!(matches!(
            Edit::parse(id, "March 1st", "2026-03-05"),
            Err(EditError::InvalidDate(_))
        ));
        assert!(matches!(
            Edit::parse(id, "2026-03-01", "2026-02-30"),
            Err(EditError::InvalidDate(_))
        ));
    }

    #[test]
    fn sequential_edits_compose_against_each_result() {
        let trip = sample_trip();

        // First: two more nights in Bangkok.
        let first = reschedule(&trip, &edit(&trip, 0, date(2026, 3, 1), date(2026, 3, 7)))
            .unwrap()
            .trip;
        // Then: one more night in Hanoi, computed against the new snapshot.
        let second = reschedule(
            &first,
            &edit(&first, 2, first.stops[2].start_date, date(2026, 3, 17)).against_version(1),
        )
        .unwrap()
        .trip;

        assert_eq!(second.version, 2);
        assert_eq!(second.stops[3].start_date, date(2026, 3, 17));
        assert_eq!(second.stops[3].nights(), 3);
        assert_eq!(second.validate(), Ok(()));
    }
}
