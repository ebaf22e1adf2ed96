//! Output formatting for CLI display.

use crate::cascade::StalenessReport;
use crate::model::{BookingStats, Stop, TransitLeg, Trip};

/// One itinerary line for a stop.
pub(super) fn stop_line(position: usize, stop: &Stop) -> String {
    let nights = stop.nights();
    let night_word = if nights == 1 { "night" } else { "nights" };
    format!(
        "{position}. {}, {}  {} → {}  ({nights} {night_word}) [{}]",
        stop.city,
        stop.country,
        stop.start_date,
        stop.end_date,
        stop.booking.label(),
    )
}

/// One itinerary line for the leg departing a stop.
pub(super) fn leg_line(leg: &TransitLeg, to_city: &str) -> String {
    let hint = leg
        .duration_hint
        .as_deref()
        .map(|h| format!(" ({h})"))
        .unwrap_or_default();
    format!(
        "   └─ {}{hint} to {to_city}, departs {} [{}]",
        leg.mode.label(),
        leg.departure_date,
        leg.booking.label(),
    )
}

/// Booking counters plus trip length.
pub(super) fn stats_line(stats: &BookingStats, duration_days: i32) -> String {
    format!(
        "{} stops over {duration_days} days: {} booked, {} pending, {} not booked",
        stats.total(),
        stats.booked,
        stats.pending,
        stats.not_booked,
    )
}

/// Human-readable staleness report, one line per invalidated booking.
pub(super) fn staleness_lines(trip: &Trip, stale: &StalenessReport) -> Vec<String> {
    if stale.is_empty() {
        return vec!["No confirmed bookings were affected.".to_string()];
    }

    let count = stale.stop_ids.len() + stale.leg_ids.len();
    let word = if count == 1 { "booking needs" } else { "bookings need" };
    let mut lines = vec![format!("{count} {word} re-confirmation:")];

    for id in &stale.stop_ids {
        if let Some(stop) = trip.stop(*id) {
            lines.push(format!(
                "  stay in {}, now {} → {}",
                stop.city, stop.start_date, stop.end_date
            ));
        }
    }
    for id in &stale.leg_ids {
        if let Some(leg) = trip.legs.iter().find(|l| l.id == *id) {
            let from = trip.stop(leg.from_stop).map_or("?", |s| s.city.as_str());
            let to = trip.stop(leg.to_stop).map_or("?", |s| s.city.as_str());
            lines.push(format!(
                "  {} {from} → {to}, now departs {}",
                leg.mode.label(),
                leg.departure_date
            ));
        }
    }
    lines
}
