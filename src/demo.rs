//! The seed itinerary used by `trek trip demo`.
//!
//! Trips are created once and thereafter only replaced by reschedules,
//! so this is the one place an itinerary is assembled from scratch.

use jiff::civil::Date;
use jiff::{ToSpan, Zoned};
use uuid::Uuid;

use crate::model::{BookingStatus, Stop, TransitLeg, TransitMode, Trip};

/// A four-stop Southeast Asia route starting about a month out, with a
/// mix of confirmed, pending, and unbooked stays.
pub fn demo_trip() -> Trip {
    let start = Zoned::now().date().saturating_add(28.days());

    let bangkok = stay("Bangkok", "Thailand", start, 4, BookingStatus::Booked);
    let chiang_mai = stay(
        "Chiang Mai",
        "Thailand",
        bangkok.end_date,
        4,
        BookingStatus::Booked,
    );
    // The overnight bus eats a day: Hanoi checks in the day after
    // Chiang Mai checks out.
    let hanoi = stay(
        "Hanoi",
        "Vietnam",
        chiang_mai.end_date.saturating_add(1.day()),
        4,
        BookingStatus::Pending,
    );
    let hoi_an = stay("Hoi An", "Vietnam", hanoi.end_date, 3, BookingStatus::NotBooked);

    let legs = vec![
        leg(
            &bangkok,
            &chiang_mai,
            TransitMode::Flight,
            "1h 20m",
            BookingStatus::Booked,
        ),
        leg(
            &chiang_mai,
            &hanoi,
            TransitMode::Bus,
            "overnight",
            BookingStatus::NotBooked,
        ),
        leg(
            &hanoi,
            &hoi_an,
            TransitMode::Train,
            "16h",
            BookingStatus::NotBooked,
        ),
    ];

    let mut trip = Trip::new("Southeast Asia");
    trip.stops = vec![bangkok, chiang_mai, hanoi, hoi_an];
    trip.legs = legs;
    trip
}

fn stay(city: &str, country: &str, start: Date, nights: i64, booking: BookingStatus) -> Stop {
    Stop {
        id: Uuid::new_v4(),
        city: city.into(),
        country: country.into(),
        start_date: start,
        end_date: start.saturating_add(nights.days()),
        booking,
    }
}

fn leg(
    from: &Stop,
    to: &Stop,
    mode: TransitMode,
    hint: &str,
    booking: BookingStatus,
) -> TransitLeg {
    TransitLeg {
        id: Uuid::new_v4(),
        from_stop: from.id,
        to_stop: to.id,
        departure_date: from.end_date,
        mode,
        duration_hint: Some(hint.into()),
        booking,
    }
}
