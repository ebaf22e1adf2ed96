//! CLI interface for Trek.
//!
//! Non-interactive: arguments in, structured output out. Commands split
//! into two groups:
//!
//! - `trek trip new|demo|list` — lifecycle management, no trip context needed.
//! - `trek --trip <id> <command>` — everything else, operating on one trip.
//!
//! The `--trip` flag takes a full UUID or unambiguous prefix, falling
//! back to `default-trip` from the config.

mod format;

use clap::{Parser, Subcommand};
use jiff::{Timestamp, ToSpan};
use uuid::Uuid;

use crate::cascade::{self, Edit};
use crate::config::Config;
use crate::demo;
use crate::model::{BookingStatus, RevisionEntry, Stop, Trip};
use crate::storage::Storage;

use format::{leg_line, staleness_lines, stats_line, stop_line};

/// Trek — keep a multi-stop itinerary consistent.
#[derive(Debug, Parser)]
#[command(name = "trek", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Trip ID: full UUID or unambiguous prefix (e.g. `a3b`).
    /// Falls back to `default-trip` from the config.
    #[arg(long, global = true)]
    trip: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: replanning part of a journey
  1. trek trip demo
     → prints a trip ID (e.g. a3b0fc12)
  2. trek --trip a3b show
  3. trek --trip a3b extend chiang --nights 2
     → later stops shift; invalidated bookings are listed
  4. trek --trip a3b confirm "hoi an"

Reschedule with explicit dates:
  trek --trip a3b reschedule bangkok --start 2026-03-02 --end 2026-03-06"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage trips: create new ones, seed the demo itinerary, list existing.
    Trip {
        #[command(subcommand)]
        command: TripCommand,
    },

    /// Show the itinerary: stops, legs, dates, and booking state.
    /// Requires `--trip`.
    Show,

    /// Booking counters and total duration. Requires `--trip`.
    Stats,

    /// Change one stop's dates. Every later stop and leg shifts with it,
    /// keeping night counts and travel gaps; invalidated bookings are
    /// reported. Requires `--trip`.
    Reschedule {
        /// Stop to edit: id prefix or city-name prefix.
        stop: String,

        /// New check-in date (ISO 8601, e.g. 2026-03-14).
        #[arg(long)]
        start: String,

        /// New check-out date (exclusive).
        #[arg(long)]
        end: String,
    },

    /// Add or remove nights at a stop, keeping its check-in date.
    /// Requires `--trip`.
    Extend {
        /// Stop to edit: id prefix or city-name prefix.
        stop: String,

        /// Nights to add; negative to shorten the stay.
        #[arg(long, allow_negative_numbers = true)]
        nights: i32,
    },

    /// Mark a stay (or its outgoing leg) booked. Requires `--trip`.
    Book {
        /// Stop: id prefix or city-name prefix.
        stop: String,

        /// Book the leg departing this stop instead of the stay itself.
        #[arg(long)]
        leg: bool,
    },

    /// Re-confirm a booking that a date change set back to pending.
    /// Requires `--trip`.
    Confirm {
        /// Stop: id prefix or city-name prefix.
        stop: String,

        /// Confirm the leg departing this stop instead of the stay itself.
        #[arg(long)]
        leg: bool,
    },

    /// Print the revision log: every applied reschedule, oldest first.
    /// Requires `--trip`.
    Log,
}

#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Create a new empty trip. Prints the trip ID.
    New {
        /// What to call this trip.
        name: String,
    },

    /// Seed the sample itinerary. Prints the trip ID.
    Demo,

    /// List all trips.
    List,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Trip { command } => match command {
            TripCommand::New { name } => cmd_new(storage, &name),
            TripCommand::Demo => cmd_demo(storage),
            TripCommand::List => cmd_list(storage),
        },
        Command::Show => cmd_show(&require_trip(config, storage, cli.trip.as_deref())?),
        Command::Stats => cmd_stats(&require_trip(config, storage, cli.trip.as_deref())?),
        Command::Reschedule { stop, start, end } => {
            let trip = require_trip(config, storage, cli.trip.as_deref())?;
            cmd_reschedule(storage, &trip, &stop, &start, &end)
        }
        Command::Extend { stop, nights } => {
            let trip = require_trip(config, storage, cli.trip.as_deref())?;
            cmd_extend(storage, &trip, &stop, nights)
        }
        Command::Book { stop, leg } => {
            let trip = require_trip(config, storage, cli.trip.as_deref())?;
            cmd_book(storage, &trip, &stop, leg)
        }
        Command::Confirm { stop, leg } => {
            let trip = require_trip(config, storage, cli.trip.as_deref())?;
            cmd_confirm(storage, &trip, &stop, leg)
        }
        Command::Log => cmd_log(storage, &require_trip(config, storage, cli.trip.as_deref())?),
    }
}

/// Require a trip reference (flag or config default) and resolve it.
fn require_trip(
    config: &Config,
    storage: &Storage,
    trip_ref: Option<&str>,
) -> Result<Trip, String> {
    let reference = trip_ref
        .or(config.default_trip.as_deref())
        .ok_or("this command requires --trip <id> (or default-trip in the config)")?;
    resolve_trip(storage, reference)
}

fn cmd_new(storage: &Storage, name: &str) -> Result<(), String> {
    let trip = Trip::new(name);
    storage
        .create_trip(&trip)
        .map_err(|e| format!("failed to create trip: {e}"))?;

    println!("{}", trip.id);
    Ok(())
}

fn cmd_demo(storage: &Storage) -> Result<(), String> {
    let trip = demo::demo_trip();
    storage
        .create_trip(&trip)
        .map_err(|e| format!("failed to create trip: {e}"))?;

    println!("{}", trip.id);
    if let (Some(start), Some(end)) = (trip.start_date(), trip.end_date()) {
        eprintln!("Seeded {} stops, {start} → {end}", trip.stops.len());
    }
    Ok(())
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let trips = storage
        .list_trips()
        .map_err(|e| format!("failed to list trips: {e}"))?;

    if trips.is_empty() {
        println!("No trips");
        return Ok(());
    }

    for t in &trips {
        let short_id = &t.id.to_string()[..8];
        match (t.start_date(), t.end_date()) {
            (Some(start), Some(end)) => {
                println!(
                    "{short_id}  {}  {start} → {end}  ({} stops)",
                    t.name,
                    t.stops.len()
                );
            }
            _ => println!("{short_id}  {}  (no stops)", t.name),
        }
    }

    Ok(())
}

fn cmd_show(trip: &Trip) -> Result<(), String> {
    match (trip.start_date(), trip.end_date()) {
        (Some(start), Some(end)) => {
            println!(
                "{}  {start} → {end}  ({} days, v{})",
                trip.name,
                trip.duration_days(),
                trip.version
            );
        }
        _ => println!("{}  (no stops yet)", trip.name),
    }

    for (i, stop) in trip.stops.iter().enumerate() {
        println!("{}", stop_line(i + 1, stop));
        if let Some(next) = trip.stops.get(i + 1)
            && let Some(leg) = trip.leg_between(stop.id, next.id)
        {
            println!("{}", leg_line(leg, &next.city));
        }
    }

    Ok(())
}

fn cmd_stats(trip: &Trip) -> Result<(), String> {
    println!(
        "{}",
        stats_line(&trip.booking_stats(), trip.duration_days())
    );
    Ok(())
}

fn cmd_reschedule(
    storage: &Storage,
    trip: &Trip,
    stop_ref: &str,
    start: &str,
    end: &str,
) -> Result<(), String> {
    let stop = resolve_stop(trip, stop_ref)?;
    let edit = Edit::parse(stop.id, start, end)
        .map_err(|e| e.to_string())?
        .against_version(trip.version);
    apply_edit(storage, trip, &edit)
}

fn cmd_extend(storage: &Storage, trip: &Trip, stop_ref: &str, nights: i32) -> Result<(), String> {
    if nights == 0 {
        return Err("specify a non-zero number of nights".to_string());
    }
    let stop = resolve_stop(trip, stop_ref)?;
    let new_end = stop
        .end_date
        .checked_add(i64::from(nights).days())
        .map_err(|e| format!("cannot shift check-out: {e}"))?;

    let edit = Edit {
        stop_id: stop.id,
        new_start: stop.start_date,
        new_end,
        expected_version: Some(trip.version),
    };
    apply_edit(storage, trip, &edit)
}

/// Run an edit through the reschedule engine, persist the result, and
/// report what went stale.
fn apply_edit(storage: &Storage, trip: &Trip, edit: &Edit) -> Result<(), String> {
    let outcome = cascade::reschedule(trip, edit).map_err(|e| e.to_string())?;

    if outcome.trip.version == trip.version {
        eprintln!("Dates already match; nothing to change.");
        return Ok(());
    }

    storage
        .update_trip(&outcome.trip)
        .map_err(|e| format!("failed to save trip: {e}"))?;
    let entry = RevisionEntry {
        edit: edit.clone(),
        stale: outcome.stale.clone(),
        version: outcome.trip.version,
        applied_at: Timestamp::now(),
    };
    storage
        .append_revision(trip.id, &entry)
        .map_err(|e| format!("failed to record revision: {e}"))?;

    if let (Some(stop), Some(position)) = (
        outcome.trip.stop(edit.stop_id),
        outcome.trip.stop_position(edit.stop_id),
    ) {
        eprintln!(
            "Stop {position}: {} now {} → {} ({} nights)",
            stop.city,
            stop.start_date,
            stop.end_date,
            stop.nights()
        );
    }
    for line in staleness_lines(&outcome.trip, &outcome.stale) {
        eprintln!("{line}");
    }
    Ok(())
}

fn cmd_book(storage: &Storage, trip: &Trip, stop_ref: &str, leg: bool) -> Result<(), String> {
    let stop = resolve_stop(trip, stop_ref)?;
    let (stop_id, city) = (stop.id, stop.city.clone());

    let mut updated = trip.clone();
    let described = if leg {
        let outgoing = trip
            .outgoing_leg(stop_id)
            .ok_or_else(|| format!("{city} has no outgoing leg"))?;
        let (leg_id, mode) = (outgoing.id, outgoing.mode);
        let leg = updated
            .legs
            .iter_mut()
            .find(|l| l.id == leg_id)
            .ok_or_else(|| format!("{city} has no outgoing leg"))?;
        leg.booking = BookingStatus::Booked;
        format!("{} out of {city}", mode.label())
    } else {
        let stop = updated
            .stops
            .iter_mut()
            .find(|s| s.id == stop_id)
            .ok_or_else(|| format!("no stop matching '{stop_ref}'"))?;
        stop.booking = BookingStatus::Booked;
        format!("stay in {city}")
    };

    storage
        .update_trip(&updated)
        .map_err(|e| format!("failed to save trip: {e}"))?;
    eprintln!("Booked: {described}");
    Ok(())
}

fn cmd_confirm(storage: &Storage, trip: &Trip, stop_ref: &str, leg: bool) -> Result<(), String> {
    let stop = resolve_stop(trip, stop_ref)?;
    let (stop_id, city) = (stop.id, stop.city.clone());

    let mut updated = trip.clone();
    let described = if leg {
        let outgoing = trip
            .outgoing_leg(stop_id)
            .ok_or_else(|| format!("{city} has no outgoing leg"))?;
        let (leg_id, mode) = (outgoing.id, outgoing.mode);
        let leg = updated
            .legs
            .iter_mut()
            .find(|l| l.id == leg_id)
            .ok_or_else(|| format!("{city} has no outgoing leg"))?;
        if leg.booking != BookingStatus::Pending {
            return Err(format!(
                "nothing pending for the {} out of {city}",
                mode.label()
            ));
        }
        leg.booking = BookingStatus::Booked;
        format!("{} out of {city}", mode.label())
    } else {
        let stop = updated
            .stops
            .iter_mut()
            .find(|s| s.id == stop_id)
            .ok_or_else(|| format!("no stop matching '{stop_ref}'"))?;
        if stop.booking != BookingStatus::Pending {
            return Err(format!("nothing pending for the stay in {city}"));
        }
        stop.booking = BookingStatus::Booked;
        format!("stay in {city}")
    };

    storage
        .update_trip(&updated)
        .map_err(|e| format!("failed to save trip: {e}"))?;
    eprintln!("Confirmed: {described}");
    Ok(())
}

fn cmd_log(storage: &Storage, trip: &Trip) -> Result<(), String> {
    let entries = storage
        .load_revisions(trip.id)
        .map_err(|e| format!("failed to load revisions: {e}"))?;

    if entries.is_empty() {
        println!("No revisions");
        return Ok(());
    }

    for entry in &entries {
        let city = trip.stop(entry.edit.stop_id).map_or("?", |s| s.city.as_str());
        let invalidated = entry.stale.stop_ids.len() + entry.stale.leg_ids.len();
        println!(
            "v{}  {}  {city}: {} → {}  ({invalidated} invalidated)",
            entry.version,
            entry.applied_at.strftime("%Y-%m-%d %H:%M"),
            entry.edit.new_start,
            entry.edit.new_end,
        );
    }

    Ok(())
}

/// Resolve a trip reference (full UUID or unambiguous prefix) to a trip.
fn resolve_trip(storage: &Storage, reference: &str) -> Result<Trip, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_trip(id)
            .map_err(|e| format!("trip not found: {e}"));
    }

    // Try as a prefix match against all trips.
    let trips = storage
        .list_trips()
        .map_err(|e| format!("failed to list trips: {e}"))?;

    let matches: Vec<&Trip> = trips
        .iter()
        .filter(|t| t.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no trip matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches
                .iter()
                .map(|t| t.id.to_string()[..8].to_string())
                .collect();
            Err(format!(
                "'{reference}' is ambiguous — matches {n} trips: {}",
                ids.join(", ")
            ))
        }
    }
}

/// Resolve a stop reference (id prefix or city-name prefix) within a trip.
fn resolve_stop<'a>(trip: &'a Trip, reference: &str) -> Result<&'a Stop, String> {
    let needle = reference.to_lowercase();

    let matches: Vec<&Stop> = trip
        .stops
        .iter()
        .filter(|s| {
            s.id.to_string().starts_with(&needle) || s.city.to_lowercase().starts_with(&needle)
        })
        .collect();

    match matches.len() {
        0 => Err(format!("no stop matching '{reference}' in this trip")),
        1 => Ok(matches[0]),
        _ => {
            let cities: Vec<&str> = matches.iter().map(|s| s.city.as_str()).collect();
            Err(format!(
                "'{reference}' is ambiguous — matches {}",
                cities.join(", ")
            ))
        }
    }
}
