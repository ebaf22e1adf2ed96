//! Local persistence for trips and their revision logs.
//!
//! Each trip lives in its own directory under the storage root:
//!
//! ```text
//! <root>/<uuid>/
//!   trip.json        # latest itinerary snapshot
//!   revisions.jsonl  # append-only log of applied reschedules
//! ```
//!
//! Snapshots are replaced whole: a reschedule writes the complete new
//! trip, so a reader always sees either the old itinerary or the new
//! one, never a half-updated file.

use std::{fs, io, path::PathBuf};

// Traits must be in scope for `.lines()` on BufReader and `.write_all()` on File.
use io::{BufRead, Write};

use uuid::Uuid;

use crate::model::{RevisionEntry, Trip, TripError};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("trip already exists: {0}")]
    TripAlreadyExists(Uuid),

    #[error("snapshot on disk is at version {on_disk}, refusing to write stale version {incoming}")]
    VersionConflict { on_disk: u64, incoming: u64 },

    #[error("snapshot for trip {id} is inconsistent: {source}")]
    Corrupt { id: Uuid, source: TripError },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage for trips and revision logs.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.trek/trips/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".trek").join("trips"))
    }

    // ── Trips ──

    /// Creates a new trip, writing its snapshot to disk.
    pub fn create_trip(&self, trip: &Trip) -> Result<()> {
        let dir = self.trip_dir(trip.id);
        if dir.exists() {
            return Err(StorageError::TripAlreadyExists(trip.id));
        }
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(trip)?;
        fs::write(dir.join("trip.json"), json)?;
        Ok(())
    }

    /// Replaces a trip's snapshot on disk.
    ///
    /// Refuses a snapshot older than the one on disk: a lower version
    /// means the caller rescheduled against a superseded snapshot and
    /// must reload. Equal versions are fine; booking-state changes
    /// replace the snapshot without a reschedule.
    pub fn update_trip(&self, trip: &Trip) -> Result<()> {
        let current = self.load_trip(trip.id)?;
        if trip.version < current.version {
            return Err(StorageError::VersionConflict {
                on_disk: current.version,
                incoming: trip.version,
            });
        }
        let json = serde_json::to_string_pretty(trip)?;
        fs::write(self.trip_dir(trip.id).join("trip.json"), json)?;
        Ok(())
    }

    /// Loads a single trip's snapshot, checking itinerary invariants.
    pub fn load_trip(&self, id: Uuid) -> Result<Trip> {
        let path = self.trip_dir(id).join("trip.json");
        if !path.exists() {
            return Err(StorageError::TripNotFound(id));
        }
        let json = fs::read_to_string(path)?;
        let trip: Trip = serde_json::from_str(&json)?;
        trip.validate()
            .map_err(|source| StorageError::Corrupt { id, source })?;
        Ok(trip)
    }

    /// Lists all trips by reading each trip directory's snapshot.
    pub fn list_trips(&self) -> Result<Vec<Trip>> {
        let mut trips = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(trips),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path().join("trip.json");
            if path.is_file() {
                let json = fs::read_to_string(&path)?;
                trips.push(serde_json::from_str(&json)?);
            }
        }
        trips.sort_by(|a: &Trip, b: &Trip| a.created_at.cmp(&b.created_at));
        Ok(trips)
    }

    // ── Revision log ──

    /// Appends a revision entry to a trip's log.
    pub fn append_revision(&self, trip_id: Uuid, entry: &RevisionEntry) -> Result<()> {
        let dir = self.trip_dir(trip_id);
        if !dir.exists() {
            return Err(StorageError::TripNotFound(trip_id));
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("revisions.jsonl"))?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Loads all revision entries for a trip, oldest first.
    pub fn load_revisions(&self, trip_id: Uuid) -> Result<Vec<RevisionEntry>> {
        let path = self.trip_dir(trip_id).join("revisions.jsonl");
        if !path.exists() {
            if !self.trip_dir(trip_id).exists() {
                return Err(StorageError::TripNotFound(trip_id));
            }
            return Ok(Vec::new());
        }
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.is_empty() {
                entries.push(serde_json::from_str(&line)?);
            }
        }
        Ok(entries)
    }

    fn trip_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }
}
