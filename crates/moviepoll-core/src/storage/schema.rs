//! Layout of the persisted data file
//!
//! The whole store is one JSON document:
//!
//! ```text
//! {
//!   "CurrentCycle": 3,
//!   "Cycles":   [ { "Id", "Start", "End", "EndingSet" } ],
//!   "Movies":   [ { "Id", "Name", "Links", "Description", "CycleAddedId",
//!                   "AddedBy", "Removed", "Approved", "Watched", "Poster" } ],
//!   "Users":    [ { "Id", "Name", "Password", "PassDate", "Email", ... } ],
//!   "Votes":    [ { "UserId", "MovieId", "CycleId" } ],
//!   "Settings": { "Active": { "Type": 2, "Value": true } },
//!   "NextIds":  { "Cycle", "Movie", "User" }
//! }
//! ```
//!
//! Records here reference other entities only by id. Nothing in this module
//! locks; callers hold the store guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Cycle, CycleId, Movie, MovieId, User, UserId};
use crate::settings::Settings;

use super::error::{StorageError, StorageResult};

/// Storage form of a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MovieRecord {
    pub id: MovieId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Cycle current at nomination time, 0 if none
    #[serde(default)]
    pub cycle_added_id: CycleId,
    /// Nominating user, 0 if unknown
    #[serde(default)]
    pub added_by: UserId,
    #[serde(default)]
    pub removed: bool,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub watched: Option<DateTime<Utc>>,
    #[serde(default)]
    pub poster: String,
}

impl MovieRecord {
    /// Build the storage form of `movie`
    ///
    /// The movie's own id and relationship fields are ignored; the store
    /// decides them.
    pub fn denormalize(movie: &Movie, id: MovieId, cycle_added_id: CycleId, added_by: UserId) -> Self {
        Self {
            id,
            name: movie.name.clone(),
            links: movie.links.clone(),
            description: movie.description.clone(),
            cycle_added_id,
            added_by,
            removed: movie.removed,
            approved: movie.approved,
            watched: movie.watched,
            poster: movie.poster.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.watched.is_none()
    }
}

/// Storage form of a vote
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct VoteRecord {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Cycle current when the vote was cast, 0 if none
    pub cycle_id: CycleId,
}

/// Next identifier to hand out, per table
///
/// Counters only move forward so ids are never reused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NextIds {
    pub cycle: CycleId,
    pub movie: MovieId,
    pub user: UserId,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            cycle: 1,
            movie: 1,
            user: 1,
        }
    }
}

/// The complete persisted state of a store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    #[serde(default)]
    pub current_cycle: CycleId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cycles: Vec<Cycle>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub movies: Vec<MovieRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: Vec<VoteRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: Settings,
    #[serde(default)]
    pub next_ids: NextIds,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// State of a brand new store
    pub fn new() -> Self {
        Self {
            current_cycle: 0,
            cycles: Vec::new(),
            movies: Vec::new(),
            users: Vec::new(),
            votes: Vec::new(),
            settings: Settings::with_defaults(),
            next_ids: NextIds::default(),
        }
    }

    /// Raise every id counter to at least `max(existing id) + 1`
    ///
    /// Returns true if any counter moved. Fails if a stored id is already
    /// the largest representable one.
    pub fn repair_next_ids(&mut self) -> StorageResult<bool> {
        let before = self.next_ids;

        let max_cycle = self.cycles.iter().map(|c| c.id).max().unwrap_or(0);
        let max_movie = self.movies.iter().map(|m| m.id).max().unwrap_or(0);
        let max_user = self.users.iter().map(|u| u.id).max().unwrap_or(0);

        self.next_ids.cycle = self.next_ids.cycle.max(successor(max_cycle, "cycle")?);
        self.next_ids.movie = self.next_ids.movie.max(successor(max_movie, "movie")?);
        self.next_ids.user = self.next_ids.user.max(successor(max_user, "user")?);

        Ok(self.next_ids != before)
    }

    pub fn next_cycle_id(&mut self) -> StorageResult<CycleId> {
        take_id(&mut self.next_ids.cycle, "cycle")
    }

    pub fn next_movie_id(&mut self) -> StorageResult<MovieId> {
        take_id(&mut self.next_ids.movie, "movie")
    }

    pub fn next_user_id(&mut self) -> StorageResult<UserId> {
        take_id(&mut self.next_ids.user, "user")
    }

    /// The designated current cycle, if it exists
    pub fn current_cycle(&self) -> Option<&Cycle> {
        if self.current_cycle == 0 {
            return None;
        }
        self.find_cycle(self.current_cycle)
    }

    /// Id of the current cycle, 0 when there is none or it is stale
    pub fn current_cycle_id(&self) -> CycleId {
        self.current_cycle().map(|c| c.id).unwrap_or(0)
    }

    pub fn find_cycle(&self, id: CycleId) -> Option<&Cycle> {
        self.cycles.iter().find(|c| c.id == id)
    }

    pub fn find_movie(&self, id: MovieId) -> Option<&MovieRecord> {
        self.movies.iter().find(|m| m.id == id)
    }

    pub fn find_user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Look up a user by name, ignoring case
    pub fn find_user_by_name(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name_matches(name))
    }
}

/// Hand out `counter` and advance it
///
/// The counter only moves on success, so an exhausted table stays exhausted
/// instead of wrapping around to ids that are already taken.
fn take_id(counter: &mut u32, table: &'static str) -> StorageResult<u32> {
    let id = *counter;
    *counter = successor(id, table)?;
    Ok(id)
}

fn successor(id: u32, table: &'static str) -> StorageResult<u32> {
    id.checked_add(1)
        .ok_or(StorageError::IdsExhausted { table })
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingValue, ACTIVE_KEY};

    #[test]
    fn test_new_snapshot() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.current_cycle, 0);
        assert!(snapshot.cycles.is_empty());
        assert_eq!(
            snapshot.settings.get(ACTIVE_KEY),
            Some(&SettingValue::Bool(true))
        );
        assert_eq!(snapshot.next_ids, NextIds::default());
    }

    #[test]
    fn test_next_ids_advance() {
        let mut snapshot = Snapshot::new();
        assert_eq!(snapshot.next_movie_id().unwrap(), 1);
        assert_eq!(snapshot.next_movie_id().unwrap(), 2);
        assert_eq!(snapshot.next_user_id().unwrap(), 1);
        assert_eq!(snapshot.next_cycle_id().unwrap(), 1);
        assert_eq!(snapshot.next_movie_id().unwrap(), 3);
    }

    #[test]
    fn test_repair_next_ids() {
        let mut snapshot = Snapshot::new();
        let mut user = User::new("alice", "hash");
        user.id = 9;
        snapshot.users.push(user);

        assert!(snapshot.repair_next_ids().unwrap());
        assert_eq!(snapshot.next_ids.user, 10);
        assert_eq!(snapshot.next_ids.movie, 1);

        // Already consistent
        assert!(!snapshot.repair_next_ids().unwrap());
    }

    #[test]
    fn test_repair_rejects_largest_id() {
        let mut snapshot = Snapshot::new();
        snapshot
            .movies
            .push(MovieRecord::denormalize(&Movie::new("X"), u32::MAX, 0, 0));

        assert!(matches!(
            snapshot.repair_next_ids(),
            Err(StorageError::IdsExhausted { table: "movie" })
        ));
    }

    #[test]
    fn test_next_id_does_not_wrap() {
        let mut snapshot = Snapshot::new();
        snapshot.next_ids.user = u32::MAX - 1;

        assert_eq!(snapshot.next_user_id().unwrap(), u32::MAX - 1);
        assert!(matches!(
            snapshot.next_user_id(),
            Err(StorageError::IdsExhausted { table: "user" })
        ));
        // Still exhausted, never wrapped back to 0
        assert_eq!(snapshot.next_ids.user, u32::MAX);
        assert!(snapshot.next_user_id().is_err());
    }

    #[test]
    fn test_repair_never_lowers_counters() {
        let mut snapshot = Snapshot::new();
        snapshot.next_ids.movie = 50;
        snapshot.repair_next_ids().unwrap();
        assert_eq!(snapshot.next_ids.movie, 50);
    }

    #[test]
    fn test_current_cycle_stale_reference() {
        let mut snapshot = Snapshot::new();
        let mut cycle = Cycle::new(Utc::now());
        cycle.id = 1;
        snapshot.cycles.push(cycle);

        snapshot.current_cycle = 1;
        assert_eq!(snapshot.current_cycle_id(), 1);

        snapshot.current_cycle = 4;
        assert!(snapshot.current_cycle().is_none());
        assert_eq!(snapshot.current_cycle_id(), 0);
    }

    #[test]
    fn test_denormalize_uses_store_fields() {
        let mut movie = Movie::new("Alien");
        movie.id = 77;
        movie.description = "In space no one can hear you scream.".to_string();
        movie.approved = true;

        let record = MovieRecord::denormalize(&movie, 3, 2, 5);
        assert_eq!(record.id, 3);
        assert_eq!(record.cycle_added_id, 2);
        assert_eq!(record.added_by, 5);
        assert_eq!(record.name, "Alien");
        assert!(record.approved);
        assert!(record.is_active());
    }

    #[test]
    fn test_load_document_with_nulls_and_no_counters() {
        let json = r#"{
            "CurrentCycle": 0,
            "Cycles": null,
            "Movies": [
                {"Id": 4, "Name": "Alien", "Links": null, "Description": "",
                 "CycleAddedId": 0, "Removed": false, "Approved": false,
                 "Watched": null, "Poster": ""}
            ],
            "Users": null,
            "Votes": null,
            "Settings": {"Active": {"Type": 2, "Value": true}}
        }"#;

        let mut snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.cycles.is_empty());
        assert!(snapshot.movies[0].links.is_empty());
        assert_eq!(snapshot.movies[0].added_by, 0);

        snapshot.repair_next_ids().unwrap();
        assert_eq!(snapshot.next_movie_id().unwrap(), 5);
    }

    #[test]
    fn test_snapshot_keys_are_pascal_case() {
        let json = serde_json::to_value(Snapshot::new()).unwrap();
        for key in [
            "CurrentCycle",
            "Cycles",
            "Movies",
            "Users",
            "Votes",
            "Settings",
            "NextIds",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }
}
