//! JSON-file-backed store
//!
//! The `Store` keeps the whole data set in memory behind one reader/writer
//! lock and rewrites the data file after every mutation.
//!
//! ## Locking
//!
//! Reads take the shared lock. Mutations take the exclusive lock for the
//! whole operation, including the write to disk, so writes are serialized
//! and readers never observe a half-applied change.
//!
//! ## Durability
//!
//! The file is replaced atomically. If saving fails the in-memory change is
//! rolled back, so the store never holds state the file does not.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?; // Creates or loads the data file
//!
//! let alice = store.add_user(&User::new("alice", hash))?;
//! let movie = store.add_movie(&Movie::new("Alien"))?;
//! store.add_vote(alice, movie)?;
//! ```

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::connector::DataConnector;
use crate::error::{Entity, Error, Result};
use crate::models::{clean_movie_name, Cycle, CycleId, Movie, MovieId, User, UserId};
use crate::resolve::resolve_movie;
use crate::settings::{SettingValue, Settings};
use crate::storage::{JsonPersistence, MovieRecord, Snapshot, VoteRecord};

/// Table sizes, for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub users: usize,
    pub movies: usize,
    pub active_movies: usize,
    pub cycles: usize,
    pub votes: usize,
    pub settings: usize,
    pub current_cycle: Option<CycleId>,
}

/// The MoviePoll data store
pub struct Store {
    persistence: JsonPersistence,
    state: RwLock<Snapshot>,
}

impl Store {
    /// Open the store at the configured location
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config)
            .with_context(|| format!("Failed to open data file {:?}", config.data_path()))
    }

    /// Open the store described by `config`
    pub fn open_with_config(config: &Config) -> Result<Self> {
        Self::open_path(config.data_path())
    }

    /// Open the data file at `path`, creating a fresh store if it is missing
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let persistence = JsonPersistence::new(path.as_ref());
        let mut snapshot = persistence.load_or_create()?;

        if snapshot.repair_next_ids()? {
            warn!(
                "Id counters in {:?} were behind the stored records; advanced to {:?}",
                persistence.path(),
                snapshot.next_ids
            );
        }

        debug!(
            "Opened store {:?}: {} users, {} movies, {} cycles, {} votes",
            persistence.path(),
            snapshot.users.len(),
            snapshot.movies.len(),
            snapshot.cycles.len(),
            snapshot.votes.len()
        );

        Ok(Self {
            persistence,
            state: RwLock::new(snapshot),
        })
    }

    /// Path of the backing data file
    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    /// Table sizes
    pub fn stats(&self) -> StoreStats {
        self.read(|state| StoreStats {
            users: state.users.len(),
            movies: state.movies.len(),
            active_movies: state.movies.iter().filter(|m| m.is_active()).count(),
            cycles: state.cycles.len(),
            votes: state.votes.len(),
            settings: state.settings.len(),
            current_cycle: state.current_cycle().map(|c| c.id),
        })
    }

    /// A copy of every setting
    pub fn settings(&self) -> Settings {
        self.read(|state| state.settings.clone())
    }

    /// Run `f` under the shared lock
    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        let state = self.state.read();
        f(&*state)
    }

    /// Run `f` under the exclusive lock and persist the result
    ///
    /// If `f` fails or the save fails, the snapshot is restored to what it
    /// was before `f` ran.
    fn write<T>(&self, f: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let mut state = self.state.write();
        let backup = state.clone();

        let value = match f(&mut *state) {
            Ok(value) => value,
            Err(e) => {
                *state = backup;
                return Err(e);
            }
        };

        if let Err(e) = self.persistence.save(&state) {
            warn!("Failed to persist store, rolling back: {}", e);
            *state = backup;
            return Err(e.into());
        }

        Ok(value)
    }
}

impl DataConnector for Store {
    // ==================== Cycles ====================

    fn get_current_cycle(&self) -> Option<Cycle> {
        self.read(|state| state.current_cycle().cloned())
    }

    fn set_current_cycle(&self, id: CycleId) -> Result<()> {
        self.write(|state| {
            if id != 0 && state.find_cycle(id).is_none() {
                return Err(Error::not_found(Entity::Cycle, id));
            }
            state.current_cycle = id;
            Ok(())
        })?;
        info!("Current cycle set to {}", id);
        Ok(())
    }

    fn add_cycle(&self, end: Option<DateTime<Utc>>) -> Result<CycleId> {
        let id = self.write(|state| {
            let mut cycle = Cycle::new(Utc::now());
            if let Some(end) = end {
                cycle.set_end(end);
            }
            cycle.id = state.next_cycle_id()?;
            let id = cycle.id;
            state.cycles.push(cycle);
            Ok(id)
        })?;
        info!("Added cycle {}", id);
        Ok(id)
    }

    fn add_old_cycle(&self, cycle: &Cycle) -> Result<CycleId> {
        let id = self.write(|state| {
            let mut cycle = cycle.clone();
            cycle.id = state.next_cycle_id()?;
            let id = cycle.id;
            state.cycles.push(cycle);
            Ok(id)
        })?;
        info!("Imported cycle {} (started {})", id, cycle.start);
        Ok(id)
    }

    fn update_cycle(&self, cycle: &Cycle) -> Result<()> {
        self.write(|state| {
            let stored = state
                .cycles
                .iter_mut()
                .find(|c| c.id == cycle.id)
                .ok_or_else(|| Error::not_found(Entity::Cycle, cycle.id))?;
            *stored = cycle.clone();
            Ok(())
        })?;
        info!("Updated cycle {}", cycle.id);
        Ok(())
    }

    fn get_past_cycles(&self, start: CycleId, end: CycleId) -> Vec<Cycle> {
        self.read(|state| {
            let mut cycles: Vec<Cycle> = state
                .cycles
                .iter()
                .filter(|c| c.id >= start && c.id <= end && c.id != state.current_cycle)
                .cloned()
                .collect();
            cycles.sort_by_key(|c| c.id);
            cycles
        })
    }

    // ==================== Movies ====================

    fn add_movie(&self, movie: &Movie) -> Result<MovieId> {
        let id = self.write(|state| {
            let added_by = match &movie.added_by {
                Some(user) => state
                    .find_user(user.id)
                    .map(|u| u.id)
                    .ok_or_else(|| Error::not_found(Entity::User, user.id))?,
                None => 0,
            };
            let cycle_id = state.current_cycle_id();
            let id = state.next_movie_id()?;
            state
                .movies
                .push(MovieRecord::denormalize(movie, id, cycle_id, added_by));
            Ok(id)
        })?;
        info!("Added movie {} ({:?})", id, movie.name);
        Ok(id)
    }

    fn get_movie(&self, id: MovieId) -> Result<Movie> {
        self.read(|state| {
            state
                .find_movie(id)
                .map(|record| resolve_movie(state, record))
                .ok_or_else(|| Error::not_found(Entity::Movie, id))
        })
    }

    fn get_active_movies(&self) -> Vec<Movie> {
        self.read(|state| {
            state
                .movies
                .iter()
                .filter(|m| m.is_active())
                .map(|m| resolve_movie(state, m))
                .collect()
        })
    }

    fn get_user_movies(&self, user_id: UserId) -> Vec<Movie> {
        self.read(|state| {
            state
                .movies
                .iter()
                .filter(|m| user_id != 0 && m.added_by == user_id)
                .map(|m| resolve_movie(state, m))
                .collect()
        })
    }

    fn update_movie(&self, movie: &Movie) -> Result<()> {
        self.write(|state| {
            let stored = state
                .movies
                .iter_mut()
                .find(|m| m.id == movie.id)
                .ok_or_else(|| Error::not_found(Entity::Movie, movie.id))?;
            // Nomination cycle and nominator are fixed at insert time
            *stored =
                MovieRecord::denormalize(movie, stored.id, stored.cycle_added_id, stored.added_by);
            Ok(())
        })?;
        info!("Updated movie {}", movie.id);
        Ok(())
    }

    fn check_movie_exists(&self, title: &str) -> bool {
        let clean = clean_movie_name(title);
        self.read(|state| {
            state
                .movies
                .iter()
                .any(|m| clean_movie_name(&m.name) == clean)
        })
    }

    // ==================== Users ====================

    fn add_user(&self, user: &User) -> Result<UserId> {
        let id = self.write(|state| {
            if user.id != 0 && state.find_user(user.id).is_some() {
                return Err(Error::AlreadyExists(format!(
                    "User already exists with ID {}",
                    user.id
                )));
            }
            if state.find_user_by_name(&user.name).is_some() {
                return Err(Error::AlreadyExists(format!(
                    "User already exists with name {}",
                    user.name
                )));
            }

            let mut user = user.clone();
            user.id = state.next_user_id()?;
            let id = user.id;
            state.users.push(user);
            Ok(id)
        })?;
        info!("Added user {} ({:?})", id, user.name);
        Ok(id)
    }

    fn get_user(&self, id: UserId) -> Result<User> {
        self.read(|state| {
            state
                .find_user(id)
                .cloned()
                .ok_or_else(|| Error::not_found(Entity::User, id))
        })
    }

    fn get_users(&self, start: UserId, count: usize) -> Vec<User> {
        self.read(|state| {
            let mut users: Vec<&User> = state.users.iter().filter(|u| u.id >= start).collect();
            users.sort_by_key(|u| u.id);
            users.into_iter().take(count).cloned().collect()
        })
    }

    fn user_login(&self, name: &str, password_hash: &str) -> Result<User> {
        self.read(|state| match state.find_user_by_name(name) {
            Some(user) if user.password == password_hash => Ok(user.clone()),
            Some(_) => {
                warn!("Bad password for user {:?}", name);
                Err(Error::InvalidCredentials)
            }
            None => {
                warn!("Login attempt for unknown user {:?}", name);
                Err(Error::InvalidCredentials)
            }
        })
    }

    fn update_user(&self, user: &User) -> Result<()> {
        self.write(|state| {
            if state
                .users
                .iter()
                .any(|u| u.id != user.id && u.name_matches(&user.name))
            {
                return Err(Error::AlreadyExists(format!(
                    "User already exists with name {}",
                    user.name
                )));
            }

            let stored = state
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| Error::not_found(Entity::User, user.id))?;
            *stored = user.clone();
            Ok(())
        })?;
        info!("Updated user {}", user.id);
        Ok(())
    }

    fn check_user_exists(&self, name: &str) -> bool {
        self.read(|state| state.find_user_by_name(name).is_some())
    }

    fn get_user_count(&self) -> usize {
        self.read(|state| state.users.len())
    }

    // ==================== Votes ====================

    fn add_vote(&self, user_id: UserId, movie_id: MovieId) -> Result<()> {
        self.write(|state| {
            // Movie state is checked first: a watched movie rejects every vote
            let movie = state
                .find_movie(movie_id)
                .ok_or_else(|| Error::not_found(Entity::Movie, movie_id))?;
            if movie.watched.is_some() {
                return Err(Error::InvalidState(
                    "Movie has already been watched".to_string(),
                ));
            }
            if movie.removed {
                return Err(Error::InvalidState(
                    "Movie has been removed by a mod or admin".to_string(),
                ));
            }

            if state.find_user(user_id).is_none() {
                return Err(Error::not_found(Entity::User, user_id));
            }

            let cycle_id = state.current_cycle_id();
            state.votes.push(VoteRecord {
                user_id,
                movie_id,
                cycle_id,
            });
            Ok(())
        })?;
        info!("User {} voted for movie {}", user_id, movie_id);
        Ok(())
    }

    fn delete_vote(&self, user_id: UserId, movie_id: MovieId) -> Result<()> {
        self.write(|state| {
            let before = state.votes.len();
            state
                .votes
                .retain(|v| !(v.user_id == user_id && v.movie_id == movie_id));
            if state.votes.len() == before {
                return Err(Error::not_found(Entity::Vote, movie_id));
            }
            Ok(())
        })?;
        info!("User {} removed vote for movie {}", user_id, movie_id);
        Ok(())
    }

    fn user_voted_for_movie(&self, user_id: UserId, movie_id: MovieId) -> bool {
        self.read(|state| {
            state
                .votes
                .iter()
                .any(|v| v.user_id == user_id && v.movie_id == movie_id)
        })
    }

    fn get_user_votes(&self, user_id: UserId) -> Vec<Movie> {
        self.read(|state| {
            state
                .votes
                .iter()
                .filter(|v| v.user_id == user_id)
                .filter_map(|v| state.find_movie(v.movie_id))
                .map(|record| resolve_movie(state, record))
                .collect()
        })
    }

    // ==================== Settings ====================

    fn get_cfg_string(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.read(|state| state.settings.get_string(key, default)))
    }

    fn get_cfg_int(&self, key: &str, default: i64) -> Result<i64> {
        self.read(|state| state.settings.get_int(key, default))
    }

    fn get_cfg_bool(&self, key: &str, default: bool) -> Result<bool> {
        self.read(|state| state.settings.get_bool(key, default))
    }

    fn set_cfg_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_setting(key, SettingValue::String(value.to_string()))
    }

    fn set_cfg_int(&self, key: &str, value: i64) -> Result<()> {
        self.set_setting(key, SettingValue::Int(value))
    }

    fn set_cfg_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_setting(key, SettingValue::Bool(value))
    }

    fn delete_cfg_key(&self, key: &str) -> Result<()> {
        self.write(|state| {
            state.settings.remove(key);
            Ok(())
        })?;
        info!("Deleted setting {:?}", key);
        Ok(())
    }
}

impl Store {
    /// Overwrite a setting's kind and value
    pub fn set_setting(&self, key: &str, value: SettingValue) -> Result<()> {
        debug!("Setting {:?} = {} ({})", key, value, value.kind());
        self.write(|state| {
            state.settings.set(key, value);
            Ok(())
        })?;
        info!("Updated setting {:?}", key);
        Ok(())
    }
}
