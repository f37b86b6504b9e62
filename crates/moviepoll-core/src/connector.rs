//! The data interface consumed by the web layer
//!
//! Handlers only see this trait, so they can be driven by the JSON
//! [`Store`](crate::Store) or by any other backend.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Cycle, CycleId, Movie, MovieId, User, UserId};

/// Operations a storage backend provides
///
/// Every method is atomic with respect to every other method on the same
/// backend. Mutations are durable once they return `Ok`.
pub trait DataConnector: Send + Sync {
    // ==================== Cycles ====================

    /// The cycle designated as current, if any
    fn get_current_cycle(&self) -> Option<Cycle>;

    /// Designate the current cycle; 0 clears it
    fn set_current_cycle(&self, id: CycleId) -> Result<()>;

    /// Start a new cycle now, optionally with an explicit end
    fn add_cycle(&self, end: Option<DateTime<Utc>>) -> Result<CycleId>;

    /// Import a complete cycle record; only its id is reassigned
    fn add_old_cycle(&self, cycle: &Cycle) -> Result<CycleId>;

    /// Replace the stored cycle with the same id
    fn update_cycle(&self, cycle: &Cycle) -> Result<()>;

    /// Cycles with ids in `start..=end`, excluding the current one
    fn get_past_cycles(&self, start: CycleId, end: CycleId) -> Vec<Cycle>;

    // ==================== Movies ====================

    /// Nominate a movie in the current cycle
    fn add_movie(&self, movie: &Movie) -> Result<MovieId>;

    fn get_movie(&self, id: MovieId) -> Result<Movie>;

    /// All movies that have not been watched yet
    fn get_active_movies(&self) -> Vec<Movie>;

    /// All movies nominated by a user
    fn get_user_movies(&self, user_id: UserId) -> Vec<Movie>;

    /// Replace the editable fields of a stored movie
    fn update_movie(&self, movie: &Movie) -> Result<()>;

    /// Whether a movie with an equivalent title was already nominated
    fn check_movie_exists(&self, title: &str) -> bool;

    // ==================== Users ====================

    fn add_user(&self, user: &User) -> Result<UserId>;

    fn get_user(&self, id: UserId) -> Result<User>;

    /// Up to `count` users with id >= `start`, in id order
    fn get_users(&self, start: UserId, count: usize) -> Vec<User>;

    /// The user whose name and password hash both match
    fn user_login(&self, name: &str, password_hash: &str) -> Result<User>;

    fn update_user(&self, user: &User) -> Result<()>;

    fn check_user_exists(&self, name: &str) -> bool;

    fn get_user_count(&self) -> usize;

    // ==================== Votes ====================

    /// Record a vote in the current cycle
    fn add_vote(&self, user_id: UserId, movie_id: MovieId) -> Result<()>;

    fn delete_vote(&self, user_id: UserId, movie_id: MovieId) -> Result<()>;

    fn user_voted_for_movie(&self, user_id: UserId, movie_id: MovieId) -> bool;

    /// Movies the user voted for
    fn get_user_votes(&self, user_id: UserId) -> Vec<Movie>;

    // ==================== Settings ====================

    fn get_cfg_string(&self, key: &str, default: &str) -> Result<String>;

    fn get_cfg_int(&self, key: &str, default: i64) -> Result<i64>;

    fn get_cfg_bool(&self, key: &str, default: bool) -> Result<bool>;

    fn set_cfg_string(&self, key: &str, value: &str) -> Result<()>;

    fn set_cfg_int(&self, key: &str, value: i64) -> Result<()>;

    fn set_cfg_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Remove a setting; missing keys are not an error
    fn delete_cfg_key(&self, key: &str) -> Result<()>;
}
