//! Data models for MoviePoll
//!
//! Users and cycles have no outgoing references, so the same type is used
//! on disk and in memory. Movies and votes come in two shapes: the storage
//! records in [`crate::storage::schema`] reference other entities by id,
//! while [`Movie`] and [`Vote`] here carry those references resolved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user (0 = none)
pub type UserId = u32;
/// Identifier of a movie (0 = none)
pub type MovieId = u32;
/// Identifier of a cycle (0 = none)
pub type CycleId = u32;

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    /// Assigned by the store on insert
    pub id: UserId,
    /// Display and login name, unique ignoring case
    pub name: String,
    /// Password hash as produced by the caller
    pub password: String,
    /// When the password was last changed
    pub pass_date: DateTime<Utc>,
    #[serde(default)]
    pub email: String,
    /// Notify when a cycle ends
    #[serde(default)]
    pub notify_cycle_end: bool,
    /// Notify when a movie the user voted for is selected
    #[serde(default)]
    pub notify_vote_selection: bool,
}

impl User {
    /// Create a user that has not been stored yet
    pub fn new(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            password: password_hash.into(),
            pass_date: Utc::now(),
            email: String::new(),
            notify_cycle_end: false,
            notify_vote_selection: false,
        }
    }

    /// Replace the password hash and stamp the change time
    pub fn set_password(&mut self, password_hash: impl Into<String>) {
        self.password = password_hash.into();
        self.pass_date = Utc::now();
    }

    /// Whether `name` refers to this user, ignoring case
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A time-boxed voting period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Cycle {
    pub id: CycleId,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// True when `end` was chosen explicitly rather than left open
    #[serde(default)]
    pub ending_set: bool,
}

impl Cycle {
    /// Create an open-ended cycle starting at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            start,
            end: None,
            ending_set: false,
        }
    }

    /// Set an explicit end time
    pub fn set_end(&mut self, end: DateTime<Utc>) {
        self.end = Some(end);
        self.ending_set = true;
    }
}

/// A nominated movie with its relationships resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub name: String,
    pub links: Vec<String>,
    pub description: String,
    /// Poster path relative to the web root
    pub poster: String,
    /// Cycle that was current when the movie was nominated
    pub cycle_added: Option<Cycle>,
    /// User who nominated the movie
    pub added_by: Option<User>,
    pub removed: bool,
    pub approved: bool,
    /// Set once the movie has been watched; active movies have none
    pub watched: Option<DateTime<Utc>>,
    pub votes: Vec<Vote>,
}

impl Movie {
    /// Create a movie that has not been stored yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            links: Vec::new(),
            description: String::new(),
            poster: String::new(),
            cycle_added: None,
            added_by: None,
            removed: false,
            approved: false,
            watched: None,
            votes: Vec::new(),
        }
    }

    /// Add a link, ignoring duplicates
    pub fn add_link(&mut self, link: impl Into<String>) {
        let link = link.into();
        if !self.links.contains(&link) {
            self.links.push(link);
        }
    }

    /// Whether votes can still be cast for this movie
    pub fn is_votable(&self) -> bool {
        self.watched.is_none() && !self.removed
    }

    /// Mark the movie as watched now
    pub fn mark_watched(&mut self) {
        self.watched = Some(Utc::now());
    }
}

/// A vote with its relationships resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Vote {
    /// The voter, if it still exists
    pub user: Option<User>,
    pub movie_id: MovieId,
    pub movie_name: String,
    /// The cycle that was current when the vote was cast
    pub cycle_added: Option<Cycle>,
}

/// Normalize a movie title for duplicate detection
///
/// Lowercases and keeps only alphanumeric characters, so case, whitespace
/// and punctuation never distinguish two titles.
pub fn clean_movie_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("Alice", "hash");
        assert_eq!(user.id, 0);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.password, "hash");
        assert!(user.email.is_empty());
        assert!(!user.notify_cycle_end);
    }

    #[test]
    fn test_user_set_password() {
        let mut user = User::new("Alice", "old");
        let original = user.pass_date;
        std::thread::sleep(std::time::Duration::from_millis(10));
        user.set_password("new");
        assert_eq!(user.password, "new");
        assert!(user.pass_date > original);
    }

    #[test]
    fn test_user_name_matches_ignores_case() {
        let user = User::new("Alice", "hash");
        assert!(user.name_matches("alice"));
        assert!(user.name_matches("ALICE"));
        assert!(!user.name_matches("alicia"));
    }

    #[test]
    fn test_cycle_set_end() {
        let mut cycle = Cycle::new(Utc::now());
        assert!(!cycle.ending_set);
        assert!(cycle.end.is_none());

        let end = Utc::now() + chrono::Duration::days(7);
        cycle.set_end(end);
        assert!(cycle.ending_set);
        assert_eq!(cycle.end, Some(end));
    }

    #[test]
    fn test_movie_links() {
        let mut movie = Movie::new("Alien");
        movie.add_link("https://www.imdb.com/title/tt0078748/");
        movie.add_link("https://www.imdb.com/title/tt0078748/");
        assert_eq!(movie.links.len(), 1);
    }

    #[test]
    fn test_movie_votable() {
        let mut movie = Movie::new("Alien");
        assert!(movie.is_votable());

        movie.removed = true;
        assert!(!movie.is_votable());

        movie.removed = false;
        movie.mark_watched();
        assert!(!movie.is_votable());
    }

    #[test]
    fn test_clean_movie_name() {
        assert_eq!(clean_movie_name("The Matrix"), "thematrix");
        assert_eq!(clean_movie_name("the   matrix"), "thematrix");
        assert_eq!(clean_movie_name("The Matrix!"), "thematrix");
        assert_eq!(clean_movie_name("  Spirited Away (2001) "), "spiritedaway2001");
        assert_eq!(clean_movie_name("Amélie"), "amélie");
        assert_ne!(clean_movie_name("Alien"), clean_movie_name("Aliens"));
    }

    #[test]
    fn test_user_serialization_uses_pascal_case() {
        let user = User::new("Alice", "hash");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("Name").is_some());
        assert!(json.get("PassDate").is_some());
        assert!(json.get("NotifyCycleEnd").is_some());

        let parsed: User = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, user);
    }
}
