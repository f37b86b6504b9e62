//! MoviePoll Core Library
//!
//! This crate provides the data-access core of MoviePoll, a small web
//! application where users nominate movies and vote on them in cycles.
//!
//! # Architecture
//!
//! - **JSON file**: the whole data set lives in one pretty-printed JSON
//!   document, rewritten atomically after every mutation
//! - **Records vs. views**: movies and votes are stored with id references
//!   and resolved into full objects when read
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! let user = store.add_user(&User::new("alice", hash))?;
//! let movie = store.add_movie(&Movie::new("Alien"))?;
//! store.add_vote(user, movie)?;
//!
//! for movie in store.get_active_movies() {
//!     println!("{} ({} votes)", movie.name, movie.votes.len());
//! }
//! ```
//!
//! # Modules
//!
//! - `connector`: the `DataConnector` interface handlers program against
//! - `store`: the JSON-file implementation of it (main entry point)
//! - `models`: users, cycles, movies and votes
//! - `settings`: typed key/value configuration stored with the data
//! - `resolve`: joins from stored records to resolved views
//! - `storage`: on-disk schema and atomic persistence
//! - `config`: application configuration

pub mod config;
pub mod connector;
pub mod error;
pub mod models;
pub mod resolve;
pub mod settings;
pub mod storage;
pub mod store;

pub use config::Config;
pub use connector::DataConnector;
pub use error::{Entity, Error, Result};
pub use models::{clean_movie_name, Cycle, CycleId, Movie, MovieId, User, UserId, Vote};
pub use settings::{SettingKind, SettingValue, Settings, ACTIVE_KEY};
pub use storage::{StorageError, StorageResult};
pub use store::{Store, StoreStats};
