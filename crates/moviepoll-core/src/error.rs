//! Store error type
//!
//! Lookup and validation failures are meant to be shown to users; storage
//! failures wrap a [`StorageError`] with the offending path.

use std::fmt;

use thiserror::Error;

use crate::settings::SettingKind;
use crate::storage::StorageError;

/// Kind of entity a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Movie,
    Cycle,
    /// A vote, looked up by the movie it was cast for
    Vote,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "User",
            Entity::Movie => "Movie",
            Entity::Cycle => "Cycle",
            Entity::Vote => "Vote for movie",
        };
        f.write_str(name)
    }
}

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: Entity, id: u32 },

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Setting {key:?} holds {value:?}, which is not a valid {kind}")]
    Parse {
        key: String,
        kind: SettingKind,
        value: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Error {
    pub(crate) fn not_found(entity: Entity, id: u32) -> Self {
        Error::NotFound { entity, id }
    }

    /// True for lookup misses
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;
