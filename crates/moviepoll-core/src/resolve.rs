//! Read-time joins from storage records to resolved views
//!
//! Pure functions over a [`Snapshot`]; references to missing entities
//! resolve to `None` instead of failing.

use crate::models::{Movie, Vote};
use crate::storage::{MovieRecord, Snapshot, VoteRecord};

/// Resolve a stored movie, including its votes
pub fn resolve_movie(snapshot: &Snapshot, record: &MovieRecord) -> Movie {
    Movie {
        id: record.id,
        name: record.name.clone(),
        links: record.links.clone(),
        description: record.description.clone(),
        poster: record.poster.clone(),
        cycle_added: snapshot.find_cycle(record.cycle_added_id).cloned(),
        added_by: snapshot.find_user(record.added_by).cloned(),
        removed: record.removed,
        approved: record.approved,
        watched: record.watched,
        votes: resolve_votes_for(snapshot, record),
    }
}

/// Resolve every vote cast for `record`, in the order they were cast
pub fn resolve_votes_for(snapshot: &Snapshot, record: &MovieRecord) -> Vec<Vote> {
    snapshot
        .votes
        .iter()
        .filter(|v| v.movie_id == record.id)
        .map(|v| resolve_vote(snapshot, v, record))
        .collect()
}

/// Resolve one vote against the movie it belongs to
pub fn resolve_vote(snapshot: &Snapshot, vote: &VoteRecord, movie: &MovieRecord) -> Vote {
    Vote {
        user: snapshot.find_user(vote.user_id).cloned(),
        movie_id: movie.id,
        movie_name: movie.name.clone(),
        cycle_added: snapshot.find_cycle(vote.cycle_id).cloned(),
    }
}
