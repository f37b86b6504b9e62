//! Movie command handlers

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use moviepoll_core::{DataConnector, Movie, MovieId, Store};

use crate::output::Output;

/// Nominate a movie
pub fn add(
    store: &Store,
    name: String,
    links: Vec<String>,
    description: Option<String>,
    output: &Output,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Movie name cannot be empty");
    }
    if store.check_movie_exists(&name) {
        warn!("Rejected duplicate nomination {:?}", name);
        bail!("A movie named {:?} has already been nominated", name);
    }

    let mut movie = Movie::new(name.trim());
    for link in links {
        movie.add_link(link);
    }
    if let Some(description) = description {
        movie.description = description;
    }

    let id = store.add_movie(&movie).context("Failed to add movie")?;
    output.success(&format!("Added movie {}", id));
    Ok(())
}

/// List movies that have not been watched yet
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let movies = store.get_active_movies();
    output.print_movies(&movies);
    Ok(())
}

/// Show a single movie
pub fn show(store: &Store, id: MovieId, output: &Output) -> Result<()> {
    let movie = store.get_movie(id)?;
    output.print_movie(&movie);
    Ok(())
}

/// Mark a movie as watched
pub fn watched(store: &Store, id: MovieId, output: &Output) -> Result<()> {
    let mut movie = store.get_movie(id)?;
    if movie.watched.is_some() {
        debug!("Movie {} already watched at {:?}", id, movie.watched);
        output.message(&format!("Movie {} was already watched.", id));
        return Ok(());
    }

    movie.mark_watched();
    store.update_movie(&movie)?;
    output.success(&format!("Marked {:?} as watched", movie.name));
    Ok(())
}

/// Remove a movie from the ballot
pub fn remove(store: &Store, id: MovieId, output: &Output) -> Result<()> {
    let mut movie = store.get_movie(id)?;
    movie.removed = true;
    store.update_movie(&movie)?;
    output.success(&format!("Removed {:?}", movie.name));
    Ok(())
}

/// Approve a nominated movie
pub fn approve(store: &Store, id: MovieId, output: &Output) -> Result<()> {
    let mut movie = store.get_movie(id)?;
    movie.approved = true;
    store.update_movie(&movie)?;
    output.success(&format!("Approved {:?}", movie.name));
    Ok(())
}
