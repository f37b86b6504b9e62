//! User command handlers

use anyhow::Result;

use moviepoll_core::{DataConnector, Store, UserId};

use crate::output::{Output, OutputFormat};

/// List users in id order
pub fn list(store: &Store, start: UserId, count: usize, output: &Output) -> Result<()> {
    let users = store.get_users(start, count);
    output.print_users(&users);
    Ok(())
}

/// Show a user with their nominations and votes
pub fn show(store: &Store, id: UserId, output: &Output) -> Result<()> {
    let user = store.get_user(id)?;
    output.print_user(&user);
    if output.format != OutputFormat::Human {
        return Ok(());
    }

    let nominated = store.get_user_movies(id);
    let voted = store.get_user_votes(id);
    output.message("");
    output.message(&format!("Nominated ({}):", nominated.len()));
    for movie in &nominated {
        output.message(&format!("  {:>4} {}", movie.id, movie.name));
    }
    output.message(&format!("Voted for ({}):", voted.len()));
    for movie in &voted {
        output.message(&format!("  {:>4} {}", movie.id, movie.name));
    }
    Ok(())
}
