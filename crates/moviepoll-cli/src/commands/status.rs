//! Status command handler

use anyhow::Result;

use moviepoll_core::{DataConnector, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.stats();
    let active = store.get_cfg_bool(moviepoll_core::ACTIVE_KEY, true)?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_file": store.path(),
                    "active": active,
                    "current_cycle": stats.current_cycle,
                    "counts": {
                        "users": stats.users,
                        "movies": stats.movies,
                        "active_movies": stats.active_movies,
                        "cycles": stats.cycles,
                        "votes": stats.votes,
                        "settings": stats.settings
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.path().display());
        }
        OutputFormat::Human => {
            println!("MoviePoll Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Location: {}", store.path().display());
            println!();
            println!("Poll:");
            println!("  Active: {}", if active { "yes" } else { "no" });
            match store.get_current_cycle() {
                Some(cycle) => {
                    println!("  Cycle:  {} (started {})", cycle.id, cycle.start.format("%Y-%m-%d"));
                    if let Some(end) = cycle.end {
                        println!("  Ends:   {}", end.format("%Y-%m-%d %H:%M"));
                    }
                }
                None => println!("  Cycle:  (none)"),
            }
            println!();
            println!("Contents:");
            println!("  Users:    {}", stats.users);
            println!(
                "  Movies:   {} ({} active)",
                stats.movies, stats.active_movies
            );
            println!("  Cycles:   {}", stats.cycles);
            println!("  Votes:    {}", stats.votes);
            println!("  Settings: {}", stats.settings);
        }
    }

    Ok(())
}
