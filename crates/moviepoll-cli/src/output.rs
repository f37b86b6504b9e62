//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;
use serde_json::json;

use moviepoll_core::{Cycle, Movie, SettingValue, User};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single movie with its votes
    pub fn print_movie(&self, movie: &Movie) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", movie.id);
                println!("Name:        {}", movie.name);
                if !movie.description.is_empty() {
                    println!("Description: {}", movie.description);
                }
                for link in &movie.links {
                    println!("Link:        {}", link);
                }
                if !movie.poster.is_empty() {
                    println!("Poster:      {}", movie.poster);
                }
                if let Some(ref user) = movie.added_by {
                    println!("Added by:    {}", user.name);
                }
                if let Some(ref cycle) = movie.cycle_added {
                    println!("Cycle:       {}", cycle.id);
                }
                println!("Status:      {}", movie_status(movie));

                if !movie.votes.is_empty() {
                    println!();
                    println!("── Votes ({}) ──", movie.votes.len());
                    for vote in &movie.votes {
                        let voter = vote
                            .user
                            .as_ref()
                            .map(|u| u.name.as_str())
                            .unwrap_or("(deleted user)");
                        match vote.cycle_added {
                            Some(ref cycle) => println!("{} (cycle {})", voter, cycle.id),
                            None => println!("{}", voter),
                        }
                    }
                }
            }
            OutputFormat::Json => print_json(&movie_json(movie)),
            OutputFormat::Quiet => println!("{}", movie.id),
        }
    }

    /// Print a list of movies
    pub fn print_movies(&self, movies: &[Movie]) {
        match self.format {
            OutputFormat::Human => {
                if movies.is_empty() {
                    println!("No movies found.");
                    return;
                }
                for movie in movies {
                    println!(
                        "{:>4} | {:<40} | {:>3} vote(s) | {}",
                        movie.id,
                        truncate(&movie.name, 40),
                        movie.votes.len(),
                        movie_status(movie)
                    );
                }
                println!("\n{} movie(s)", movies.len());
            }
            OutputFormat::Json => {
                let movies: Vec<_> = movies.iter().map(movie_json).collect();
                print_json(&movies);
            }
            OutputFormat::Quiet => {
                for movie in movies {
                    println!("{}", movie.id);
                }
            }
        }
    }

    /// Print a single cycle
    pub fn print_cycle(&self, cycle: &Cycle) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:    {}", cycle.id);
                println!("Start: {}", cycle.start.format("%Y-%m-%d %H:%M"));
                match cycle.end {
                    Some(end) => println!("End:   {}", end.format("%Y-%m-%d %H:%M")),
                    None => println!("End:   (not set)"),
                }
            }
            OutputFormat::Json => print_json(cycle),
            OutputFormat::Quiet => println!("{}", cycle.id),
        }
    }

    /// Print a list of cycles
    pub fn print_cycles(&self, cycles: &[Cycle]) {
        match self.format {
            OutputFormat::Human => {
                if cycles.is_empty() {
                    println!("No cycles found.");
                    return;
                }
                for cycle in cycles {
                    let end = cycle
                        .end
                        .map(|e| e.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>4} | {} | {}",
                        cycle.id,
                        cycle.start.format("%Y-%m-%d"),
                        end
                    );
                }
                println!("\n{} cycle(s)", cycles.len());
            }
            OutputFormat::Json => print_json(&cycles),
            OutputFormat::Quiet => {
                for cycle in cycles {
                    println!("{}", cycle.id);
                }
            }
        }
    }

    /// Print a single user, without the password hash
    pub fn print_user(&self, user: &User) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", user.id);
                println!("Name:     {}", user.name);
                if !user.email.is_empty() {
                    println!("Email:    {}", user.email);
                }
                println!("Password: changed {}", user.pass_date.format("%Y-%m-%d"));
                println!(
                    "Notify:   cycle end {}, vote selection {}",
                    on_off(user.notify_cycle_end),
                    on_off(user.notify_vote_selection)
                );
            }
            OutputFormat::Json => print_json(&user_json(user)),
            OutputFormat::Quiet => println!("{}", user.id),
        }
    }

    /// Print a list of users
    pub fn print_users(&self, users: &[User]) {
        match self.format {
            OutputFormat::Human => {
                if users.is_empty() {
                    println!("No users found.");
                    return;
                }
                for user in users {
                    println!("{:>4} | {}", user.id, user.name);
                }
                println!("\n{} user(s)", users.len());
            }
            OutputFormat::Json => {
                let users: Vec<_> = users.iter().map(user_json).collect();
                print_json(&users);
            }
            OutputFormat::Quiet => {
                for user in users {
                    println!("{}", user.id);
                }
            }
        }
    }

    /// Print one setting
    pub fn print_setting(&self, key: &str, value: &SettingValue) {
        match self.format {
            OutputFormat::Human => println!("{} = {} ({})", key, value, value.kind()),
            OutputFormat::Json => {
                let raw = match value {
                    SettingValue::String(s) => json!(s),
                    SettingValue::Int(i) => json!(i),
                    SettingValue::Bool(b) => json!(b),
                };
                print_json(&json!({
                    "key": key,
                    "kind": value.kind().to_string(),
                    "value": raw,
                }));
            }
            OutputFormat::Quiet => println!("{}", value),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", json!({"status": "success", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

fn movie_json(movie: &Movie) -> serde_json::Value {
    json!({
        "id": movie.id,
        "name": movie.name,
        "links": movie.links,
        "description": movie.description,
        "poster": movie.poster,
        "cycle_added": movie.cycle_added.as_ref().map(|c| c.id),
        "added_by": movie.added_by.as_ref().map(|u| u.name.as_str()),
        "removed": movie.removed,
        "approved": movie.approved,
        "watched": movie.watched,
        "voters": movie
            .votes
            .iter()
            .filter_map(|v| v.user.as_ref().map(|u| u.name.as_str()))
            .collect::<Vec<_>>(),
    })
}

fn user_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "pass_date": user.pass_date,
        "notify_cycle_end": user.notify_cycle_end,
        "notify_vote_selection": user.notify_vote_selection,
    })
}

fn movie_status(movie: &Movie) -> String {
    if let Some(watched) = movie.watched {
        format!("watched {}", watched.format("%Y-%m-%d"))
    } else if movie.removed {
        "removed".to_string()
    } else if movie.approved {
        "approved".to_string()
    } else {
        "pending".to_string()
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
