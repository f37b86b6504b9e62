//! Cycle command handlers

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use moviepoll_core::{CycleId, DataConnector, Store};

use crate::output::Output;

/// Start a new cycle and make it current
pub fn start(store: &Store, end: Option<String>, output: &Output) -> Result<()> {
    let end = end.as_deref().map(parse_time).transpose()?;
    if let Some(end) = end {
        if end <= Utc::now() {
            bail!("Cycle end {} is in the past", end.to_rfc3339());
        }
    }

    let id = store.add_cycle(end).context("Failed to create cycle")?;
    store
        .set_current_cycle(id)
        .context("Failed to make the new cycle current")?;

    output.success(&format!("Started cycle {}", id));
    Ok(())
}

/// Show the current cycle
pub fn show(store: &Store, output: &Output) -> Result<()> {
    match store.get_current_cycle() {
        Some(cycle) => output.print_cycle(&cycle),
        None => output.message("No cycle is running."),
    }
    Ok(())
}

/// List past cycles with ids in `start..=end`
pub fn past(store: &Store, start: CycleId, end: CycleId, output: &Output) -> Result<()> {
    let cycles = store.get_past_cycles(start, end);
    output.print_cycles(&cycles);
    Ok(())
}

/// Close the current cycle: stamp its end and clear the current marker
pub fn end(store: &Store, output: &Output) -> Result<()> {
    let Some(mut cycle) = store.get_current_cycle() else {
        bail!("No cycle is running");
    };

    if !cycle.ending_set || cycle.end.map_or(true, |end| end > Utc::now()) {
        cycle.set_end(Utc::now());
    } else {
        debug!("Cycle {} keeps its scheduled end {:?}", cycle.id, cycle.end);
    }
    store.update_cycle(&cycle)?;
    store.set_current_cycle(0)?;

    output.success(&format!("Ended cycle {}", cycle.id));
    Ok(())
}

fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp {:?}, expected RFC 3339", input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_parse_time() {
        let t = parse_time("2030-01-02T03:04:05Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2030-01-02T03:04:05+00:00");

        let offset = parse_time("2030-01-02T05:04:05+02:00").unwrap();
        assert_eq!(offset, t);

        assert!(parse_time("next tuesday").is_err());
    }

    #[test]
    fn test_start_and_end() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_path(temp_dir.path().join("data.json")).unwrap();

        start(&store, Some("2999-01-01T00:00:00Z".into()), &quiet()).unwrap();
        let cycle = store.get_current_cycle().unwrap();
        assert!(cycle.ending_set);

        end(&store, &quiet()).unwrap();
        assert!(store.get_current_cycle().is_none());

        let past = store.get_past_cycles(cycle.id, cycle.id);
        assert!(past[0].end.unwrap() <= Utc::now());
    }

    #[test]
    fn test_start_rejects_past_end() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_path(temp_dir.path().join("data.json")).unwrap();

        assert!(start(&store, Some("2000-01-01T00:00:00Z".into()), &quiet()).is_err());
        assert_eq!(store.stats().cycles, 0);
    }

    #[test]
    fn test_end_without_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_path(temp_dir.path().join("data.json")).unwrap();

        assert!(end(&store, &quiet()).is_err());
    }
}
