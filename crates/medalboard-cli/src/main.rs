//! Medalboard - Olympic medal statistics in the terminal.
//!
//! `medalboard` prints the home dashboard; `medalboard <country>` prints the
//! detail for one delegation. `--json` switches either to JSON output.

mod format;

use std::io;
use std::process::ExitCode;

use anyhow::{bail, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use medalboard_core::repository::LoadFailure;
use medalboard_core::views::CountryView;
use medalboard_core::{CacheState, Config, CountryPage, HomeView};

use format::{format_count, format_percent, truncate_string};

// ============================================================================
// Constants
// ============================================================================

/// Exit code when the dataset could not be loaded
const EXIT_LOAD_FAILED: u8 = 1;

/// Exit code when the requested country is not in the dataset
const EXIT_NOT_FOUND: u8 = 2;

/// Width of the country column in tables
const NAME_WIDTH: usize = 20;

const USAGE: &str = "Usage: medalboard [--json] [COUNTRY]

Without COUNTRY, prints medal totals for every delegation.
With COUNTRY (exact, case-sensitive name), prints that delegation's history.

Environment:
  MEDALBOARD_DATA          dataset file path or http(s) URL
  MEDALBOARD_TIMEOUT_SECS  HTTP timeout in seconds
  RUST_LOG                 log filter (default: warn)";

/// Initialize the tracing subscriber for logging.
/// Keep the returned guard alive so buffered log lines are flushed on exit.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    json: bool,
    help: bool,
    country: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    for arg in args {
        match arg.as_str() {
            "--json" => parsed.json = true,
            "-h" | "--help" => parsed.help = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            _ if parsed.country.is_some() => bail!("Only one country name may be given"),
            _ => parsed.country = Some(arg),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default().with_overrides(|key| std::env::var(key).ok())
        }
    };
    let repo = config.repository()?;

    // Observe first, then trigger the load from a separate task; the
    // subscription sees the terminal state whichever finishes first.
    let mut subscription = repo.observe();
    tokio::spawn({
        let repo = repo.clone();
        async move {
            repo.load().await;
        }
    });
    let state = subscription.wait_settled().await.unwrap_or_default();

    if let Some(failure) = state.failure() {
        if args.json {
            println!("{}", failure_json(failure)?);
        } else {
            eprintln!(
                "Could not load dataset from {}: {}",
                config.data_location(),
                failure.message
            );
        }
        return Ok(ExitCode::from(EXIT_LOAD_FAILED));
    }

    match args.country {
        None => print_home(&state, args.json),
        Some(name) => print_country(&state, &name, args.json),
    }
}

/// Same `{"status": "loadFailed", "detail": ...}` shape the country page uses.
fn failure_json(failure: &LoadFailure) -> Result<String> {
    Ok(serde_json::to_string_pretty(&CountryPage::LoadFailed(failure.clone()))?)
}

fn print_home(state: &CacheState, json: bool) -> Result<ExitCode> {
    let view = HomeView::from_state(state);
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Medals per country");
    println!();
    println!("  Number of Games      {:>8}", view.games);
    println!("  Number of countries  {:>8}", view.totals.total_countries);
    println!("  Participations       {:>8}", view.totals.total_participation_entries);
    println!("  Total medals         {:>8}", format_count(view.totals.total_medals));
    if let Some(cached) = state.dataset() {
        println!("  Loaded               {:>8}", cached.age_display());
    }
    println!();
    println!("  {:<width$} {:>8} {:>7}", "Country", "Medals", "Share", width = NAME_WIDTH);
    for share in &view.medals_by_country {
        println!(
            "  {:<width$} {:>8} {:>7}",
            truncate_string(&share.country, NAME_WIDTH),
            format_count(share.total_medals),
            format_percent(share.percent),
            width = NAME_WIDTH
        );
    }

    info!(countries = view.totals.total_countries, "Home view printed");
    Ok(ExitCode::SUCCESS)
}

fn print_country(state: &CacheState, name: &str, json: bool) -> Result<ExitCode> {
    let page = CountryPage::build(state, name);
    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    }

    match page {
        CountryPage::Found(view) => {
            if !json {
                print_country_view(&view);
            }
            Ok(ExitCode::SUCCESS)
        }
        CountryPage::NotFound(name) => {
            if !json {
                eprintln!("Country not found: {}", name);
            }
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
        // wait_settled only returns terminal states
        CountryPage::Loading | CountryPage::LoadFailed(_) => Ok(ExitCode::from(EXIT_LOAD_FAILED)),
    }
}

fn print_country_view(view: &CountryView) {
    println!("{}", view.name);
    println!();
    println!("  Number of entries    {:>8}", view.totals.participation_count);
    println!("  Total medals         {:>8}", format_count(view.totals.total_medals));
    println!("  Total athletes       {:>8}", format_count(view.totals.total_athletes));
    println!();
    println!("  {:<6} {:>8}", "Year", "Medals");
    for point in &view.series.points {
        println!("  {:<6} {:>8}", point.label, point.medals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args_defaults_to_home() {
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_parse_args_country_and_json() {
        let parsed = args(&["--json", "United States"]).unwrap();
        assert!(parsed.json);
        assert_eq!(parsed.country.as_deref(), Some("United States"));
    }

    #[test]
    fn test_parse_args_rejects_unknown_flag() {
        assert!(args(&["--verbose"]).is_err());
    }

    #[test]
    fn test_failure_json_uses_load_failed_status() {
        let failure = LoadFailure::from(&medalboard_core::FetchError::RateLimited(3));
        let json: serde_json::Value = serde_json::from_str(&failure_json(&failure).unwrap()).unwrap();
        assert_eq!(json["status"], "loadFailed");
        assert_eq!(json["detail"]["kind"], "Transport");
        assert_eq!(json["detail"]["message"], "Rate limited - gave up after 3 retries");
    }

    #[test]
    fn test_parse_args_rejects_second_country() {
        assert!(args(&["France", "Italy"]).is_err());
    }
}
