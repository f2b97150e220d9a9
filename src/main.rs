// iCal Agenda
// Main entry point

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde_json::json;

use ical_agenda::models::calendar_source::CalendarSource;
use ical_agenda::services::agenda::{self, AgendaSlot};
use ical_agenda::services::calendar_sync::{CalendarFeed, RefreshOutcome};

struct CliOptions {
    config_path: PathBuf,
    watch: bool,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    let options = parse_args(&args)?;
    let source = CalendarSource::load(&options.config_path)?;

    log::info!("Starting iCal Agenda for '{}'", source.name);
    let feed = Arc::new(CalendarFeed::from_source(source)?);

    if !options.watch {
        refresh(&feed).await?;
        print_agenda(&feed, options.json);
        return Ok(());
    }

    loop {
        match refresh(&feed).await {
            Ok(RefreshOutcome::Refreshed { .. }) => print_agenda(&feed, options.json),
            Ok(_) => {}
            Err(err) => log::error!("Refresh failed: {:#}", err),
        }

        let wait = feed
            .next_due_in(Utc::now())
            .saturating_add(StdDuration::from_secs(1));
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions {
        config_path: CalendarSource::default_path(),
        watch: false,
        json: false,
    };
    let mut config_seen = false;

    for arg in args {
        match arg.as_str() {
            "--watch" => options.watch = true,
            "--json" => options.json = true,
            flag if flag.starts_with('-') => return Err(anyhow!("Unknown option '{}'", flag)),
            path if !config_seen => {
                options.config_path = PathBuf::from(path);
                config_seen = true;
            }
            extra => return Err(anyhow!("Unexpected argument '{}'", extra)),
        }
    }

    Ok(options)
}

async fn refresh(feed: &Arc<CalendarFeed>) -> Result<RefreshOutcome> {
    let outcome = Arc::clone(feed)
        .refresh_in_background()
        .await
        .context("Refresh task failed")??;
    Ok(outcome)
}

fn print_agenda(feed: &CalendarFeed, as_json: bool) {
    let now = Utc::now();
    let snapshot = feed.snapshot();
    let source = feed.source();

    let slots = agenda::upcoming_slots(&snapshot.occurrences, source.max_events, &source.filter_keyword, now);
    let next = agenda::next_event(&snapshot, &source.filter_keyword, now);

    if as_json {
        let document = json!({
            "calendar": source.name,
            "next": next.as_ref().map(|event| event.to_json()),
            "events": slots.iter().map(AgendaSlot::to_json).collect::<Vec<_>>(),
        });
        println!("{}", document);
        return;
    }

    println!("{}", source.name);
    match next {
        Some(event) => {
            let reminder = if event.offset_reached { " [reminder due]" } else { "" };
            println!(
                "Next: {} ({} - {}){}",
                event.occurrence.summary,
                event.occurrence.start.format("%Y-%m-%d %H:%M"),
                event.occurrence.end.format("%Y-%m-%d %H:%M"),
                reminder
            );
        }
        None => println!("Next: none"),
    }

    for slot in &slots {
        println!("  {}. {} (eta {} days)", slot.index + 1, slot.state_label(), slot.eta_days);
        if !slot.location.is_empty() {
            println!("       @ {}", slot.location);
        }
    }
}

fn print_help() {
    println!(
        "iCal Agenda v{} - upcoming events from an iCalendar feed",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    ical-agenda [CONFIG] [--watch] [--json]");
    println!();
    println!("OPTIONS:");
    println!("    CONFIG        Path to the TOML configuration (default: {})",
        CalendarSource::default_path().display());
    println!("    --watch       Keep refreshing and print the agenda after each pass");
    println!("    --json        Print the agenda as JSON");
    println!("    -h, --help    Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG      Log filter, e.g. RUST_LOG=ical_agenda=debug");
}
