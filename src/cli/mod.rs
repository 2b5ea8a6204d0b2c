use crate::service::TimelineService;
use crate::types::ParseContext;
use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use std::io::Read;
use tracing::{info, warn};

/// CLI entry point for the timeline-parser tool
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = Command::new("timeline-parser")
        .version("0.1.0")
        .about("Parse LLM itinerary text into a structured day-by-day travel plan")
        .arg(
            Arg::new("input")
                .help("Path to the itinerary text file, or '-' for stdin")
                .default_value("-")
                .index(1),
        )
        .arg(
            Arg::new("destination")
                .short('d')
                .long("destination")
                .value_name("CITY")
                .help("Trip destination used for synthesized fields")
                .default_value(""),
        )
        .arg(
            Arg::new("days")
                .short('n')
                .long("days")
                .value_name("COUNT")
                .help("Expected number of trip days")
                .default_value("1"),
        )
        .arg(
            Arg::new("start-date")
                .short('s')
                .long("start-date")
                .value_name("YYYY-MM-DD")
                .help("Trip start date; day labels stay relative without it"),
        )
        .arg(
            Arg::new("legacy")
                .long("legacy")
                .action(ArgAction::SetTrue)
                .help("Emit the flat legacy activity array instead of day plans"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .action(ArgAction::SetTrue)
                .help("Emit compact JSON instead of pretty-printed"),
        )
        .get_matches();

    let input = matches.get_one::<String>("input").unwrap();
    let raw = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read itinerary from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read itinerary file {}", input))?
    };

    let days: u32 = matches
        .get_one::<String>("days")
        .unwrap()
        .parse()
        .context("--days must be a positive integer")?;
    let mut context = ParseContext::new(matches.get_one::<String>("destination").unwrap(), days);
    if let Some(start_date) = matches.get_one::<String>("start-date") {
        context = context.with_start_date(start_date);
    }

    let service = TimelineService::new();
    let result = service.parse(&raw, &context).await;

    info!(
        parser = result.parser.as_deref().unwrap_or("fallback"),
        days = result.day_count(),
        activities = result.activity_count(),
        elapsed_ms = result.metadata.parse_time_ms,
        "parse finished"
    );
    for warning in &result.warnings {
        warn!("{}", warning);
    }

    let compact = matches.get_flag("compact");
    let output = if matches.get_flag("legacy") {
        let legacy = crate::normalizer::convert_to_legacy(&result.data);
        if compact {
            serde_json::to_string(&legacy)?
        } else {
            serde_json::to_string_pretty(&legacy)?
        }
    } else if compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{}", output);

    Ok(())
}
