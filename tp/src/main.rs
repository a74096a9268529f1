//! tripplanner - AI-assisted walking itineraries
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use tripplanner::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use tripplanner::config::Config;
use tripplanner::geoapify::GeoapifyClient;
use tripplanner::geocode::suggest_cities;
use tripplanner::itinerary::{Assembler, TripForm};
use tripplanner::render::{print_trip, write_geojson};
use tripplanner::repl;
use tripplanner::session::{GenerateOutcome, Notice, Session};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let defaults = Config::default();
    let key_vars = [
        ("LLM", defaults.llm.api_key_env.as_str()),
        ("Geoapify", defaults.geoapify.api_key_env.as_str()),
    ];
    let cmd = Cli::command().after_help(generate_after_help(&key_vars));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "tripplanner loaded config");

    // Missing keys are fatal before anything interactive starts
    config.validate()?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Cities { query }) => cmd_cities(&config, &query).await,
        Some(Command::Plan {
            city,
            pick,
            days,
            interests,
            format,
            geojson,
        }) => cmd_plan(&config, &city, pick, days, &interests, format, geojson).await,
        Some(Command::Repl) | None => repl::run_interactive(&config).await,
    }
}

async fn cmd_cities(config: &Config, query: &str) -> Result<()> {
    debug!(%query, "cmd_cities: called");
    let geoapify = GeoapifyClient::from_config(&config.geoapify)?;
    let suggestions = suggest_cities(&geoapify, query).await;

    if suggestions.is_empty() {
        println!("{}", "No matching cities.".dimmed());
        return Ok(());
    }
    for (idx, city) in suggestions.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("{}.", idx + 1).yellow(),
            city.display_name,
            format!("({:.4}, {:.4})", city.latitude, city.longitude).dimmed()
        );
    }
    Ok(())
}

async fn cmd_plan(
    config: &Config,
    query: &str,
    pick: usize,
    days: u8,
    interests: &str,
    format: OutputFormat,
    geojson: Option<PathBuf>,
) -> Result<()> {
    debug!(%query, %pick, %days, %interests, ?format, "cmd_plan: called");
    let geoapify = Arc::new(GeoapifyClient::from_config(&config.geoapify)?);

    let suggestions = suggest_cities(geoapify.as_ref(), query).await;
    let city = suggestions
        .pick(pick)
        .cloned()
        .ok_or_else(|| eyre!("No city candidate #{} for '{}' ({} found)", pick, query, suggestions.len()))?;

    let prompt_root = std::env::current_dir()?;
    let assembler = Assembler::from_config(config, geoapify, &prompt_root).context("Failed to create LLM client")?;
    let mut session = Session::new(assembler);

    let form = TripForm {
        selected_city: Some(city),
        duration_days: Some(days),
        interests: Some(interests.to_string()),
    };

    match session.generate(&form).await {
        GenerateOutcome::Failed { error } => return Err(eyre!(error)),
        GenerateOutcome::Skipped => return Err(eyre!("Trip form is incomplete")),
        GenerateOutcome::Ready { .. } => {}
    }

    let trip = session
        .current_trip()
        .ok_or_else(|| eyre!("Trip generation finished without a result"))?;

    match format {
        OutputFormat::Text => print_trip(&trip),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(trip.as_ref()).context("Failed to serialize trip")?)
        }
    }

    if let Some(Notice::Warning(msg)) = session.notice() {
        eprintln!("{} {}", "Warning:".yellow().bold(), msg);
    }

    if let Some(path) = geojson {
        write_geojson(&trip, &path)?;
        eprintln!("{} {}", "Wrote".green(), path.display());
    }

    Ok(())
}
