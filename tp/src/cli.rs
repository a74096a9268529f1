//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::itinerary::{MAX_DAYS, MIN_DAYS};

/// tripplanner - AI-assisted walking itineraries
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Plan a walking itinerary: pick a city, get suggested stops and a route",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List city candidates for a (partial) name
    Cities {
        /// City name or prefix (at least 3 characters)
        query: String,
    },

    /// Plan one trip and print it
    Plan {
        /// City name to look up
        #[arg(long)]
        city: String,

        /// Which candidate to use (1-based, as listed by `tp cities`)
        #[arg(long, default_value = "1")]
        pick: usize,

        /// Trip duration in days
        #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u8).range(MIN_DAYS as i64..=MAX_DAYS as i64))]
        days: u8,

        /// What the trip should focus on
        #[arg(short, long, default_value = "Art and Local Food")]
        interests: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Also write the trip as GeoJSON to this path
        #[arg(long, value_name = "PATH")]
        geojson: Option<PathBuf>,
    },

    /// Interactive planning session
    Repl,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs")
        .join("tripplanner.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with API key status and log location
pub fn generate_after_help(key_vars: &[(&str, &str)]) -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("API Keys:\n");
    for (service, env_var) in key_vars {
        let set = std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty());
        let icon = if set { "\u{2705}" } else { "\u{274C}" };
        help.push_str(&format!("  {} {} ({})\n", icon, service, env_var));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));

    debug!("generate_after_help: returning help text");
    help
}

/// Output format for trip results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text, json", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from([
            "tp", "plan", "--city", "Paris", "--days", "2", "--interests", "jazz", "--format", "json",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Plan {
                city,
                pick,
                days,
                interests,
                format,
                geojson,
            }) => {
                assert_eq!(city, "Paris");
                assert_eq!(pick, 1);
                assert_eq!(days, 2);
                assert_eq!(interests, "jazz");
                assert_eq!(format, OutputFormat::Json);
                assert!(geojson.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_days_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["tp", "plan", "--city", "Paris", "--days", "8"]).is_err());
        assert!(Cli::try_parse_from(["tp", "plan", "--city", "Paris", "--days", "0"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_after_help_mentions_keys() {
        let help = generate_after_help(&[("Geoapify", "TP_TEST_AFTER_HELP_UNSET")]);
        assert!(help.contains("Geoapify (TP_TEST_AFTER_HELP_UNSET)"));
        assert!(help.contains("Logs are written to:"));
    }
}
