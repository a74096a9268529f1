//! REPL session management

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::geocode::{CitySuggestions, Geocoder, MIN_QUERY_CHARS, suggest_cities};
use crate::itinerary::{MAX_DAYS, MIN_DAYS, TripForm};
use crate::render::{print_trip, write_geojson};
use crate::session::{GenerateOutcome, Notice, Session};

/// Interactive planning session: the form layer over a [`Session`]
pub struct ReplSession {
    session: Session,
    geocoder: Arc<dyn Geocoder>,
    form: TripForm,
    suggestions: CitySuggestions,
}

impl ReplSession {
    /// Create a new REPL session
    ///
    /// The form starts with the same defaults as the web form: 3 days of
    /// "Art and Local Food".
    pub fn new(session: Session, geocoder: Arc<dyn Geocoder>) -> Self {
        debug!(session_id = %session.id(), "ReplSession::new: called");
        Self {
            session,
            geocoder,
            form: TripForm {
                selected_city: None,
                duration_days: Some(3),
                interests: Some("Art and Local Food".to_string()),
            },
            suggestions: CitySuggestions::empty(),
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.search(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "Trip Planner".bright_cyan().bold());
        println!("Type a city name to search, then {} and {}.", "/select N".yellow(), "/generate".yellow());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// Plain input is a city search
    async fn search(&mut self, text: &str) {
        debug!(%text, "ReplSession::search: called");
        if text.chars().count() < MIN_QUERY_CHARS {
            println!("{}", format!("Type at least {} characters to search.", MIN_QUERY_CHARS).dimmed());
            return;
        }

        self.suggestions = suggest_cities(self.geocoder.as_ref(), text).await;
        if self.suggestions.is_empty() {
            println!("{}", "No matching cities.".dimmed());
            return;
        }

        for (idx, city) in self.suggestions.iter().enumerate() {
            println!("  {} {}", format!("{}.", idx + 1).yellow(), city.display_name);
        }
        println!("{}", "Pick one with /select N".dimmed());
    }

    /// Handle slash commands
    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };
        debug!(%cmd, %arg, "ReplSession::handle_slash_command: called");

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return SlashResult::Quit,
            "/select" | "/s" => self.select(arg),
            "/days" | "/d" => self.set_days(arg),
            "/interests" | "/i" => self.set_interests(arg),
            "/form" | "/f" => self.print_form(),
            "/generate" | "/g" => self.generate().await,
            "/show" => self.show(),
            "/export" => self.export(arg),
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    fn select(&mut self, arg: &str) {
        let picked = arg.parse::<usize>().ok().and_then(|n| self.suggestions.pick(n)).cloned();
        match picked {
            Some(city) => {
                println!("{} {}", "Selected:".green(), city.display_name);
                self.form.selected_city = Some(city);
            }
            None if self.suggestions.is_empty() => {
                println!("{}", "Search for a city first.".yellow());
            }
            None => {
                println!("{} pick a number from 1 to {}", "?".yellow(), self.suggestions.len());
            }
        }
    }

    fn set_days(&mut self, arg: &str) {
        match arg.parse::<u8>() {
            Ok(days) if (MIN_DAYS..=MAX_DAYS).contains(&days) => {
                self.form.duration_days = Some(days);
                println!("{} {} day(s)", "Duration:".green(), days);
            }
            _ => println!("{} days must be {}-{}", "?".yellow(), MIN_DAYS, MAX_DAYS),
        }
    }

    fn set_interests(&mut self, arg: &str) {
        if arg.is_empty() {
            self.form.interests = None;
            println!("{}", "Interests cleared.".dimmed());
        } else {
            self.form.interests = Some(arg.to_string());
            println!("{} {}", "Interests:".green(), arg);
        }
    }

    fn print_form(&self) {
        let unset = || "(not set)".dimmed().to_string();
        println!();
        println!("{}", "Trip Form:".bright_cyan());
        println!(
            "  {:10} {}",
            "City",
            self.form
                .selected_city
                .as_ref()
                .map(|c| c.display_name.clone())
                .unwrap_or_else(unset)
        );
        println!(
            "  {:10} {}",
            "Days",
            self.form.duration_days.map(|d| d.to_string()).unwrap_or_else(unset)
        );
        println!(
            "  {:10} {}",
            "Interests",
            self.form.interests.clone().unwrap_or_else(unset)
        );
        println!("  {:10} {}", "State", self.session.state());
        println!();
    }

    async fn generate(&mut self) {
        if self.form.request().is_none() {
            println!("{}", "Fill in city, days and interests first (see /form).".yellow());
            return;
        }
        println!("{}", "Scouting locations...".dimmed());

        match self.session.generate(&self.form).await {
            GenerateOutcome::Skipped => {}
            GenerateOutcome::Ready { .. } => {
                if let Some(trip) = self.session.current_trip() {
                    print_trip(&trip);
                }
                self.print_notice();
            }
            GenerateOutcome::Failed { .. } => self.print_notice(),
        }
    }

    fn show(&self) {
        match self.session.current_trip() {
            Some(trip) => print_trip(&trip),
            None => println!("{}", "No trip yet. Use /generate.".dimmed()),
        }
        self.print_notice();
    }

    fn export(&self, arg: &str) {
        if arg.is_empty() {
            println!("{} usage: /export PATH", "?".yellow());
            return;
        }
        let Some(trip) = self.session.current_trip() else {
            println!("{}", "No trip to export yet.".dimmed());
            return;
        };
        match write_geojson(&trip, Path::new(arg)) {
            Ok(()) => println!("{} {}", "Wrote".green(), arg),
            Err(e) => println!("{} {:#}", "Export failed:".red(), e),
        }
    }

    fn print_notice(&self) {
        match self.session.notice() {
            Some(Notice::Error(msg)) => println!("{} {}", "Error:".red().bold(), msg),
            Some(Notice::Warning(msg)) => println!("{} {}", "Warning:".yellow().bold(), msg),
            None => {}
        }
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:16} Search for a city", "<text>".yellow());
        println!("  {:16} Choose a city from the last search", "/select N".yellow());
        println!("  {:16} Set trip length ({}-{})", "/days N".yellow(), MIN_DAYS, MAX_DAYS);
        println!("  {:16} Set interests", "/interests TEXT".yellow());
        println!("  {:16} Show the current form", "/form".yellow());
        println!("  {:16} Plan the trip", "/generate".yellow());
        println!("  {:16} Show the current trip again", "/show".yellow());
        println!("  {:16} Write the trip as GeoJSON", "/export PATH".yellow());
        println!("  {:16} Show this help", "/help".yellow());
        println!("  {:16} Exit", "/quit".yellow());
        println!();
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
