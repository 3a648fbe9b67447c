//! Interactive commands
//!
//! Each input line is split into words (double or single quotes group
//! words) and parsed with clap as one subcommand.

use clap::{Parser, Subcommand};

use crate::models::{AppModel, DeleteError};

#[derive(Parser, Debug)]
#[command(name = "daymate", no_binary_name = true, disable_version_flag = true)]
#[command(about = "DayMate commands")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Go to the welcome screen
    Home,

    /// Continue as guest
    Guest,

    /// Open the login screen, or sign in when credentials are given
    Login {
        email: Option<String>,
        password: Option<String>,
    },

    /// Open the register screen, or create an account
    Register {
        /// Quote names with spaces
        full_name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show past plans
    History,

    /// Back to the dashboard
    Back,

    /// Add a location: add <lat> <lon> [label...]
    Add {
        #[arg(allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(allow_negative_numbers = true)]
        lon: Option<f64>,
        label: Vec<String>,
    },

    /// Delete a saved or guest location
    #[command(alias = "rm")]
    Delete { id: String },

    /// Make a location active
    Select { id: String },

    /// Fetch weather and news again
    Refresh,

    /// Generate a plan for the active location
    Plan,

    /// Show or hide one history entry
    Expand { id: String },

    /// Redraw the current screen
    Show,

    /// Check that the backend is reachable
    Status,

    /// Leave
    #[command(alias = "exit")]
    Quit,
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Draw the current screen.
    Render,
    /// Print this text instead of the screen.
    Print(String),
    Quit,
}

/// Split a line into words. Quotes group words; an unterminated quote runs
/// to the end of the line.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

/// Parse one input line. Empty lines yield `Ok(None)`; parse failures and
/// `help` yield the text clap produced.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let words = split_words(line);
    if words.is_empty() {
        return Ok(None);
    }
    CommandLine::try_parse_from(words)
        .map(|cli| Some(cli.command))
        .map_err(|e| e.render().to_string())
}

/// Parse and run one line against the model.
pub async fn run_line(model: &mut AppModel, line: &str) -> Outcome {
    match parse_line(line) {
        Ok(Some(command)) => command.execute(model).await,
        Ok(None) => Outcome::Print(String::new()),
        Err(help) => Outcome::Print(help),
    }
}

impl Command {
    pub async fn execute(self, model: &mut AppModel) -> Outcome {
        tracing::debug!("Executing {:?}", self.name());
        match self {
            Command::Home => model.go_home(),
            Command::Guest => {
                model.continue_as_guest();
            }
            Command::Login { email, password } => match (email, password) {
                (Some(email), Some(password)) => {
                    if model.is_authenticated() {
                        return Outcome::Print("Already signed in.".into());
                    }
                    if model.view() != daymate_core::View::Login && !model.open_login() {
                        return Outcome::Render;
                    }
                    let _ = model.login(&email, &password).await;
                }
                (None, None) => {
                    model.open_login();
                }
                _ => return Outcome::Print("usage: login <email> <password>".into()),
            },
            Command::Register {
                full_name,
                email,
                password,
            } => match (full_name, email, password) {
                (Some(full_name), Some(email), Some(password)) => {
                    if model.view() != daymate_core::View::Register && !model.open_register() {
                        return Outcome::Render;
                    }
                    let _ = model.register(&full_name, &email, &password).await;
                }
                (None, None, None) => {
                    model.open_register();
                }
                _ => {
                    return Outcome::Print(
                        "usage: register \"<full name>\" <email> <password>".into(),
                    )
                }
            },
            Command::Logout => {
                if !model.is_authenticated() {
                    return Outcome::Print("Not signed in.".into());
                }
                model.logout();
            }
            Command::History => {
                model.open_history().await;
            }
            Command::Back => {
                model.back_to_main();
            }
            Command::Add { lat, lon, label } => {
                let _ = model.add_location(&label.join(" "), lat, lon).await;
            }
            Command::Delete { id } => match model.delete_location(&id).await {
                Ok(_) | Err(DeleteError::CurrentLocation) | Err(DeleteError::Rejected(_)) => {}
                Err(e @ DeleteError::NotFound(_)) => return Outcome::Print(format!("{}", e)),
            },
            Command::Select { id } => {
                if !model.select(&id) {
                    return Outcome::Print(format!("no location with id {}", id));
                }
            }
            Command::Refresh => model.refresh(),
            Command::Plan => {
                let _ = model.generate_plan();
            }
            Command::Expand { id } => {
                if !model.toggle_history_entry(&id) {
                    return Outcome::Print(format!("no plan with id {}", id));
                }
            }
            Command::Show => {}
            Command::Status => {
                let status = if model.backend_healthy().await {
                    "Backend: ok"
                } else {
                    "Backend: unreachable"
                };
                return Outcome::Print(status.into());
            }
            Command::Quit => return Outcome::Quit,
        }
        Outcome::Render
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Home => "home",
            Command::Guest => "guest",
            Command::Login { .. } => "login",
            Command::Register { .. } => "register",
            Command::Logout => "logout",
            Command::History => "history",
            Command::Back => "back",
            Command::Add { .. } => "add",
            Command::Delete { .. } => "delete",
            Command::Select { .. } => "select",
            Command::Refresh => "refresh",
            Command::Plan => "plan",
            Command::Expand { .. } => "expand",
            Command::Show => "show",
            Command::Status => "status",
            Command::Quit => "quit",
        }
    }
}
