//! jiragen - A terminal client for generating Jira test cases and tasks with AI
//!
//! Starts the TUI by default. The subcommands manage the stored session and
//! report configuration without opening the terminal interface.

mod api;
mod app;
mod config;
mod editor;
mod error;
mod events;
mod logging;
mod session;
mod tasks;
mod ui;
mod validation;

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use api::BackendClient;
use app::{App, Route};
use config::Config;
use events::EventHandler;
use session::Session;
use tasks::TaskSpawner;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Generate Jira test cases and tasks with AI from the terminal
#[derive(Parser, Debug)]
#[command(name = "jiragen", version)]
#[command(about = "Generate Jira test cases and tasks with AI", long_about = None)]
struct Cli {
    /// Backend URL, overriding the configuration file
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,

    /// Screen to open, e.g. /test-case-generator or /task-generator
    #[arg(long, value_name = "PATH")]
    route: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange a Google ID token for a session and store it
    Login {
        #[arg(long, value_name = "TOKEN")]
        google_token: String,
    },
    /// Remove the stored session
    Logout,
    /// Show the configured backend and whether a session is stored
    Status,
    /// Print the path of the configuration file, writing the defaults if it
    /// does not exist yet
    ConfigPath,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging is disabled: {:#}", e);
            None
        }
    };

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
        config.validate().context("Invalid --backend-url")?;
    }

    let result = match cli.command {
        Some(Command::Login { google_token }) => login(&config, &google_token).await,
        Some(Command::Logout) => logout(),
        Some(Command::Status) => status(&config),
        Some(Command::ConfigPath) => config_path(&config),
        None => run_tui(config, cli.route.as_deref()).await,
    };

    if let Err(e) = &result {
        error!("Exiting with error: {:#}", e);
    }
    logging::shutdown();
    result
}

async fn login(config: &Config, google_token: &str) -> Result<()> {
    let client = BackendClient::new(&config.backend_url, None)?;
    let tokens = client.login(google_token).await.context("Login failed")?;
    Session::from(tokens).store()?;
    println!("Signed in. Session stored in the system keyring.");
    Ok(())
}

fn logout() -> Result<()> {
    Session::clear()?;
    println!("Signed out.");
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    println!("Backend:  {}", config.backend_url);
    println!(
        "Session:  {}",
        if Session::exists() { "stored" } else { "none" }
    );
    if let Some(dir) = logging::log_directory() {
        println!("Logs:     {}", dir.display());
    }
    Ok(())
}

fn config_path(config: &Config) -> Result<()> {
    let path = Config::path()?;
    if !path.exists() {
        config.save().context("Failed to write default configuration")?;
    }
    println!("{}", path.display());
    Ok(())
}

async fn run_tui(config: Config, route: Option<&str>) -> Result<()> {
    let session = Session::load().unwrap_or_else(|e| {
        warn!("Could not read stored session: {}", e);
        None
    });
    let start = route.map(Route::parse).unwrap_or(Route::TaskGenerator);

    let client = BackendClient::new(&config.backend_url, session)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(&config, client, TaskSpawner::new(tx), start);

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let mut events = EventHandler::new();
    info!(route = app.route().path(), "Starting TUI");

    let result = (|| -> Result<()> {
        while !app.should_quit() {
            terminal.draw(|frame| app.view(frame))?;
            let event = events.next()?;
            app.update(event);
            while let Ok(message) = rx.try_recv() {
                app.handle_api_message(message);
            }
        }
        Ok(())
    })();

    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Leave the alternate screen before a panic message is printed.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_route_and_backend() {
        let cli = Cli::parse_from([
            "jiragen",
            "--backend-url",
            "https://gen.example.com",
            "--route",
            "/test-case-generator",
        ]);
        assert_eq!(cli.backend_url.as_deref(), Some("https://gen.example.com"));
        assert_eq!(cli.route.as_deref().map(Route::parse), Some(Route::TestCaseGenerator));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_login_subcommand() {
        let cli = Cli::parse_from(["jiragen", "login", "--google-token", "abc"]);
        match cli.command {
            Some(Command::Login { google_token }) => assert_eq!(google_token, "abc"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
