use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use relay_core::{Config, Mode, SessionController};

mod app;
mod handler;
mod logging;
mod markdown;
mod transcript;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "relay")]
#[command(version, about = "Chat with a remote text endpoint from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Endpoint URL (overrides RELAY_ENDPOINT and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Endpoint contract: chat or research
    #[arg(long, global = true, value_parser = parse_mode)]
    mode: Option<Mode>,

    /// Session identifier sent with chat requests
    #[arg(long, global = true)]
    user_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        /// Message text
        text: String,
    },
    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s).ok_or_else(|| format!("unknown mode '{s}' (expected 'chat' or 'research')"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            let log_path = logging::init_file()?;
            tracing::info!(path = %log_path.display(), "logging to file");
        }
        Some(_) => logging::init_stderr(),
    }

    let config = load_config(&cli);

    match cli.command {
        None => run_tui(&config).await,
        Some(Commands::Ask { text }) => ask(&config, text).await,
        Some(Commands::Config { save }) => show_config(&config, save),
    }
}

/// Config file, then environment, then flags. A broken file or variable is
/// reported and skipped rather than aborting.
fn load_config(cli: &Cli) -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config file, using defaults");
        Config::new()
    });

    if let Err(e) = config.apply_env() {
        tracing::warn!(error = %e, "ignoring environment override");
    }

    apply_flags(&mut config, cli);
    tracing::debug!(?config, "effective configuration");
    config
}

/// Command-line flags win over everything else.
fn apply_flags(config: &mut Config, cli: &Cli) {
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint_url = Some(endpoint.clone());
    }
    if let Some(user_id) = &cli.user_id {
        config.user_id = user_id.clone();
    }
}

async fn ask(config: &Config, text: String) -> Result<()> {
    let mut controller = SessionController::from_config(config);
    controller.set_draft(text);

    if !controller.submit() {
        bail!("nothing to send: the message is empty");
    }
    controller.wait_reply().await;

    if let Some(reply) = controller.session().transcript().last() {
        println!("{}", reply.text);
    }
    Ok(())
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if save {
        let path = config.save()?;
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}

async fn run_tui(config: &Config) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(tui::TICK_RATE);
    let mut app = App::new(config);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        // Apply the reply as soon as it lands instead of waiting for a tick
        let awaiting = app.is_awaiting_reply();
        let event = tokio::select! {
            event = events.next() => event,
            _ = app.controller.wait_reply(), if awaiting => continue,
        };

        match event {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_for_ask() {
        let cli = Cli::try_parse_from([
            "relay",
            "ask",
            "hello there",
            "--mode",
            "research",
            "--endpoint",
            "http://localhost:9/gen",
        ])
        .unwrap();

        assert_eq!(cli.mode, Some(Mode::Research));
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:9/gen"));
        assert!(matches!(cli.command, Some(Commands::Ask { ref text }) if text == "hello there"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["relay", "--mode", "search"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config {
            endpoint_url: Some("http://from-file.test/chat".to_string()),
            user_id: "from-file".to_string(),
            ..Config::new()
        };
        let cli = Cli::try_parse_from(["relay", "--mode", "research", "--user-id", "u-1"]).unwrap();
        apply_flags(&mut config, &cli);

        assert_eq!(config.mode, Mode::Research);
        assert_eq!(config.user_id, "u-1");
        // Not given on the command line, so the file value stays
        assert_eq!(config.endpoint_url(), "http://from-file.test/chat");
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let mut config = Config::new();
        let cli = Cli::try_parse_from(["relay"]).unwrap();
        apply_flags(&mut config, &cli);
        assert_eq!(config, Config::new());
    }
}
