use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use docthers_core::{Attachment, ChatSession, Config, ResponseClient, WidgetEvent};
use futures_util::StreamExt;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod scroll;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "docthers")]
#[command(about = "Terminal chat widget for the DoctHers response service")]
struct Cli {
    /// Origin of the response service, e.g. http://localhost:5000
    #[arg(long, global = true)]
    origin: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Send a single message and print the reply
    Ask {
        /// Message text
        text: Option<String>,
        /// Image to attach
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = config_or_default(Config::load());
    let endpoint = config.endpoint(cli.origin.as_deref());
    let client = ResponseClient::new(&endpoint.url());

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            init_file_logging()?;
            report_config_error(config_error.as_deref());
            tracing::info!(url = client.url(), "starting chat");
            let status = config_error.map(|_| CONFIG_FALLBACK_STATUS.to_string());
            run_chat(client, status).await
        }
        Commands::Ask { text, image } => {
            init_stderr_logging();
            report_config_error(config_error.as_deref());
            ask(client, text, image).await
        }
    }
}

const CONFIG_FALLBACK_STATUS: &str = "config.json unreadable, using defaults";

/// Fall back to defaults on a bad config file, keeping the error to report
/// once logging is up.
fn config_or_default(loaded: Result<Config>) -> (Config, Option<String>) {
    match loaded {
        Ok(config) => (config, None),
        Err(e) => (Config::new(), Some(format!("{:#}", e))),
    }
}

fn report_config_error(error: Option<&str>) {
    if let Some(error) = error {
        tracing::warn!(error, "failed to load config, using defaults");
    }
}

/// The terminal belongs to the UI, so chat logs go to a file.
fn init_file_logging() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?
        .join("docthers");
    std::fs::create_dir_all(&log_dir)?;

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("docthers.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_chat(client: ResponseClient, status: Option<String>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(300);
    let mut app = App::new(client);
    app.status = status;

    let result = event_loop(&mut terminal, &mut events, &mut app).await;

    app.unmount();
    tui::restore()?;
    result
}

async fn event_loop(terminal: &mut Tui, events: &mut EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event)?,
            Some(done) = app.in_flight.next(), if !app.in_flight.is_empty() => app.resolve(done),
            else => break,
        }
    }
    Ok(())
}

async fn ask(client: ResponseClient, text: Option<String>, image: Option<PathBuf>) -> Result<()> {
    let mut session = ChatSession::new();

    if let Some(path) = image {
        session.dispatch(WidgetEvent::ImageSelected(Attachment::from_path(&path)?));
    }
    session.dispatch(WidgetEvent::TextChanged(text.unwrap_or_default()));

    let Some(cycle) = session.dispatch(WidgetEvent::Submit) else {
        bail!("Nothing to send: pass a message or --image");
    };

    let done = cycle.spawn(client).await;
    session.resolve(done);

    if let Some(reply) = session.transcript().last() {
        println!("{}", reply.content());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_config_falls_back_with_error() {
        let (config, error) =
            config_or_default(Err(anyhow!("expected value at line 1 column 3")));
        assert!(config.origin.is_none());
        assert!(error.unwrap().contains("line 1 column 3"));
    }

    #[test]
    fn test_loaded_config_has_no_error() {
        let loaded = Config {
            origin: Some("http://svc:5000".to_string()),
        };
        let (config, error) = config_or_default(Ok(loaded));
        assert_eq!(config.origin.as_deref(), Some("http://svc:5000"));
        assert!(error.is_none());
    }

    #[test]
    fn test_malformed_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ origin: nope").unwrap();

        let (config, error) = config_or_default(Config::load_from(&path));
        assert!(config.origin.is_none());
        assert!(error.is_some());
    }
}
