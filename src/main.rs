//! vizsql - A fast, keyboard-driven multi-database client for the terminal
//!
//! This is the main entry point: flag parsing, configuration discovery,
//! controller construction, and the terminal event loop. Database work is
//! dispatched to background tasks so the interface never blocks on a slow
//! statement.

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use vizsql::app::{Action, App, AppEvent, StatusLevel};
use vizsql::config::AppConfig;
use vizsql::controller::Controller;
use vizsql::db::DataSource;
use vizsql::ui;

#[derive(Parser)]
#[command(name = "vizsql", version, about = "Browse MySQL, PostgreSQL, and SQLite from the terminal")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Connect to a single data source by DSN (requires --kind)
    #[arg(long)]
    dsn: Option<String>,

    /// Backend kind for --dsn: mysql, postgresql, or sqlite
    #[arg(long)]
    kind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = build_config(&args)?;
    let controller = Arc::new(Controller::create(config).await?);

    let sources = controller.list();
    let current_alias = controller.current_alias().await;
    let schemas = controller.current().await?.list_schemas().await?;
    let mut app = App::new(sources, current_alias, schemas);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app, controller).await;
    restore_terminal()?;
    result
}

/// Resolve the configuration: ad-hoc `--dsn`/`--kind` pair, or the YAML file
fn build_config(args: &Args) -> Result<AppConfig> {
    match (&args.dsn, &args.kind) {
        (Some(dsn), Some(kind)) => Ok(AppConfig::ad_hoc(kind, dsn)),
        (Some(_), None) | (None, Some(_)) => bail!("--dsn and --kind must be used together"),
        (None, None) => {
            let path = match &args.config {
                Some(path) => path.clone(),
                None => AppConfig::discover()
                    .context("create a vizsql.yaml or pass --dsn and --kind")?,
            };
            Ok(AppConfig::load(&path)?)
        }
    }
}

/// Log to the file named by VIZSQL_LOG, if set; the TUI owns the terminal
fn init_tracing() {
    let Ok(path) = std::env::var("VIZSQL_LOG") else {
        return;
    };
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_writer(file)
        .with_ansi(false)
        .init();
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal() -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Event loop: terminal input, completed background work, periodic ticks
async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    controller: Arc<Controller>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(500));

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let action = app.handle_key(key);
                        dispatch(action, &controller, &tx, app);
                    }
                    Some(Ok(_)) => {} // resize and the rest redraw on the next pass
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            Some(event) = rx.recv() => app.apply(event),
            _ = tick.tick() => app.tick(),
        }
    }

    Ok(())
}

/// Run a database action on a background task, reporting back over `tx`
fn dispatch(
    action: Action,
    controller: &Arc<Controller>,
    tx: &mpsc::UnboundedSender<AppEvent>,
    app: &mut App,
) {
    match action {
        Action::None | Action::Quit => {}
        Action::Switch(alias) => {
            app.set_status(format!("Connecting to '{}'...", alias), StatusLevel::Info);
            let controller = controller.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = switch_and_list(&controller, &alias).await;
                let event = match result {
                    Ok(schemas) => AppEvent::Switched { alias, schemas },
                    Err(message) => AppEvent::OpFailed(message),
                };
                let _ = tx.send(event);
            });
        }
        Action::LoadTables(schema) => {
            let controller = controller.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = match current_source(&controller).await {
                    Ok(source) => source
                        .list_tables(&schema)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(message) => Err(message),
                };
                let event = match result {
                    Ok(tables) => AppEvent::TablesLoaded { schema, tables },
                    Err(message) => AppEvent::OpFailed(message),
                };
                let _ = tx.send(event);
            });
        }
        Action::Preview { schema, table } => {
            let controller = controller.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let title = format!("{}.{}", schema, table);
                let result = match current_source(&controller).await {
                    Ok(source) => source
                        .preview_table(&schema, &table)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(message) => Err(message),
                };
                let _ = tx.send(to_data_event(title, result));
            });
        }
        Action::Describe { schema, table } => {
            let controller = controller.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let title = format!("structure of {}.{}", schema, table);
                let result = match current_source(&controller).await {
                    Ok(source) => source
                        .describe_table(&schema, &table)
                        .await
                        .map_err(|e| e.to_string()),
                    Err(message) => Err(message),
                };
                let _ = tx.send(to_data_event(title, result));
            });
        }
        Action::RunQuery { schema, sql } => {
            app.set_status("Running query...", StatusLevel::Info);
            let controller = controller.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = match current_source(&controller).await {
                    Ok(source) => source.query(&schema, &sql).await.map_err(|e| e.to_string()),
                    Err(message) => Err(message),
                };
                let _ = tx.send(to_data_event("query".to_string(), result));
            });
        }
    }
}

async fn current_source(
    controller: &Controller,
) -> std::result::Result<Arc<dyn vizsql::db::DataSource>, String> {
    controller.current().await.map_err(|e| e.to_string())
}

async fn switch_and_list(
    controller: &Controller,
    alias: &str,
) -> std::result::Result<Vec<String>, String> {
    controller.switch(alias).await.map_err(|e| e.to_string())?;
    let source = current_source(controller).await?;
    source.list_schemas().await.map_err(|e| e.to_string())
}

fn to_data_event(title: String, result: std::result::Result<vizsql::db::Table, String>) -> AppEvent {
    match result {
        Ok(table) => AppEvent::DataLoaded { title, table },
        Err(message) => AppEvent::OpFailed(message),
    }
}
