//! Application state and event handling
//!
//! Central state machine: events come in, state updates, actions go out.
//! Database work never happens here. Key handling returns an [`Action`]
//! and the main loop runs it on a background task, reporting back through
//! an [`AppEvent`], so the UI stays responsive while a statement runs.

use crate::config::SourceKind;
use crate::db::Table;
use crate::ui::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// How long a status message stays in the footer
const STATUS_TTL: Duration = Duration::from_secs(4);

/// Main application state
pub struct App {
    /// Which panel currently has focus
    pub focus: PanelFocus,

    /// Configured sources, in configuration order
    pub sources: Vec<(String, SourceKind)>,
    pub sources_selected: usize,
    /// Alias of the connected source
    pub current_alias: Option<String>,

    /// Schemas of the current source
    pub schemas: Vec<String>,
    pub schemas_selected: usize,
    /// Schema the table list and queries are scoped to
    pub active_schema: Option<String>,

    /// Tables of the active schema
    pub tables: Vec<String>,
    pub tables_selected: usize,

    /// Last loaded result set and its caption
    pub data: Option<Table>,
    pub data_title: String,
    /// Vertical scroll offset into the data rows
    pub data_offset: usize,

    /// Query input buffer
    pub query_input: String,

    /// Status message to display
    pub status_message: Option<StatusMessage>,
    status_since: Option<Instant>,

    /// UI theme (created once, reused every frame)
    pub theme: Theme,

    /// Whether the application is running
    pub running: bool,
}

/// Panel focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Sources,
    Schemas,
    Tables,
    Data,
    Query,
}

/// Status message with severity level
pub struct StatusMessage {
    pub message: String,
    pub level: StatusLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Events delivered to the state machine by the main loop
pub enum AppEvent {
    /// A switch finished; the new source's schemas came with it
    Switched { alias: String, schemas: Vec<String> },
    /// Table list for a schema arrived
    TablesLoaded { schema: String, tables: Vec<String> },
    /// A preview/describe/query result arrived
    DataLoaded { title: String, table: Table },
    /// A background operation failed
    OpFailed(String),
}

/// Actions returned by key handling for the main loop to execute
pub enum Action {
    Switch(String),
    LoadTables(String),
    Preview { schema: String, table: String },
    Describe { schema: String, table: String },
    RunQuery { schema: String, sql: String },
    Quit,
    None,
}

impl App {
    pub fn new(
        sources: Vec<(String, SourceKind)>,
        current_alias: Option<String>,
        schemas: Vec<String>,
    ) -> Self {
        let active_schema = schemas.first().cloned();
        Self {
            focus: PanelFocus::Sources,
            sources,
            sources_selected: 0,
            current_alias,
            schemas,
            schemas_selected: 0,
            active_schema,
            tables: Vec::new(),
            tables_selected: 0,
            data: None,
            data_title: String::new(),
            data_offset: 0,
            query_input: String::new(),
            status_message: None,
            status_since: None,
            theme: Theme::default(),
            running: true,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status_message = Some(StatusMessage {
            message: message.into(),
            level,
        });
        self.status_since = Some(Instant::now());
    }

    /// Clear a stale status message; called from the main loop's tick
    pub fn tick(&mut self) {
        if let Some(since) = self.status_since
            && since.elapsed() > STATUS_TTL
        {
            self.status_message = None;
            self.status_since = None;
        }
    }

    /// Handle a key event, returning the database action to run (if any)
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.running = false;
                    return Action::Quit;
                }
                KeyCode::Char('e') => {
                    self.focus = PanelFocus::Sources;
                    return Action::None;
                }
                KeyCode::Char('d') => {
                    self.focus = PanelFocus::Schemas;
                    return Action::None;
                }
                KeyCode::Char('a') => {
                    self.focus = PanelFocus::Tables;
                    return Action::None;
                }
                KeyCode::Char('s') => {
                    self.focus = PanelFocus::Data;
                    return Action::None;
                }
                KeyCode::Char('q') => {
                    self.focus = PanelFocus::Query;
                    return Action::None;
                }
                // swallow unrecognized control chords so they never reach
                // the query input as text
                _ => return Action::None,
            }
        }

        if key.code == KeyCode::Tab {
            self.focus = next_focus(self.focus);
            return Action::None;
        }

        match self.focus {
            PanelFocus::Sources => self.handle_sources_key(key),
            PanelFocus::Schemas => self.handle_schemas_key(key),
            PanelFocus::Tables => self.handle_tables_key(key),
            PanelFocus::Data => self.handle_data_key(key),
            PanelFocus::Query => self.handle_query_key(key),
        }
    }

    fn handle_sources_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.sources_selected = self.sources_selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.sources_selected + 1 < self.sources.len() {
                    self.sources_selected += 1;
                }
                Action::None
            }
            KeyCode::Enter => match self.sources.get(self.sources_selected) {
                Some((alias, _)) => Action::Switch(alias.clone()),
                None => Action::None,
            },
            _ => Action::None,
        }
    }

    fn handle_schemas_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.schemas_selected = self.schemas_selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.schemas_selected + 1 < self.schemas.len() {
                    self.schemas_selected += 1;
                }
                Action::None
            }
            KeyCode::Enter => match self.schemas.get(self.schemas_selected) {
                Some(schema) => Action::LoadTables(schema.clone()),
                None => Action::None,
            },
            _ => Action::None,
        }
    }

    fn handle_tables_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.tables_selected = self.tables_selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.tables_selected + 1 < self.tables.len() {
                    self.tables_selected += 1;
                }
                Action::None
            }
            KeyCode::Enter => self.table_action(false),
            KeyCode::Char('d') => self.table_action(true),
            _ => Action::None,
        }
    }

    fn table_action(&mut self, describe: bool) -> Action {
        let Some(schema) = self.active_schema.clone() else {
            self.set_status("No schema selected", StatusLevel::Warning);
            return Action::None;
        };
        let Some(table) = self.tables.get(self.tables_selected).cloned() else {
            return Action::None;
        };
        if describe {
            Action::Describe { schema, table }
        } else {
            Action::Preview { schema, table }
        }
    }

    fn handle_data_key(&mut self, key: KeyEvent) -> Action {
        let rows = self.data.as_ref().map_or(0, Table::row_count);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.data_offset = self.data_offset.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.data_offset + 1 < rows {
                    self.data_offset += 1;
                }
            }
            KeyCode::PageUp => {
                self.data_offset = self.data_offset.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.data_offset = (self.data_offset + 10).min(rows.saturating_sub(1));
            }
            KeyCode::Home => self.data_offset = 0,
            _ => {}
        }
        Action::None
    }

    fn handle_query_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char(c) => {
                self.query_input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.query_input.pop();
                Action::None
            }
            KeyCode::Esc => {
                self.query_input.clear();
                Action::None
            }
            KeyCode::Enter => {
                let sql = self.query_input.trim().to_string();
                if sql.is_empty() {
                    return Action::None;
                }
                let Some(schema) = self.active_schema.clone() else {
                    self.set_status("No schema selected", StatusLevel::Warning);
                    return Action::None;
                };
                Action::RunQuery { schema, sql }
            }
            _ => Action::None,
        }
    }

    /// Fold a completed background operation into the state
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Switched { alias, schemas } => {
                self.active_schema = schemas.first().cloned();
                self.schemas = schemas;
                self.schemas_selected = 0;
                self.tables.clear();
                self.tables_selected = 0;
                self.data = None;
                self.data_offset = 0;
                self.set_status(format!("Switched to '{}'", alias), StatusLevel::Success);
                self.current_alias = Some(alias);
            }
            AppEvent::TablesLoaded { schema, tables } => {
                self.set_status(
                    format!("{}: {} tables", schema, tables.len()),
                    StatusLevel::Info,
                );
                self.active_schema = Some(schema);
                self.tables = tables;
                self.tables_selected = 0;
            }
            AppEvent::DataLoaded { title, table } => {
                self.set_status(
                    format!("{}: {} rows", title, table.row_count()),
                    StatusLevel::Success,
                );
                self.data_title = title;
                self.data = Some(table);
                self.data_offset = 0;
            }
            AppEvent::OpFailed(message) => {
                self.set_status(message, StatusLevel::Error);
            }
        }
    }
}

fn next_focus(focus: PanelFocus) -> PanelFocus {
    match focus {
        PanelFocus::Sources => PanelFocus::Schemas,
        PanelFocus::Schemas => PanelFocus::Tables,
        PanelFocus::Tables => PanelFocus::Data,
        PanelFocus::Data => PanelFocus::Query,
        PanelFocus::Query => PanelFocus::Sources,
    }
}
