//! Top-level render function
//!
//! Orchestrates rendering of all panels using the layout module. Pure:
//! reads [`App`] state, draws, mutates nothing.

use crate::app::{App, PanelFocus, StatusLevel};
use crate::db::Table;
use crate::ui::layout::calculate_layout;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row};
use unicode_width::UnicodeWidthStr;

/// Widest a data column may render
const MAX_COL_WIDTH: u16 = 40;
/// Placeholder shown for SQL NULL cells
const NULL_MARKER: &str = "NULL";

/// Render the entire application
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let layout = calculate_layout(frame.area());

    let source_lines: Vec<String> = app
        .sources
        .iter()
        .map(|(alias, kind)| {
            let marker = if app.current_alias.as_deref() == Some(alias.as_str()) {
                "● "
            } else {
                "  "
            };
            format!("{}{} ({})", marker, alias, kind)
        })
        .collect();

    render_list(
        frame,
        layout.sources,
        " Sources [^e] ",
        &source_lines,
        app.sources_selected,
        app.focus == PanelFocus::Sources,
        theme,
    );
    render_list(
        frame,
        layout.schemas,
        " Schemas [^d] ",
        &app.schemas,
        app.schemas_selected,
        app.focus == PanelFocus::Schemas,
        theme,
    );
    render_list(
        frame,
        layout.tables,
        " Tables [^a] ",
        &app.tables,
        app.tables_selected,
        app.focus == PanelFocus::Tables,
        theme,
    );

    render_data(frame, layout.data, app, theme);
    render_query(frame, layout.query, app, theme);
    render_footer(frame, layout.footer, app, theme);
}

fn render_list<S: AsRef<str>>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[S],
    selected: usize,
    focused: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(theme.border_style(focused));

    let entries: Vec<ListItem> = items
        .iter()
        .map(|item| ListItem::new(item.as_ref().to_string()).style(theme.list_item))
        .collect();

    let list = List::new(entries)
        .block(block)
        .highlight_style(theme.list_selected);

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(selected.min(items.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_data(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let title = if app.data_title.is_empty() {
        " Data [^s] ".to_string()
    } else {
        format!(" Data [^s] — {} ", app.data_title)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(theme.border_style(app.focus == PanelFocus::Data));

    let Some(table) = app.data.as_ref() else {
        let hint = Paragraph::new("Select a table or run a query")
            .style(theme.results_null)
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let widths = column_widths(table);

    let header = Row::new(
        table
            .columns()
            .iter()
            .map(|name| Cell::from(name.as_str()))
            .collect::<Vec<_>>(),
    )
    .style(theme.results_header);

    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = table
        .rows()
        .iter()
        .enumerate()
        .skip(app.data_offset)
        .take(visible.max(1))
        .map(|(i, cells)| {
            let row_style = if i % 2 == 0 {
                theme.results_row_even
            } else {
                theme.results_row_odd
            };
            Row::new(
                cells
                    .iter()
                    .map(|cell| match cell {
                        Some(value) => Cell::from(value.as_str()).style(row_style),
                        None => Cell::from(NULL_MARKER).style(theme.results_null),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let widget = ratatui::widgets::Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);
    frame.render_widget(widget, area);
}

fn render_query(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let focused = app.focus == PanelFocus::Query;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Query [^q] ")
        .border_style(theme.border_style(focused));

    let mut spans = vec![Span::styled(app.query_input.as_str(), theme.query_text)];
    if focused {
        spans.push(Span::styled(" ", theme.query_cursor));
    }
    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    if let Some(ref status) = app.status_message {
        let style = match status.level {
            StatusLevel::Info => theme.status_info,
            StatusLevel::Success => theme.status_success,
            StatusLevel::Warning => theme.status_warning,
            StatusLevel::Error => theme.status_error,
        };
        let conn = match app.current_alias {
            Some(ref alias) => format!("[{}] ", alias),
            None => "[disconnected] ".to_string(),
        };
        let paragraph = Paragraph::new(format!("{}{}", conn, status.message)).style(style);
        frame.render_widget(paragraph, area);
    } else {
        let conn = match app.current_alias {
            Some(ref alias) => format!("[{}]", alias),
            None => "[disconnected]".to_string(),
        };
        let text = format!(
            "{} | Tab cycles focus · Enter activates · d describes · Ctrl+C quits",
            conn
        );
        let paragraph = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }
}

/// Per-column display widths: widest of header and cells, clamped
fn column_widths(table: &Table) -> Vec<Constraint> {
    let mut widths: Vec<u16> = table
        .columns()
        .iter()
        .map(|name| UnicodeWidthStr::width(name.as_str()) as u16)
        .collect();

    for row in table.rows() {
        for (idx, cell) in row.iter().enumerate() {
            let cell_width = match cell {
                Some(value) => UnicodeWidthStr::width(value.as_str()) as u16,
                None => NULL_MARKER.len() as u16,
            };
            if cell_width > widths[idx] {
                widths[idx] = cell_width;
            }
        }
    }

    widths
        .into_iter()
        .map(|w| Constraint::Length(w.clamp(3, MAX_COL_WIDTH)))
        .collect()
}
