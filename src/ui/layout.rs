//! Panel layout management
//!
//! Handles the arrangement of panels and terminal screen layout: a
//! browser column on the left (sources, schemas, tables stacked), the
//! data grid and query input on the right, and a one-line footer.

use ratatui::layout::{Constraint, Layout, Rect};

/// Screen areas for every panel
pub struct PanelLayout {
    pub sources: Rect,
    pub schemas: Rect,
    pub tables: Rect,
    pub data: Rect,
    pub query: Rect,
    pub footer: Rect,
}

/// Width of the left-hand browser column
const BROWSER_WIDTH: u16 = 32;

/// Calculate panel layout for the main screen
pub fn calculate_layout(area: Rect) -> PanelLayout {
    let outer = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(area);
    let main = Layout::horizontal([Constraint::Length(BROWSER_WIDTH), Constraint::Min(0)])
        .split(outer[0]);
    let browser = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Percentage(30),
        Constraint::Percentage(40),
    ])
    .split(main[0]);
    let right = Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).split(main[1]);

    PanelLayout {
        sources: browser[0],
        schemas: browser[1],
        tables: browser[2],
        data: right[0],
        query: right[1],
        footer: outer[1],
    }
}
