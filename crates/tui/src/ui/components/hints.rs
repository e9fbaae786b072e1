use ratatui::{style::Style, text::Span};

use crate::{
    app::{AppState, DashboardFocus, Page},
    ui::theme::Theme,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

/// Keys that do something on the current page, in its current mode.
pub fn page_hints(state: &AppState) -> Vec<KeyHint> {
    match state.visible_page() {
        Page::Home => vec![KeyHint::new("↑↓", "select"), KeyHint::new("r", "reload")],
        Page::Login => vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("Enter", state.login.mode.submit_label()),
            KeyHint::new("Ctrl+T", "sign in/up"),
            KeyHint::new("Esc", "back"),
        ],
        Page::Dashboard => match state.dashboard.focus {
            DashboardFocus::Path => vec![
                KeyHint::new("Enter", "upload"),
                KeyHint::new("Esc", "cancel"),
            ],
            DashboardFocus::Search => vec![
                KeyHint::new("↑↓", "select"),
                KeyHint::new("Enter", "done"),
                KeyHint::new("Esc", "done"),
            ],
            DashboardFocus::Browse if state.dashboard.result.is_some() => vec![
                KeyHint::new("↑↓", "select"),
                KeyHint::new("Enter", "details"),
                KeyHint::new("/", "search"),
                KeyHint::new("f", "filter"),
                KeyHint::new("u", "upload"),
            ],
            DashboardFocus::Browse => vec![KeyHint::new("u", "upload")],
        },
        Page::History => vec![
            KeyHint::new("↑↓", "select"),
            KeyHint::new("Enter", "view"),
            KeyHint::new("r", "reload"),
        ],
    }
}
