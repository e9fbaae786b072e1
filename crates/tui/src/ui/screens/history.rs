use api_types::history::AnalysisRecord;
use chrono_tz::Tz;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::AppState,
    ui::{components::card::Card, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let history = &state.history;
    let card = Card::new("Analysis History", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let notice = if history.loading {
        Some(Span::styled("Loading history...", Style::default().fg(theme.dim)))
    } else if let Some(error) = &history.error {
        Some(Span::styled(error.as_str(), Style::default().fg(theme.error)))
    } else if history.records.is_empty() {
        Some(Span::styled(
            "You haven't uploaded any statements yet.",
            Style::default().fg(theme.dim),
        ))
    } else {
        None
    };
    if let Some(notice) = notice {
        frame.render_widget(Paragraph::new(notice), inner);
        return;
    }

    let items: Vec<ListItem> = history
        .records
        .iter()
        .map(|record| record_item(record, state.tz, theme))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.panel))
        .highlight_symbol("› ");
    let mut list_state = ListState::default().with_selected(Some(history.selected));
    frame.render_stateful_widget(list, inner, &mut list_state);
}

/// Upload time in the configured zone, e.g. `Mar 5, 2024, 14:03`.
pub fn uploaded_label(record: &AnalysisRecord, tz: Tz) -> String {
    record
        .result
        .uploaded_at
        .map(|at| at.with_timezone(&tz).format("%b %-d, %Y, %H:%M").to_string())
        .unwrap_or_else(|| "Unknown date".to_string())
}

fn record_item<'a>(record: &'a AnalysisRecord, tz: Tz, theme: &Theme) -> ListItem<'a> {
    let result = &record.result;
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                record.title(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", uploaded_label(record, tz)),
                Style::default().fg(theme.dim),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{} Anomalies", result.summary.anomalies_found),
                Style::default().fg(theme.warning),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{} Transactions", result.transaction_count()),
                Style::default().fg(theme.text_muted),
            ),
            Span::styled("  [View]", Style::default().fg(theme.accent)),
        ]),
    ])
}
