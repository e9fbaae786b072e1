use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    app::AppState,
    ui::{components::centered_rect, theme::Theme},
};

/// Background history saves, newest last. Failures never interrupt the
/// user, so this overlay is where they surface.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    if !state.show_diagnostics {
        return;
    }

    let popup = centered_rect(70, 60, area);
    let block = Block::default()
        .title(Span::styled(" Diagnostics ", Style::default().fg(theme.accent)))
        .title_bottom(Line::from(vec![
            Span::styled(" Esc", Style::default().fg(theme.accent)),
            Span::raw(" close "),
        ]))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.panel));

    let lines: Vec<Line> = if state.diagnostics.is_empty() {
        vec![Line::from(Span::styled(
            "Nothing to report.",
            Style::default().fg(theme.dim),
        ))]
    } else {
        let visible = popup.height.saturating_sub(2) as usize;
        let skip = state.diagnostics.len().saturating_sub(visible);
        state
            .diagnostics
            .iter()
            .skip(skip)
            .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(theme.text))))
            .collect()
    };

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}
