use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{app::Page, ui::theme::Theme};

/// Pages reachable from the navigation bar. History and Dashboard only
/// exist for a signed-in user, Login only for an anonymous one.
pub fn nav_pages(signed_in: bool) -> Vec<Page> {
    if signed_in {
        vec![Page::Home, Page::Dashboard, Page::History]
    } else {
        vec![Page::Home, Page::Login]
    }
}

pub fn render_tabs(frame: &mut Frame<'_>, area: Rect, active: Page, signed_in: bool, theme: &Theme) {
    let mut spans = vec![Span::raw(" ")];

    for (i, page) in nav_pages(signed_in).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }

        let label = page.label();
        if page == active {
            spans.push(Span::styled("[", Style::default().fg(theme.accent)));
            spans.push(Span::styled(
                label,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("]", Style::default().fg(theme.accent)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(theme.text_muted)));
        }
    }

    if signed_in {
        spans.push(Span::raw("    "));
        spans.push(Span::styled("Log Out", Style::default().fg(theme.text_muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn tab_shortcuts(signed_in: bool, theme: &Theme) -> Vec<Span<'static>> {
    let keys: &[&str] = if signed_in { &["h", "d", "y", "l"] } else { &["h", "l"] };
    let mut spans = Vec::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("/"));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
    }
    spans.push(Span::raw(" nav"));
    spans
}
