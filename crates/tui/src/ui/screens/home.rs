use api_types::news::Article;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
    app::AppState,
    ui::{components::card::Card, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let home = &state.home;
    let card = Card::new("Latest Financial News", theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if home.loading {
        render_notice(frame, inner, "Loading news...", theme.dim);
        return;
    }
    if let Some(error) = &home.error {
        render_notice(frame, inner, &format!("Error: {error}"), theme.error);
        return;
    }
    if home.articles.is_empty() {
        render_notice(frame, inner, "No news right now.", theme.dim);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(inner);

    let items: Vec<ListItem> = home
        .articles
        .iter()
        .map(|article| article_item(article, theme))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(theme.panel))
        .highlight_symbol("› ");
    let mut list_state = ListState::default().with_selected(Some(home.selected));
    frame.render_stateful_widget(list, layout[0], &mut list_state);

    if let Some(article) = home.articles.get(home.selected) {
        render_article(frame, layout[1], article, theme);
    }
}

fn article_item<'a>(article: &'a Article, theme: &Theme) -> ListItem<'a> {
    let source = article
        .source
        .as_ref()
        .and_then(|s| s.name.as_deref())
        .unwrap_or("Unknown source");
    let published = article
        .published_at
        .as_deref()
        .and_then(|p| p.get(..10))
        .unwrap_or("");

    ListItem::new(vec![
        Line::from(Span::styled(
            article.title.as_str(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(source, Style::default().fg(theme.accent)),
            Span::styled(format!("  {published}"), Style::default().fg(theme.dim)),
        ]),
    ])
}

fn render_article(frame: &mut Frame<'_>, area: Rect, article: &Article, theme: &Theme) {
    let mut lines = Vec::new();
    if let Some(description) = &article.description {
        lines.push(Line::from(Span::styled(
            description.as_str(),
            Style::default().fg(theme.text_muted),
        )));
    }
    lines.push(Line::from(Span::styled(
        article.url.as_str(),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::UNDERLINED),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_notice(frame: &mut Frame<'_>, area: Rect, text: &str, color: ratatui::style::Color) {
    frame.render_widget(
        Paragraph::new(Span::styled(text.to_string(), Style::default().fg(color))),
        area,
    );
}
