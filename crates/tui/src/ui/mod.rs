pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::{AppState, Page};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

use components::hints::{hint_separator, hints_to_spans, page_hints};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        area,
    );

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Length(2), // Tab bar (label + underline)
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    let page = state.visible_page();
    render_info_bar(frame, layout[0], state, &theme);
    components::tabs::render_tabs(frame, layout[1], page, state.user.is_some(), &theme);

    match page {
        Page::Home => screens::home::render(frame, layout[2], state, &theme),
        Page::Login => screens::login::render(frame, layout[2], state, &theme),
        Page::Dashboard => screens::dashboard::render(frame, layout[2], state, &theme),
        Page::History => screens::history::render(frame, layout[2], state, &theme),
    }

    render_bottom_bar(frame, layout[3], state, &theme);
    components::diagnostics::render(frame, area, state, &theme);
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .user
        .as_ref()
        .map(|u| u.email.as_str())
        .unwrap_or("not signed in");
    let saves = if state.diagnostics.is_empty() {
        Span::raw("")
    } else {
        Span::styled(
            format!("  {} background saves", state.diagnostics.len()),
            Style::default().fg(theme.dim),
        )
    };

    let line = Line::from(vec![
        Span::styled("SpendScope", Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled("User", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Page", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}", state.visible_page().label())),
        saves,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let editing = state.editing();
    let mut parts = Vec::new();

    if !editing {
        parts.extend(components::tabs::tab_shortcuts(state.user.is_some(), theme));
        parts.push(hint_separator(theme));
    }
    parts.extend(hints_to_spans(&page_hints(state), theme));

    parts.push(hint_separator(theme));
    if !editing {
        parts.push(Span::styled("g", Style::default().fg(theme.accent)));
        parts.push(Span::raw(" diagnostics  "));
        parts.push(Span::styled("q", Style::default().fg(theme.accent)));
    } else {
        parts.push(Span::styled("Ctrl+C", Style::default().fg(theme.accent)));
    }
    parts.push(Span::raw(" quit"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

#[cfg(test)]
mod tests {
    use api_types::{
        analysis::{AnalysisResult, Summary},
        history::AnalysisRecord,
        news::Article,
        transaction::Transaction,
    };
    use engine::Thresholds;
    use ratatui::{Terminal, backend::TestBackend};
    use services::User;

    use super::*;
    use crate::app::{DashboardFocus, Message};

    fn state() -> AppState {
        AppState::new(chrono_tz::UTC, Thresholds::default())
    }

    fn screen_text(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn signed_in() -> AppState {
        let mut s = state();
        s.update(Message::SessionChanged(Some(User {
            uid: "u1".to_string(),
            email: "a@example.com".to_string(),
            ..User::default()
        })));
        s
    }

    fn result() -> AnalysisResult {
        let mut result = AnalysisResult {
            transactions: vec![
                Transaction {
                    date: "2024-03-01".to_string(),
                    description: "Rooftop dinner".to_string(),
                    amount: -3000.0,
                    category: "Dining".to_string(),
                    is_anomaly: true,
                },
                Transaction {
                    description: "Groceries".to_string(),
                    amount: -900.0,
                    ..Transaction::default()
                },
            ],
            summary: Summary {
                total_expenses: 3900.0,
                anomalies_found: 1,
                ..Summary::default()
            },
            file_name: Some("march.csv".to_string()),
            ..AnalysisResult::default()
        };
        result
            .analysis
            .category_averages
            .insert("Dining".to_string(), 1000.0);
        result
    }

    #[test]
    fn home_shows_loading_then_articles() {
        let mut s = state();
        s.update(Message::Navigate(Page::Home));
        assert!(screen_text(&s).contains("Loading news..."));

        s.update(Message::NewsLoaded(Ok(vec![Article {
            title: "Markets rally".to_string(),
            url: "https://news.example/1".to_string(),
            ..Article::default()
        }])));
        let text = screen_text(&s);
        assert!(text.contains("Latest Financial News"));
        assert!(text.contains("Markets rally"));
    }

    #[test]
    fn news_error_is_prefixed() {
        let mut s = state();
        s.update(Message::Navigate(Page::Home));
        s.update(Message::NewsLoaded(Err("Failed to fetch news from the server.".into())));
        assert!(screen_text(&s).contains("Error: Failed to fetch news from the server."));
    }

    #[test]
    fn login_shows_mode_title() {
        let mut s = state();
        s.update(Message::Navigate(Page::Login));
        assert!(screen_text(&s).contains("Welcome Back!"));
        s.login.toggle_mode();
        assert!(screen_text(&s).contains("Create a New Account"));
    }

    #[test]
    fn dashboard_prompt_then_results() {
        let mut s = signed_in();
        let text = screen_text(&s);
        assert!(text.contains("Upload Your Statement"));
        assert!(text.contains("Date,Description,Amount,Category"));

        s.dashboard.show(result());
        let text = screen_text(&s);
        assert!(text.contains("Showing results for: march.csv"));
        assert!(text.contains("Total Expenses"));
        assert!(text.contains("Anomalies Found"));
        assert!(text.contains("Rooftop dinner"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn detail_shows_explanation() {
        let mut s = signed_in();
        s.dashboard.show(result());
        s.dashboard.toggle_detail();
        let text = screen_text(&s);
        assert!(text.contains("Above-average expense"));
        assert!(text.contains("3.0 times higher"));
    }

    #[test]
    fn detail_of_normal_row_says_so() {
        let mut s = signed_in();
        s.dashboard.show(result());
        s.dashboard.push_search('g');
        s.dashboard.push_search('r');
        s.dashboard.push_search('o');
        s.dashboard.toggle_detail();
        let text = screen_text(&s);
        assert!(text.contains("This transaction looks normal."));
        assert!(!text.contains("Unusual pattern"));
    }

    #[test]
    fn search_hint_names_every_searched_field() {
        let mut s = signed_in();
        s.dashboard.show(result());
        s.dashboard.focus = DashboardFocus::Browse;
        assert!(screen_text(&s).contains("description, category or amount"));
    }

    #[test]
    fn empty_filter_result_says_so() {
        let mut s = signed_in();
        s.dashboard.show(result());
        s.dashboard.push_search('z');
        assert!(screen_text(&s).contains("No transactions to display."));
    }

    #[test]
    fn history_lists_records() {
        let mut s = signed_in();
        s.update(Message::Navigate(Page::History));
        assert!(screen_text(&s).contains("Loading history..."));

        s.update(Message::HistoryLoaded(Ok(Vec::new())));
        assert!(screen_text(&s).contains("You haven't uploaded any statements yet."));

        s.update(Message::HistoryLoaded(Ok(vec![AnalysisRecord {
            id: "d1".to_string(),
            result: result(),
        }])));
        let text = screen_text(&s);
        assert!(text.contains("Analysis History"));
        assert!(text.contains("1 Anomalies"));
        assert!(text.contains("2 Transactions"));
    }
}
