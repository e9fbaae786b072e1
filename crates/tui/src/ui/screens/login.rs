use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::{components::centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let login = &state.login;
    let card_area = centered_box(44, 11, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", login.mode.title()),
            Style::default().fg(theme.accent),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Email label
            Constraint::Length(1), // Email
            Constraint::Length(1),
            Constraint::Length(1), // Password label
            Constraint::Length(1), // Password
            Constraint::Length(1),
            Constraint::Length(1), // Submit
            Constraint::Length(1), // Toggle
        ])
        .horizontal_margin(1)
        .split(inner);

    render_label(frame, rows[0], "Email", theme);
    render_input(
        frame,
        rows[1],
        &login.email,
        false,
        login.focus == LoginField::Email,
        theme,
    );
    render_label(frame, rows[3], "Password", theme);
    render_input(
        frame,
        rows[4],
        &login.password,
        true,
        login.focus == LoginField::Password,
        theme,
    );

    let submit = if login.pending {
        "Please wait..."
    } else {
        login.mode.submit_label()
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("[ {submit} ]"),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        rows[6],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(login.mode.toggle_hint(), Style::default().fg(theme.dim)),
            Span::styled(" (Ctrl+T)", Style::default().fg(theme.accent)),
        ]))
        .alignment(Alignment::Center),
        rows[7],
    );

    if let Some(message) = &login.message {
        let error_area = Rect {
            x: card_area.x,
            y: card_area.y + card_area.height,
            width: card_area.width,
            height: 1,
        }
        .intersection(area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            error_area,
        );
    }
}

fn render_label(frame: &mut Frame<'_>, area: Rect, label: &str, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(Span::styled(label.to_string(), Style::default().fg(theme.dim))),
        area,
    );
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    value: &str,
    is_password: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let shown = if is_password {
        mask_password(value)
    } else {
        value.to_string()
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    frame.render_widget(
        Paragraph::new(Span::styled(format!("{shown}{cursor}"), style)),
        area,
    );
}

/// One bullet per character.
fn mask_password(password: &str) -> String {
    "•".repeat(password.chars().count())
}
