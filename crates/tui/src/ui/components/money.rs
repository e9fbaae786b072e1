use engine::format_currency;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// Rupee amount colored by sign: income green, expenses red.
#[must_use]
pub fn styled_amount(amount: f64, theme: &Theme) -> Span<'static> {
    Span::styled(format_currency(amount), Style::default().fg(amount_color(amount, theme)))
}

#[must_use]
pub fn styled_amount_bold(amount: f64, theme: &Theme) -> Span<'static> {
    Span::styled(
        format_currency(amount),
        Style::default()
            .fg(amount_color(amount, theme))
            .add_modifier(Modifier::BOLD),
    )
}

fn amount_color(amount: f64, theme: &Theme) -> ratatui::style::Color {
    if amount > 0.0 {
        theme.positive
    } else if amount < 0.0 {
        theme.negative
    } else {
        theme.text
    }
}
