use std::collections::BTreeMap;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Paragraph},
};

use crate::ui::{components::card::Card, theme::Theme};

/// Whole-rupee bar heights for a label → amount series. Spending may arrive
/// signed, so magnitudes are used.
pub fn bar_values(series: &BTreeMap<String, f64>) -> Vec<(String, u64)> {
    series
        .iter()
        .map(|(label, value)| {
            let height = if value.is_finite() {
                value.abs().round() as u64
            } else {
                0
            };
            (label.clone(), height)
        })
        .collect()
}

/// Vertical bar chart in a card, one bar per key in key order.
pub fn render_bar_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    series: &BTreeMap<String, f64>,
    theme: &Theme,
) {
    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if series.is_empty() {
        render_no_data(frame, inner, theme);
        return;
    }

    let values = bar_values(series);
    let data: Vec<(&str, u64)> = values.iter().map(|(l, v)| (l.as_str(), *v)).collect();
    let bar_width = values
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(3)
        .clamp(3, 10) as u16;

    let chart = BarChart::default()
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(
            Style::default()
                .fg(theme.background)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .label_style(Style::default().fg(theme.dim));
    frame.render_widget(chart, inner);
}

/// Horizontal breakdown: label, proportional bar, share of the total.
pub fn render_breakdown(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    series: &BTreeMap<String, f64>,
    theme: &Theme,
) {
    let card = Card::new(title, theme);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    if series.is_empty() {
        render_no_data(frame, inner, theme);
        return;
    }

    let mut values = bar_values(series);
    values.sort_by(|a, b| b.1.cmp(&a.1));
    let max = values.first().map(|(_, v)| *v).unwrap_or(0);
    let total: u64 = values.iter().map(|(_, v)| v).sum();
    let label_width = values
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(16);
    let bar_width = (inner.width as usize).saturating_sub(label_width + 8).max(4);

    let lines: Vec<Line> = values
        .iter()
        .take(inner.height as usize)
        .map(|(label, value)| {
            let share = if total == 0 { 0 } else { value * 100 / total };
            Line::from(vec![
                Span::styled(
                    format!("{label:<label_width$.label_width$} "),
                    Style::default().fg(theme.text),
                ),
                Span::styled(ascii_bar(*value, max, bar_width), Style::default().fg(theme.accent)),
                Span::styled(format!(" {share:>3}%"), Style::default().fg(theme.dim)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_no_data(frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    frame.render_widget(
        Paragraph::new(Span::styled("No data", Style::default().fg(theme.dim))),
        area,
    );
}

/// `████░░░░` sized to `value / max`.
#[must_use]
pub fn ascii_bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return "░".repeat(width);
    }

    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64) as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_use_magnitudes() {
        let series = BTreeMap::from([
            ("2024-03".to_string(), -1234.6),
            ("2024-04".to_string(), 10.0),
            ("2024-05".to_string(), f64::NAN),
        ]);
        assert_eq!(
            bar_values(&series),
            [
                ("2024-03".to_string(), 1235),
                ("2024-04".to_string(), 10),
                ("2024-05".to_string(), 0),
            ]
        );
    }

    #[test]
    fn ascii_bar_scales() {
        assert_eq!(ascii_bar(5, 10, 4), "██░░");
        assert_eq!(ascii_bar(3, 0, 3), "░░░");
    }
}
