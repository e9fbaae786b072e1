use api_types::{analysis::AnalysisResult, transaction::Transaction};
use engine::{StatusFilter, format_currency};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap,
    },
};

use crate::{
    app::{AppState, DashboardFocus, DashboardState},
    ui::{
        components::{
            card::{Card, StatCard},
            centered_rect,
            charts::{render_bar_chart, render_breakdown},
            money::{styled_amount, styled_amount_bold},
        },
        theme::Theme,
    },
};

const CSV_COLUMNS_NOTE: &str =
    "Please ensure your CSV file has the columns: Date,Description,Amount,Category";

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let dash = &state.dashboard;
    let Some(result) = dash.result.as_ref() else {
        render_upload_prompt(frame, area, dash, theme);
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Results header / path input
            Constraint::Length(4),  // Summary cards
            Constraint::Length(10), // Charts
            Constraint::Length(1),  // Search and status filter
            Constraint::Min(3),     // Transactions
        ])
        .split(area);

    render_header(frame, layout[0], dash, result, theme);
    render_summary(frame, layout[1], result, theme);
    render_charts(frame, layout[2], result, theme);
    render_filters(frame, layout[3], dash, theme);
    render_table(frame, layout[4], dash, theme);

    if dash.detail_open {
        render_detail(frame, area, state, theme);
    }
}

fn render_upload_prompt(frame: &mut Frame<'_>, area: Rect, dash: &DashboardState, theme: &Theme) {
    let card = Card::new("Upload Your Statement", theme).focused(dash.focus == DashboardFocus::Path);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let mut lines = vec![
        Line::from(Span::styled(CSV_COLUMNS_NOTE, Style::default().fg(theme.text_muted))),
        Line::default(),
        path_line(dash, theme),
        Line::default(),
    ];

    if dash.loading {
        lines.push(Line::from(Span::styled(
            "Analyzing...",
            Style::default().fg(theme.warning),
        )));
    } else if let Some(error) = &dash.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(theme.error),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn path_line<'a>(dash: &'a DashboardState, theme: &Theme) -> Line<'a> {
    let focused = dash.focus == DashboardFocus::Path;
    let cursor = if focused { "│" } else { "" };
    let value_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };
    Line::from(vec![
        Span::styled("CSV file: ", Style::default().fg(theme.dim)),
        Span::styled(dash.path_input.as_str(), value_style),
        Span::styled(cursor, value_style),
    ])
}

fn render_header(
    frame: &mut Frame<'_>,
    area: Rect,
    dash: &DashboardState,
    result: &AnalysisResult,
    theme: &Theme,
) {
    let line = if dash.focus == DashboardFocus::Path || dash.loading {
        let mut line = path_line(dash, theme);
        if dash.loading {
            line.push_span(Span::styled("  Analyzing...", Style::default().fg(theme.warning)));
        }
        line
    } else if let Some(error) = &dash.error {
        Line::from(Span::styled(error.as_str(), Style::default().fg(theme.error)))
    } else {
        Line::from(vec![
            Span::styled("Showing results for: ", Style::default().fg(theme.dim)),
            Span::styled(
                result.display_name(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_summary(frame: &mut Frame<'_>, area: Rect, result: &AnalysisResult, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    let summary = &result.summary;

    StatCard::new(
        "Total Expenses",
        Span::styled(
            format_currency(summary.total_expenses),
            Style::default().fg(theme.negative),
        ),
        theme,
    )
    .render(frame, cols[0]);
    StatCard::new(
        "Total Income",
        Span::styled(
            format_currency(summary.total_income),
            Style::default().fg(theme.positive),
        ),
        theme,
    )
    .render(frame, cols[1]);
    StatCard::new("Net Balance", styled_amount_bold(summary.balance, theme), theme)
        .render(frame, cols[2]);
    StatCard::new(
        "Anomalies Found",
        Span::styled(
            summary.anomalies_found.to_string(),
            Style::default().fg(theme.warning),
        ),
        theme,
    )
    .caption(format!("of {} transactions", result.transaction_count()))
    .render(frame, cols[3]);
}

fn render_charts(frame: &mut Frame<'_>, area: Rect, result: &AnalysisResult, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_bar_chart(
        frame,
        cols[0],
        "Monthly Spending",
        &result.charts_data.monthly_spending,
        theme,
    );
    render_breakdown(
        frame,
        cols[1],
        "Spending by Category",
        &result.charts_data.category_spending,
        theme,
    );
}

fn render_filters(frame: &mut Frame<'_>, area: Rect, dash: &DashboardState, theme: &Theme) {
    let search_focused = dash.focus == DashboardFocus::Search;
    let search_style = if search_focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text_muted)
    };

    let mut spans = vec![
        Span::styled("Search: ", Style::default().fg(theme.dim)),
        Span::styled(dash.search.as_str(), search_style),
    ];
    if search_focused {
        spans.push(Span::styled("│", search_style));
    } else if dash.search.is_empty() {
        spans.push(Span::styled(
            "description, category or amount",
            Style::default().fg(theme.dim),
        ));
    }
    spans.push(Span::raw("    "));

    for status in [StatusFilter::All, StatusFilter::Anomalies, StatusFilter::Normal] {
        let style = if status == dash.status {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(theme.text_muted)
        };
        spans.push(Span::styled(format!(" {} ", status.label()), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}

fn transaction_row<'a>(tx: &'a Transaction, theme: &Theme) -> Row<'a> {
    let status = if tx.is_anomaly {
        Span::styled("Anomaly", Style::default().fg(theme.warning))
    } else {
        Span::styled("Normal", Style::default().fg(theme.dim))
    };
    let row = Row::new(vec![
        Cell::from(or_na(&tx.date)),
        Cell::from(or_na(&tx.description)),
        Cell::from(styled_amount(tx.amount, theme)),
        Cell::from(or_na(&tx.category)),
        Cell::from(status),
    ]);
    if tx.is_anomaly {
        row.style(Style::default().bg(theme.panel))
    } else {
        row
    }
}

fn render_table(frame: &mut Frame<'_>, area: Rect, dash: &DashboardState, theme: &Theme) {
    let title = format!("Transactions ({})", dash.view.len());
    let card = Card::new(&title, theme).focused(dash.focus == DashboardFocus::Browse);
    let inner = card.inner(area);
    card.render_frame(frame, area);

    let transactions = dash.transactions().unwrap_or_default();
    if dash.view.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No transactions to display.",
                Style::default().fg(theme.dim),
            ))
            .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let rows: Vec<Row> = dash
        .view
        .indices()
        .iter()
        .filter_map(|&i| transactions.get(i))
        .map(|tx| transaction_row(tx, theme))
        .collect();

    let header = Row::new(["Date", "Description", "Amount", "Category", "Status"]).style(
        Style::default()
            .fg(theme.text_muted)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(16),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .highlight_symbol("› ");

    let mut table_state = TableState::default().with_selected(Some(dash.selected));
    frame.render_stateful_widget(table, inner, &mut table_state);
}

fn render_detail(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let dash = &state.dashboard;
    let Some(tx) = dash.selected_transaction() else {
        return;
    };

    let popup = centered_rect(60, 50, area);
    let block = Block::default()
        .title(Span::styled(
            " Transaction Details ",
            Style::default().fg(theme.accent),
        ))
        .title_bottom(Line::from(vec![
            Span::styled(" Esc", Style::default().fg(theme.accent)),
            Span::raw(" close "),
        ]))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.panel));

    let field = |label: &'static str, value: Span<'static>| {
        Line::from(vec![
            Span::styled(format!("{label:<13}"), Style::default().fg(theme.dim)),
            value,
        ])
    };
    let text = |value: &str| Span::styled(or_na(value).to_string(), Style::default().fg(theme.text));

    let mut lines = vec![
        field("Date", text(&tx.date)),
        field("Description", text(&tx.description)),
        field("Amount", styled_amount(tx.amount, theme)),
        field("Category", text(&tx.category)),
        Line::default(),
    ];

    match dash.explanation(&state.thresholds) {
        Some(explanation) => {
            let color = theme.tone(explanation.tone());
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", explanation.icon()), Style::default().fg(color)),
                Span::styled(
                    explanation.label(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                explanation.message(),
                Style::default().fg(theme.text),
            )));
        }
        None => lines.push(Line::from(Span::styled(
            "This transaction looks normal.",
            Style::default().fg(theme.positive),
        ))),
    }

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}
