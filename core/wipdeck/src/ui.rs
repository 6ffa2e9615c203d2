//! ratatui view of the current board: header, task table, alerts, footer.

use crate::app::App;
use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use wipdeck_core::{format_age, Board, TaskRow, TaskState};

const NAME_WIDTH: usize = 34;
const STATUS_WIDTH: usize = 24;

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let alerts_height = app
        .board()
        .map(|b| b.attention_rows().count())
        .filter(|n| *n > 0)
        .map(|n| n as u16 + 2)
        .unwrap_or(0);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(alerts_height),
        Constraint::Length(1),
    ])
    .split(area);

    f.render_widget(Paragraph::new(header(app)), chunks[0]);

    match app.board() {
        Some(board) if !board.rows.is_empty() => {
            f.render_widget(task_table(board, app.selected()), chunks[1]);
            if alerts_height > 0 {
                f.render_widget(alerts(board), chunks[2]);
            }
        }
        _ => {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  No active tasks in wip/",
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
            f.render_widget(empty, chunks[1]);
        }
    }

    f.render_widget(Paragraph::new(footer(app)), chunks[3]);
}

fn header(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            "=== Task Manager === ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(Local::now().format("%H:%M:%S").to_string()),
        Span::styled(
            format!(" (every {}s)", app.interval().as_secs()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(board) = app.board() {
        if !board.windows_known {
            spans.push(Span::styled(
                "  tmux windows unknown",
                Style::default().fg(Color::Yellow),
            ));
        }
    }
    Line::from(spans)
}

fn state_color(state: TaskState) -> Color {
    match state {
        TaskState::NeedsAttention | TaskState::Crashed => Color::Red,
        TaskState::Blocked => Color::LightRed,
        TaskState::Stale => Color::Yellow,
        TaskState::Completed => Color::Cyan,
        TaskState::Running => Color::Green,
    }
}

fn task_table(board: &Board, selected: usize) -> Table<'static> {
    let now = board.refreshed_at;
    let rows: Vec<Row> = board
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let color = state_color(row.state());
            let mut style = Style::default().fg(color);
            if i == selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate(&row.record.name, NAME_WIDTH)),
                Cell::from(truncate(&row.record.status_text, STATUS_WIDTH)),
                Cell::from(format_age(row.record.last_updated, now)),
                Cell::from(row.state().label()),
                Cell::from(agent_column(row)),
                Cell::from(progress_column(row)),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["#", "TASK", "STATUS", "UPDATED", "STATE", "AGENT", "DONE"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Length(15),
            Constraint::Length(17),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .column_spacing(1)
}

fn agent_column(row: &TaskRow) -> String {
    let agent = if row.has_worker { "RUNNING" } else { "STOPPED" };
    match row.record.session_window_ref {
        Some(window) => format!("{} (win {})", agent, window),
        None => agent.to_string(),
    }
}

fn progress_column(row: &TaskRow) -> String {
    let progress = row.record.progress;
    if progress.total == 0 {
        String::new()
    } else {
        format!("[{}/{}]", progress.done, progress.total)
    }
}

fn alerts(board: &Board) -> Paragraph<'static> {
    let lines: Vec<Line> = board
        .attention_rows()
        .map(|(i, row)| {
            let state = row.state();
            let mut text = format!("#{} {}: {}", i + 1, row.record.name, state.label());
            if let Some(reason) = &row.classification.reason {
                text.push_str(&format!(" ({})", reason));
            }
            Line::from(Span::styled(text, Style::default().fg(state_color(state))))
        })
        .collect();

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .title(" Alerts ")
            .border_style(Style::default().fg(Color::DarkGray)),
    )
}

fn footer(app: &App) -> Line<'static> {
    if let Some(message) = app.message() {
        return Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Cyan),
        ));
    }

    let key = Style::default().fg(Color::DarkGray);
    let label = Style::default().fg(Color::Gray);
    let mut spans = vec![
        Span::styled(" [r]", key),
        Span::styled("efresh ", label),
    ];
    if app.can_switch_windows() {
        let count = app.board().map(|b| b.rows.len().min(9)).unwrap_or(0);
        if count > 0 {
            spans.push(Span::styled(format!(" [1-{}]", count), key));
            spans.push(Span::styled(" switch to window ", label));
        }
        spans.push(Span::styled(" [↑↓/jk Enter]", key));
        spans.push(Span::styled(" select ", label));
    }
    spans.push(Span::styled(" [q]", key));
    spans.push(Span::styled("uit", label));
    Line::from(spans)
}

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
