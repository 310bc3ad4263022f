use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Terminal,
};

use crate::controls::StatusSnapshot;

const KEY_HINTS: &str = "space start/stop   +/- in-flight limit   q quit";

/// Render the status screen: header, playback gauge, scheduler details, logs.
pub fn draw_status(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    title: &str,
    status: &StatusSnapshot,
    log_lines: &[String],
) {
    let _ = terminal.draw(|f| {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(status.details.len() as u16 + 2),
                Constraint::Min(3),
            ])
            .split(f.size());

        let header = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::styled(status.headline.as_str(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray))),
        ]);
        f.render_widget(header, rows[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Played"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(status.ratio)
            .label(status.gauge_label.as_str());
        f.render_widget(gauge, rows[1]);

        let details: Vec<ListItem> = status
            .details
            .iter()
            .map(|line| ListItem::new(line.as_str()))
            .collect();
        f.render_widget(
            List::new(details).block(Block::default().borders(Borders::ALL).title("Scheduler")),
            rows[2],
        );

        // Newest lines last, trimmed to the pane height.
        let visible = rows[3].height.saturating_sub(2) as usize;
        let logs: Vec<ListItem> = log_lines
            .iter()
            .skip(log_lines.len().saturating_sub(visible))
            .map(|line| ListItem::new(line.as_str()))
            .collect();
        f.render_widget(
            List::new(logs)
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title("Log")),
            rows[3],
        );
    });
}
