//! History view: the five most recent runs, newest first

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;

use super::HISTORY_LIMIT;

pub fn render_history(f: &mut Frame, area: Rect, app: &App) {
    let recent = app.history.recent(HISTORY_LIMIT);

    let items: Vec<ListItem> = if recent.is_empty() {
        vec![ListItem::new(Span::styled(
            "no completed runs this session",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        recent
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let selected = i == app.history_cursor;
                let style = if selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                ListItem::new(Line::from(vec![
                    Span::raw(if selected { "▶ " } else { "  " }),
                    Span::styled(
                        format!(
                            "#{:<3} {}  {}  {:.1}s",
                            record.seq,
                            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            record.company,
                            record.duration_secs
                        ),
                        style,
                    ),
                ]))
            })
            .collect()
    };

    let title = format!(" Run History ({} total this session) ", app.history.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}
