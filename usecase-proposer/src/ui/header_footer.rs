//! Header and footer chrome

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, RunPhase, View};

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let credential_span = if app.credentials.valid {
        Span::styled(" credentials ok ", Style::default().fg(Color::Green))
    } else {
        Span::styled(
            format!(" missing: {} ", app.credentials.missing_summary()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    };

    let phase_span = match app.phase {
        RunPhase::Idle => Span::styled("idle", Style::default().fg(Color::DarkGray)),
        RunPhase::Validating => Span::styled("validating", Style::default().fg(Color::Yellow)),
        RunPhase::Running => Span::styled(
            "running",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        RunPhase::Succeeded => Span::styled("done", Style::default().fg(Color::Green)),
        RunPhase::Failed => Span::styled("failed", Style::default().fg(Color::Red)),
    };

    let title = Line::from(vec![
        Span::styled(
            " AI/ML Use Case Proposal Generator ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("| "),
        phase_span,
        Span::raw(" |"),
        credential_span,
    ]);

    let header = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

pub fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let hints = if app.is_editing {
        "type company name | Enter/Esc: done".to_string()
    } else {
        match app.current_view {
            View::Run => {
                "e: edit company | Enter: run | x: example | v: verbose | c: competitors | \
                 +/-: tokens | 1-3/d: export | h: history | q: quit"
                    .to_string()
            }
            View::History => "↑/↓: select | Enter: open | Esc: back | q: quit".to_string(),
        }
    };

    let line = if let Some(notice) = &app.notice {
        Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
