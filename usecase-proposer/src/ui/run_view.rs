//! Run view: input form, pipeline progress, result and artifacts

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use usecase_proposer_sdk::RunStatus;

use crate::app::{App, RunPhase};

pub fn render_run(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(area);

    render_form_column(f, columns[0], app);
    render_result_column(f, columns[1], app);
}

fn render_form_column(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    render_company_input(f, rows[0], app);
    render_options(f, rows[1], app);
    render_stage_progress(f, rows[2], app);
}

fn render_company_input(f: &mut Frame, area: Rect, app: &App) {
    let (border_style, title) = if app.is_editing {
        (Style::default().fg(Color::Yellow), " Company (editing) ")
    } else {
        (Style::default(), " Company ")
    };

    let content = if app.company_input.is_empty() && !app.is_editing {
        Span::styled(
            "press 'e' to type, 'x' for an example",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::raw(app.company_input.as_str())
    };

    let input = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(input, area);
}

fn render_options(f: &mut Frame, area: Rect, app: &App) {
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    let run_hint = if app.can_run() {
        Span::styled("Enter: run pipeline", Style::default().fg(Color::Green))
    } else {
        Span::styled("run blocked", Style::default().fg(Color::Red))
    };

    let lines = vec![
        Line::from(format!("max tokens:  {}", app.options.max_tokens)),
        Line::from(format!(
            "verbose: {}   competitors: {}",
            on_off(app.options.verbose),
            on_off(app.options.include_competitors)
        )),
        Line::from(run_hint),
    ];

    let options = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Advanced Options "),
    );
    f.render_widget(options, area);
}

fn render_stage_progress(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.stages.is_empty() {
        vec![ListItem::new(Span::styled(
            "no run yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.stages
            .iter()
            .flat_map(|s| {
                let (marker, style) = match s.status {
                    RunStatus::NotStarted => ("○", Style::default().fg(Color::DarkGray)),
                    RunStatus::Running => ("◐", Style::default().fg(Color::Cyan)),
                    RunStatus::Completed => ("●", Style::default().fg(Color::Green)),
                    RunStatus::Failed => ("✗", Style::default().fg(Color::Red)),
                };
                let mut lines = vec![ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", marker), style),
                    Span::styled(
                        format!("Stage {}: {}", s.stage, s.role),
                        style.add_modifier(Modifier::BOLD),
                    ),
                ]))];
                if let Some(path) = &s.artifact {
                    lines.push(ListItem::new(Line::from(Span::styled(
                        format!("    wrote {}", path),
                        Style::default().fg(Color::DarkGray),
                    ))));
                }
                if let Some(last) = s.messages.last() {
                    lines.push(ListItem::new(Line::from(Span::styled(
                        format!("    {}", last.replace('\n', " ")),
                        Style::default().fg(Color::DarkGray),
                    ))));
                }
                lines
            })
            .collect()
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Pipeline "));
    f.render_widget(list, area);
}

fn render_result_column(f: &mut Frame, area: Rect, app: &App) {
    // An error gets its own labeled box above the result
    let (error_height, artifact_height) = if app.error.is_some() {
        (4, 9)
    } else {
        (0, 9)
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(error_height),
            Constraint::Min(0),
            Constraint::Length(artifact_height),
        ])
        .split(area);

    if let Some(error) = &app.error {
        let error_box = Paragraph::new(error.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Red))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error "),
            );
        f.render_widget(error_box, rows[0]);
    }

    render_result(f, rows[1], app);
    render_artifacts(f, rows[2], app);
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.displayed_company.is_empty() {
        " Final Proposal ".to_string()
    } else {
        format!(" Final Proposal: {} ", app.displayed_company)
    };

    let result = match (&app.result, app.phase) {
        (Some(text), _) => Paragraph::new(text.as_str()),
        (None, RunPhase::Running) => Paragraph::new(Span::styled(
            "pipeline running...",
            Style::default().fg(Color::Cyan),
        )),
        (None, _) => Paragraph::new(Span::styled(
            "run the pipeline or open a history entry",
            Style::default().fg(Color::DarkGray),
        )),
    }
    .wrap(Wrap { trim: false })
    .scroll((app.result_scroll, 0))
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(result, area);
}

fn render_artifacts(f: &mut Frame, area: Rect, app: &App) {
    if app.artifacts.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            "stage outputs appear here after a run",
            Style::default().fg(Color::DarkGray),
        ))
        .block(Block::default().borders(Borders::ALL).title(" Artifacts "));
        f.render_widget(placeholder, area);
        return;
    }

    let thirds = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (view, slot) in app.artifacts.iter().zip(thirds.iter()) {
        let widget = match &view.content {
            Some(content) => Paragraph::new(content.as_str())
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" {} ", view.label)),
                ),
            // Missing artifact degrades to a warning, the siblings render
            None => Paragraph::new(Span::styled(
                format!("warning: {} not found", view.file),
                Style::default().fg(Color::Yellow),
            ))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(format!(" {} ", view.label)),
            ),
        };
        f.render_widget(widget, *slot);
    }
}
