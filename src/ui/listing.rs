use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::ListingView;

pub fn render(frame: &mut Frame, area: Rect, view: &ListingView) {
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0]);
    render_entries(frame, chunks[1], view);
    render_controls(frame, chunks[2]);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(Span::styled(
            "ASSESSMENTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from("Progress is saved automatically; unfinished attempts resume.".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_entries(frame: &mut Frame, area: Rect, view: &ListingView) {
    if !view.loaded {
        frame.render_widget(
            Paragraph::new("Loading...").alignment(Alignment::Center).fg(Color::DarkGray),
            area,
        );
        return;
    }
    if view.entries.is_empty() {
        frame.render_widget(
            Paragraph::new("No assessments available")
                .alignment(Alignment::Center)
                .fg(Color::DarkGray),
            area,
        );
        return;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(view.entries.len() * 3);
    for (index, entry) in view.entries.iter().enumerate() {
        let is_selected = index == view.selected;
        let style = if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { ">" } else { " " };

        let mut title = vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(entry.summary.title.as_str(), style),
        ];
        if entry.resumable {
            title.push(Span::styled("  resume", Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(title));
        lines.push(Line::from(Span::styled(
            format!(
                "   {} questions · {}",
                entry.summary.question_count, entry.summary.estimated_time
            ),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k navigate  ·  enter take  ·  r results  ·  s survey  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
