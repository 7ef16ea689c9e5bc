use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::TakingView;
use crate::models::{Question, QuestionKind};
use crate::session::Phase;

use super::{dialogs, format_elapsed};

pub fn render(frame: &mut Frame, area: Rect, view: &TakingView) {
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], view);
    render_progress(frame, chunks[1], chunks[2], view);

    let question = view.attempt.current_question();
    if let Some(question) = question {
        render_question(frame, chunks[4], view, question);
    }
    render_controls(frame, chunks[5], question.map(|q| q.kind));

    if let Some(dialog) = view.dialog {
        dialogs::render(frame, area, dialog, &view.attempt);
    }
}

fn render_header(frame: &mut Frame, area: Rect, view: &TakingView) {
    let attempt = &view.attempt;
    let assessment = attempt.assessment();
    let [title, status] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(36)]).areas(area);

    let widget = Paragraph::new(assessment.title.as_str())
        .fg(Color::White)
        .bold()
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, title);

    let saved = match attempt.phase() {
        Phase::Submitting => Span::styled("sending...", Style::default().fg(Color::Cyan)),
        _ if attempt.is_saved() => Span::styled("saved", Style::default().fg(Color::Green)),
        _ => Span::styled("unsaved", Style::default().fg(Color::Yellow)),
    };
    let clock = format!(
        "  {} / {}",
        format_elapsed(attempt.state().elapsed_time),
        assessment.estimated_time
    );
    let widget = Paragraph::new(Line::from(vec![saved, Span::styled(clock, Style::default().fg(Color::DarkGray))]))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, status);
}

fn render_progress(frame: &mut Frame, gauge_area: Rect, text_area: Rect, view: &TakingView) {
    let progress = view.attempt.state().progress();

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio((progress.percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", progress.percent));
    frame.render_widget(gauge, gauge_area);

    let widget = Paragraph::new(format!(
        "{} remaining (current {} / {})",
        progress.remaining, progress.position, progress.total
    ))
    .alignment(Alignment::Right)
    .fg(Color::DarkGray);
    frame.render_widget(widget, text_area);
}

fn render_question(frame: &mut Frame, area: Rect, view: &TakingView, question: &Question) {
    let mut heading = vec![Span::styled(
        question.text.as_str(),
        Style::default().fg(Color::White).bold(),
    )];
    if question.required {
        heading.push(Span::styled(" *", Style::default().fg(Color::Red).bold()));
    }

    let mut lines = vec![Line::from(heading)];
    if let Some(description) = &question.description {
        lines.push(Line::from(Span::styled(
            description.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.extend(input_lines(view, question));

    let title = match &question.category {
        Some(category) => format!(" {} · {} ", question.kind.label(), category),
        None => format!(" {} ", question.kind.label()),
    };
    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .title(title.fg(Color::DarkGray))
            .padding(Padding::uniform(1)),
    );
    frame.render_widget(widget, area);
}

fn input_lines<'a>(view: &'a TakingView, question: &'a Question) -> Vec<Line<'a>> {
    let answer = view.attempt.current_answer();

    match question.kind {
        QuestionKind::Single | QuestionKind::Multiple => view
            .option_order
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let option = question.option(*id)?;
                let checked = answer.is_some_and(|a| a.as_choices().contains(id))
                    || answer.and_then(|a| a.as_number()) == Some(i64::from(*id));
                let mark = match (question.kind, checked) {
                    (QuestionKind::Multiple, true) => "[x]",
                    (QuestionKind::Multiple, false) => "[ ]",
                    (_, true) => "(•)",
                    (_, false) => "( )",
                };
                Some(choice_line(index == view.cursor, checked, mark, option.label.as_str()))
            })
            .collect(),
        QuestionKind::Rating => {
            let bounds = question.rating_bounds();
            let selected = answer.and_then(|a| a.as_number());
            let spans: Vec<Span> = bounds
                .values()
                .enumerate()
                .map(|(index, value)| {
                    let style = if selected == Some(value) {
                        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
                    } else if index == view.cursor {
                        Style::default().fg(Color::Cyan).bold()
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    Span::styled(format!(" {value} "), style)
                })
                .collect();
            vec![
                Line::from(spans),
                Line::from(Span::styled(
                    format!("{} = lowest, {} = highest", bounds.min, bounds.max),
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
        QuestionKind::Boolean => {
            let selected = answer.and_then(|a| a.as_flag());
            vec![
                choice_line(view.cursor == 0, selected == Some(true), "( )", "Yes"),
                choice_line(view.cursor == 1, selected == Some(false), "( )", "No"),
            ]
        }
        QuestionKind::Text => {
            let mut lines: Vec<Line> = view
                .current_text()
                .split('\n')
                .map(|line| Line::from(Span::styled(line, Style::default().fg(Color::White))))
                .collect();
            if let Some(last) = lines.last_mut() {
                last.push_span(Span::styled("▏", Style::default().fg(Color::Cyan)));
            }
            lines
        }
    }
}

fn choice_line<'a>(under_cursor: bool, checked: bool, mark: &'a str, label: &'a str) -> Line<'a> {
    let style = match (under_cursor, checked) {
        (true, _) => Style::default().fg(Color::Cyan).bold(),
        (false, true) => Style::default().fg(Color::Green),
        (false, false) => Style::default().fg(Color::Gray),
    };
    let mark = if checked && mark == "( )" { "(•)" } else { mark };
    let marker = if under_cursor { ">" } else { " " };

    Line::from(vec![
        Span::styled(format!(" {marker} "), style),
        Span::styled(format!("{mark} "), style),
        Span::styled(label, style),
    ])
}

fn render_controls(frame: &mut Frame, area: Rect, kind: Option<QuestionKind>) {
    let hint = match kind {
        Some(QuestionKind::Text) => "type to answer  ·  tab next  ·  shift-tab back  ·  F1 help  ·  esc exit",
        Some(QuestionKind::Rating) => "digits or j/k + enter  ·  tab next  ·  shift-tab back  ·  ? help  ·  esc exit",
        Some(QuestionKind::Multiple) => "j/k navigate  ·  space toggle  ·  tab next  ·  shift-tab back  ·  esc exit",
        _ => "j/k navigate  ·  enter select  ·  tab next  ·  shift-tab back  ·  ? help  ·  esc exit",
    };
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
