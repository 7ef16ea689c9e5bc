use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::ResultsView;
use crate::models::{AssessmentResult, CategoryScore};

pub fn render(frame: &mut Frame, area: Rect, view: &ResultsView) {
    let Some(result) = &view.result else {
        let widget = Paragraph::new("Loading results...")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray);
        frame.render_widget(widget, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], result);
    render_category_chart(frame, chunks[1], result);
    render_details(frame, chunks[2], result, view.scroll);
    render_controls(frame, chunks[3]);
}

fn grade_color(score: u8) -> Color {
    match score {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(frame: &mut Frame, area: Rect, result: &AssessmentResult) {
    let content = vec![
        Line::from(Span::styled(
            result.assessment_title.as_str(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(format!("Completed {}", result.completed_date).fg(Color::DarkGray)),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / 100", result.overall_score),
            Style::default().fg(grade_color(result.overall_score)).bold(),
        )),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

/// Score, industry average and previous score of one category, as charted.
fn category_series(score: &CategoryScore) -> [(&'static str, u8, Color); 3] {
    [
        ("you", score.score, grade_color(score.score)),
        ("avg", score.average, Color::Gray),
        ("prev", score.previous, Color::Blue),
    ]
}

const GROUP_GAP: u16 = 3;

/// Widest bars that still fit `groups` groups of three side by side.
fn bar_width(width: u16, groups: usize) -> u16 {
    let groups = u16::try_from(groups.max(1)).unwrap_or(u16::MAX);
    let per_group = width.saturating_sub(GROUP_GAP.saturating_mul(groups - 1)) / groups;
    (per_group / 3).clamp(1, 8)
}

fn render_category_chart(frame: &mut Frame, area: Rect, result: &AssessmentResult) {
    let [legend, chart] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

    let key = Line::from(vec![
        Span::styled("■ you  ", Style::default().fg(Color::White)),
        Span::styled("■ industry average  ", Style::default().fg(Color::Gray)),
        Span::styled("■ previous", Style::default().fg(Color::Blue)),
    ]);
    frame.render_widget(Paragraph::new(key).alignment(Alignment::Center), legend);

    let width = bar_width(chart.width.saturating_sub(2), result.category_scores.len());
    let mut widget = BarChart::default()
        .block(Block::default().padding(Padding::horizontal(1)))
        .bar_width(width)
        .bar_gap(0)
        .group_gap(GROUP_GAP)
        .max(100);

    for score in &result.category_scores {
        let bars: Vec<Bar> = category_series(score)
            .into_iter()
            .map(|(label, value, color)| {
                Bar::default()
                    .value(u64::from(value))
                    .label(Line::from(label))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color))
            })
            .collect();
        let group = BarGroup::default()
            .label(Line::from(score.category.as_str()).centered())
            .bars(&bars);
        widget = widget.data(group);
    }

    frame.render_widget(widget, chart);
}

fn render_details(frame: &mut Frame, area: Rect, result: &AssessmentResult, scroll: u16) {
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::Cyan).bold()))
    };

    let mut lines = vec![Line::from(result.summary.as_str()), Line::from("")];

    lines.push(heading("Categories"));
    for s in &result.category_scores {
        let delta = i16::from(s.score) - i16::from(s.previous);
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", s.category), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:>3}", s.score),
                Style::default().fg(grade_color(s.score)),
            ),
            Span::styled(
                format!("   average {:>3}   previous {:>3} ({delta:+})", s.average, s.previous),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(heading("Strengths"));
    lines.extend(result.strengths.iter().map(|s| bullet(s, Color::Green)));
    lines.push(Line::from(""));

    lines.push(heading("Room to improve"));
    lines.extend(result.weaknesses.iter().map(|s| bullet(s, Color::Yellow)));
    lines.push(Line::from(""));

    lines.push(heading("Recommendations"));
    for recommendation in &result.recommendations {
        lines.push(bullet(&recommendation.title, Color::White));
        lines.push(Line::from(Span::styled(
            format!("    {}", recommendation.description),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    lines.push(heading("Feedback"));
    lines.push(Line::from(result.detailed_feedback.as_str()));

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll, 0));
    frame.render_widget(widget, area);
}

fn bullet(text: &str, color: Color) -> Line<'_> {
    Line::from(vec![
        Span::styled("  • ", Style::default().fg(Color::DarkGray)),
        Span::styled(text, Style::default().fg(color)),
    ])
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  esc back to assessments")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
