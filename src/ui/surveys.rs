use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Padding, Paragraph, Tabs, Wrap},
};

use crate::app::{SurveyResultsView, SurveyTab};
use crate::models::{QuestionKind, QuestionResult, SurveyReport};

const PALETTE: [Color; 6] = [
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::LightRed,
    Color::Magenta,
    Color::Red,
];

const METER_WIDTH: usize = 30;

pub fn render(frame: &mut Frame, area: Rect, view: &SurveyResultsView) {
    let Some(report) = &view.report else {
        let widget = Paragraph::new("Loading survey results...")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray);
        frame.render_widget(widget, area);
        return;
    };

    let [header, tabs, body, controls] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .areas(area);

    render_header(frame, header, report);
    render_tabs(frame, tabs, view.tab);
    match view.tab {
        SurveyTab::Summary => render_summary(frame, body, report, view.scroll),
        SurveyTab::Details => render_details(frame, body, report, view.scroll),
        SurveyTab::Insights => render_insights(frame, body, report, view.scroll),
        SurveyTab::Comparison => render_comparison(frame, body, report),
    }
    render_controls(frame, controls);
}

fn render_header(frame: &mut Frame, area: Rect, report: &SurveyReport) {
    let submitted = report
        .submitted_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M");
    let content = vec![
        Line::from(Span::styled(
            format!("{} - Results", report.title),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(format!("Submitted {submitted}").fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, selected: SurveyTab) {
    let widget = Tabs::new(SurveyTab::ALL.iter().map(|tab| tab.title()))
        .select(selected.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Color::DarkGray),
        );
    frame.render_widget(widget, area);
}

/// Arrow and magnitude of a change, green when it did not drop.
fn trend(change: f64, decimals: usize) -> Span<'static> {
    let (arrow, color) = if change >= 0.0 {
        ("↑", Color::Green)
    } else {
        ("↓", Color::Red)
    };
    Span::styled(
        format!("{arrow} {:.decimals$} vs previous", change.abs()),
        Style::default().fg(color),
    )
}

fn score_card(frame: &mut Frame, area: Rect, title: &str, value: String, note: Span<'static>) {
    let content = vec![
        Line::from(Span::styled(value, Style::default().fg(Color::White).bold())),
        Line::from(note),
    ];
    let widget = Paragraph::new(content).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_summary(frame: &mut Frame, area: Rect, report: &SurveyReport, scroll: u16) {
    let [cards, charts, notes] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(9),
        Constraint::Fill(1),
    ])
    .areas(area);

    let columns: [Rect; 4] = Layout::horizontal([Constraint::Fill(1); 4]).areas(cards);
    let summary = &report.summary;
    score_card(
        frame,
        columns[0],
        "Satisfaction",
        format!("{:.1} / 5.0", summary.overall_satisfaction),
        trend(report.satisfaction_change(), 1),
    );
    score_card(
        frame,
        columns[1],
        "Recommendation",
        format!("{:.1} / 10.0", summary.recommendation_score),
        "likelihood to recommend".fg(Color::DarkGray),
    );
    score_card(
        frame,
        columns[2],
        "Engagement",
        format!("{} / 100", summary.engagement_score),
        trend(f64::from(report.engagement_change()), 0),
    );
    score_card(
        frame,
        columns[3],
        "Completion time",
        summary.completion_time.clone(),
        "average time to answer".fg(Color::DarkGray),
    );

    let [left, right] = Layout::horizontal([Constraint::Fill(1); 2]).areas(charts);
    let highlighted = |kind| report.question_results.iter().find(|r| r.kind == kind);
    if let Some(result) = highlighted(QuestionKind::Rating) {
        frame.render_widget(distribution_chart(result, "Satisfaction"), left);
    }
    if let Some(result) = highlighted(QuestionKind::Multiple) {
        frame.render_widget(distribution_chart(result, "Valued aspects"), right);
    }

    render_insights(frame, notes, report, scroll);
}

/// Horizontal bars for one question, one colour per answer.
fn distribution_chart<'a>(result: &'a QuestionResult, title: &'a str) -> BarChart<'a> {
    let bars: Vec<Bar> = result
        .distribution
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let color = PALETTE[i % PALETTE.len()];
            Bar::default()
                .value(u64::from(entry.value))
                .label(Line::from(entry.name.as_str()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    BarChart::default()
        .block(Block::default().title(title).padding(Padding::horizontal(1)))
        .direction(Direction::Horizontal)
        .data(BarGroup::default().bars(&bars))
        .bar_width(1)
        .bar_gap(0)
}

fn kind_label(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::Rating => "Rating question",
        QuestionKind::Single => "Single choice question",
        QuestionKind::Multiple => "Multiple choice question",
        QuestionKind::Boolean => "Yes/no question",
        QuestionKind::Text => "Question",
    }
}

/// A text bar `width` cells long at full scale.
fn meter(value: u32, max: u32, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let cells = (f64::from(value) / f64::from(max) * width as f64).round() as usize;
    "█".repeat(cells.min(width))
}

fn render_details(frame: &mut Frame, area: Rect, report: &SurveyReport, scroll: u16) {
    let mut lines = Vec::new();

    for (i, result) in report.question_results.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("Q{}: {}", i + 1, result.question),
            Style::default().fg(Color::Cyan).bold(),
        )));
        lines.push(Line::from(kind_label(result.kind).fg(Color::DarkGray)));

        let max = result.distribution.iter().map(|e| e.value).max().unwrap_or(0);
        let shares = matches!(result.kind, QuestionKind::Single | QuestionKind::Boolean);
        for (j, entry) in result.distribution.iter().enumerate() {
            let amount = if shares {
                format!("{}%", result.percent(entry))
            } else {
                entry.value.to_string()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<24}", entry.name), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{:<width$}", meter(entry.value, max, METER_WIDTH), width = METER_WIDTH),
                    Style::default().fg(PALETTE[j % PALETTE.len()]),
                ),
                Span::raw(format!(" {amount}")),
            ]));
        }

        if let Some(average) = result.average_rating {
            lines.push(Line::from(format!("  Average rating: {average:.1} / 5").bold()));
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll, 0));
    frame.render_widget(widget, area);
}

fn render_insights(frame: &mut Frame, area: Rect, report: &SurveyReport, scroll: u16) {
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::Cyan).bold()))
    };

    let mut lines = vec![heading("Key insights")];
    for insight in &report.insights {
        lines.push(Line::from(vec![
            Span::styled("  ✓ ", Style::default().fg(Color::Green)),
            Span::raw(insight.as_str()),
        ]));
    }
    lines.push(Line::from(""));

    lines.push(heading("Recommended actions"));
    for recommendation in &report.recommendations {
        lines.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(Color::DarkGray)),
            Span::styled(recommendation.as_str(), Style::default().fg(Color::White)),
        ]));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((scroll, 0));
    frame.render_widget(widget, area);
}

/// Two bars, baseline then this round, on a fixed scale.
fn comparison_chart<'a>(
    title: &'a str,
    baseline: (&'a str, f64),
    current: f64,
    scale: u64,
    color: Color,
) -> BarChart<'a> {
    let decimals = if scale <= 10 { 1 } else { 0 };
    // satisfaction is out of 5, so bars carry tenths
    let factor = if scale <= 10 { 10.0 } else { 1.0 };
    let bar = |label: &'a str, value: f64, color: Color| {
        Bar::default()
            .value((value * factor).round() as u64)
            .text_value(format!("{value:.decimals$}"))
            .label(Line::from(label))
            .style(Style::default().fg(color))
            .value_style(Style::default().fg(Color::Black).bg(color))
    };

    let bars = [
        bar(baseline.0, baseline.1, Color::Gray),
        bar("this round", current, color),
    ];
    BarChart::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(3)
        .max((scale as f64 * factor) as u64)
}

fn render_comparison(frame: &mut Frame, area: Rect, report: &SurveyReport) {
    let [top, bottom] = Layout::vertical([Constraint::Fill(1); 2]).areas(area);
    let [previous_satisfaction, previous_engagement] =
        Layout::horizontal([Constraint::Fill(1); 2]).areas(top);
    let [industry_satisfaction, industry_engagement] =
        Layout::horizontal([Constraint::Fill(1); 2]).areas(bottom);

    let summary = &report.summary;
    let previous = report.comparisons.previous_period;
    let industry = report.comparisons.industry_average;

    frame.render_widget(
        comparison_chart(
            "Satisfaction vs previous survey",
            ("previous", previous.overall_satisfaction),
            summary.overall_satisfaction,
            5,
            Color::Blue,
        ),
        previous_satisfaction,
    );
    frame.render_widget(
        comparison_chart(
            "Engagement vs previous survey",
            ("previous", f64::from(previous.engagement_score)),
            f64::from(summary.engagement_score),
            100,
            Color::Green,
        ),
        previous_engagement,
    );
    frame.render_widget(
        comparison_chart(
            "Satisfaction vs industry average",
            ("industry", industry.overall_satisfaction),
            summary.overall_satisfaction,
            5,
            Color::Yellow,
        ),
        industry_satisfaction,
    );
    frame.render_widget(
        comparison_chart(
            "Engagement vs industry average",
            ("industry", f64::from(industry.engagement_score)),
            f64::from(summary.engagement_score),
            100,
            Color::LightRed,
        ),
        industry_engagement,
    );
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("tab/←/→ switch view  ·  j/k scroll  ·  esc back to assessments")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_arrow_and_colour() {
        let up = trend(0.3, 1);
        assert_eq!(up.content, "↑ 0.3 vs previous");
        assert_eq!(up.style.fg, Some(Color::Green));

        let down = trend(-4.0, 0);
        assert_eq!(down.content, "↓ 4 vs previous");
        assert_eq!(down.style.fg, Some(Color::Red));

        assert_eq!(trend(0.0, 0).style.fg, Some(Color::Green));
    }

    #[test]
    fn test_meter_scales_to_largest_value() {
        assert_eq!(meter(90, 90, 10).chars().count(), 10);
        assert_eq!(meter(45, 90, 10).chars().count(), 5);
        assert_eq!(meter(0, 90, 10), "");
        assert_eq!(meter(3, 0, 10), "");
    }

    #[test]
    fn test_every_kind_has_a_label() {
        assert_eq!(kind_label(QuestionKind::Boolean), "Yes/no question");
        assert_eq!(kind_label(QuestionKind::Rating), "Rating question");
    }
}
