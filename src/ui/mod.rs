mod dialogs;
mod listing;
mod results;
mod surveys;
mod taking;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::{App, Notice, NoticeLevel, Screen};
use crate::models::AssessmentId;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let [body, status] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

    match app.screen() {
        Screen::Listing(view) => listing::render(frame, body, view),
        Screen::Loading(id) => render_loading(frame, body, *id),
        Screen::Taking(view) => taking::render(frame, body, view),
        Screen::Results(view) => results::render(frame, body, view),
        Screen::SurveyResults(view) => surveys::render(frame, body, view),
    }

    render_status(frame, status, app.notice(), &app.route().path());
}

fn render_loading(frame: &mut Frame, area: Rect, id: AssessmentId) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Fill(1),
    ])
    .areas(area);

    let content = vec![
        Line::from(Span::styled(
            "Loading assessment...",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(format!("#{id}").fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), middle);
}

fn render_status(frame: &mut Frame, area: Rect, notice: Option<&Notice>, path: &str) {
    let [left, right] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(path.len() as u16 + 1)])
            .areas(area);

    if let Some(notice) = notice {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled(format!(" {} ", notice.title), Style::default().fg(color).bold()),
            Span::styled(notice.detail.as_str(), Style::default().fg(Color::Gray)),
        ]);
        frame.render_widget(Paragraph::new(line), left);
    }

    let widget = Paragraph::new(path)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, right);
}

/// A `width` x `height` rectangle in the middle of `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .areas(middle);
    center
}

/// Formats whole seconds as `mm:ss`; minutes keep counting past an hour.
fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(64), "01:04");
        assert_eq!(format_elapsed(3_725), "62:05");
    }

    #[test]
    fn test_centered_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let popup = centered(area, 40, 10);
        assert_eq!(popup, Rect::new(20, 7, 40, 10));

        let clamped = centered(Rect::new(0, 0, 20, 5), 40, 10);
        assert_eq!((clamped.width, clamped.height), (20, 5));
    }
}
