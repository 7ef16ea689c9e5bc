use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
};

use crate::app::Dialog;
use crate::session::{Attempt, Phase};

const HELP: [(&str, &str); 9] = [
    ("tab / →", "next question"),
    ("shift-tab / ←", "previous question"),
    ("j/k or ↑/↓", "move between choices"),
    ("enter / space", "select or toggle"),
    ("1-9", "pick a rating"),
    ("typing", "edit a text answer"),
    ("F1 / ?", "this help"),
    ("esc", "leave and resume later"),
    ("ctrl-c", "save and quit"),
];

pub fn render(frame: &mut Frame, area: Rect, dialog: Dialog, attempt: &Attempt) {
    let (title, lines, height) = match dialog {
        Dialog::Help => {
            let lines: Vec<Line> = HELP
                .iter()
                .map(|(keys, action)| {
                    Line::from(vec![
                        Span::styled(format!("{keys:>14}  "), Style::default().fg(Color::Cyan)),
                        Span::styled(*action, Style::default().fg(Color::Gray)),
                    ])
                })
                .collect();
            (" Help ", lines, HELP.len() as u16 + 4)
        }
        Dialog::ConfirmExit => (
            " Leave assessment ",
            vec![
                Line::from("Your answers and time are saved."),
                Line::from("You can resume where you left off."),
                Line::from(""),
                confirm_hint(),
            ],
            8,
        ),
        Dialog::ConfirmSubmit => {
            let state = attempt.state();
            let answered = state.answers.answered_count();
            let total = state.question_order.len();
            let mut lines = vec![
                Line::from("Submit your answers?"),
                Line::from(
                    format!("{answered} of {total} questions answered.").fg(Color::DarkGray),
                ),
                Line::from(""),
            ];
            if attempt.phase() == Phase::Submitting {
                lines.push(Line::from("Sending...".fg(Color::Cyan).bold()));
            } else {
                lines.push(confirm_hint());
            }
            (" Submit ", lines, 8)
        }
    };

    let popup = super::centered(area, 50, height);
    let widget = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::Cyan)
            .title(title)
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(widget, popup);
}

fn confirm_hint() -> Line<'static> {
    Line::from(vec![
        Span::styled("y", Style::default().fg(Color::Green).bold()),
        Span::styled(" confirm  ·  ", Style::default().fg(Color::DarkGray)),
        Span::styled("n", Style::default().fg(Color::Red).bold()),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
    ])
}
