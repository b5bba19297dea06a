pub mod words;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::{
    app::App,
    session::{Session, SessionState, TestDuration, WordMark},
    ui::words::{first_visible_line, wrap_words},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title + timer / duration picker
                Constraint::Min(3),    // words
                Constraint::Length(3), // input
                Constraint::Length(1), // stats
                Constraint::Length(1), // status
                Constraint::Length(1), // key hints
            ])
            .split(area);

        render_header(session, chunks[0], buf);
        render_words(session, chunks[1], buf);
        render_input(session, chunks[2], buf);
        render_stats(session, chunks[3], buf);
        render_status(session, chunks[4], buf);
        render_hints(session, chunks[5], buf);
    }
}

fn render_header(session: &Session, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let mut spans = vec![Span::styled("TypeSprint", bold_style), Span::raw("   ")];

    if session.is_running() {
        spans.push(Span::styled(
            format!("Time left: {}s", session.remaining_secs()),
            bold_style.fg(Color::Cyan),
        ));
    } else {
        spans.push(Span::raw("Timer: "));
        for option in TestDuration::ALL {
            let style = if option == session.duration() {
                bold_style.add_modifier(Modifier::REVERSED)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            spans.push(Span::styled(format!(" {option} "), style));
            spans.push(Span::raw(" "));
        }
    }

    Paragraph::new(Line::from(spans)).render(area, buf);
}

fn word_style(session: &Session, index: usize, word: &str) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    match session.word_mark(index) {
        WordMark::Correct => bold_style.fg(Color::Green),
        WordMark::Incorrect => bold_style.fg(Color::Red),
        WordMark::Unmarked => Style::default(),
        WordMark::Current => {
            let on_track = word.starts_with(session.input());
            bold_style
                .add_modifier(Modifier::UNDERLINED)
                .fg(if on_track { Color::Yellow } else { Color::Red })
        }
        WordMark::Pending => Style::default().add_modifier(Modifier::DIM),
    }
}

fn render_words(session: &Session, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title("Words");
    let inner = block.inner(area);
    block.render(area, buf);

    let words = session.words();
    if words.is_empty() {
        let (message, style) = if let Some(err) = session.last_fetch_error() {
            (
                format!("Could not load words: {err}"),
                Style::default().fg(Color::Red),
            )
        } else if session.is_fetching() {
            (
                "Fetching words...".to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            )
        } else {
            (
                format!("Press Enter to start a {} test", session.duration()),
                Style::default().add_modifier(Modifier::ITALIC),
            )
        };

        Paragraph::new(Span::styled(message, style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
        return;
    }

    let lines = wrap_words(words, inner.width as usize);
    let height = inner.height as usize;
    let first = first_visible_line(&lines, session.completed_words(), height);

    let text: Vec<Line> = lines
        .iter()
        .skip(first)
        .take(height)
        .map(|range| {
            let spans = range
                .clone()
                .flat_map(|i| {
                    [
                        Span::styled(words[i].as_str(), word_style(session, i, &words[i])),
                        Span::raw(" "),
                    ]
                })
                .collect::<Vec<Span>>();
            Line::from(spans)
        })
        .collect();

    Paragraph::new(text).render(inner, buf);
}

fn render_input(session: &Session, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title("Input");

    let line = if session.input().is_empty() && !session.is_running() {
        Line::from(Span::styled(
            "Start typing...",
            Style::default().add_modifier(Modifier::DIM),
        ))
    } else {
        let mut spans = vec![Span::raw(session.input())];
        if session.is_running() {
            spans.push(Span::styled(
                " ",
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        }
        Line::from(spans)
    };

    Paragraph::new(line).block(block).render(area, buf);
}

fn render_stats(session: &Session, area: Rect, buf: &mut Buffer) {
    if session.state() == SessionState::Idle {
        return;
    }

    let stats = format!(
        "WPM: {:.1}   Accuracy: {}%   Words: {} ({} correct)",
        session.wpm(),
        session.accuracy(),
        session.completed_words(),
        session.correct_words()
    );

    Paragraph::new(Span::styled(
        stats,
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .render(area, buf);
}

fn render_status(session: &Session, area: Rect, buf: &mut Buffer) {
    let span = if session.state() == SessionState::Finished {
        Span::styled(
            "Timer Up! Choose a timer and press Enter to start again",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if let (Some(err), false) = (session.last_fetch_error(), session.words().is_empty()) {
        Span::styled(
            format!("Word source unavailable, reusing previous words ({err})"),
            Style::default().fg(Color::Yellow),
        )
    } else {
        return;
    };

    Paragraph::new(span).render(area, buf);
}

fn render_hints(session: &Session, area: Rect, buf: &mut Buffer) {
    let hints: &[(&str, &str)] = if session.is_running() {
        &[("space", "submit word"), ("tab", "restart"), ("esc", "quit")]
    } else {
        &[
            ("enter", "start"),
            ("1/2/3 ←/→", "timer"),
            ("esc", "quit"),
        ]
    };

    let text = hints
        .iter()
        .map(|(key, action)| format!("({key}) {action}"))
        .join(" | ");

    Paragraph::new(Span::styled(
        text,
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}
