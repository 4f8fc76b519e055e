use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use poem_scramble::session::round::{LockReason, Outcome, Phase, RoundSnapshot};

use crate::ui::theme::Palette;

const EMPTY_SLOT: char = '\u{ff3f}'; // ＿

/// Hint, answer slots and the verdict line.
pub struct AnswerPanel<'a> {
    snapshot: &'a RoundSnapshot,
    points: Option<u64>,
    palette: &'a Palette,
}

impl<'a> AnswerPanel<'a> {
    pub fn new(snapshot: &'a RoundSnapshot, points: Option<u64>, palette: &'a Palette) -> Self {
        Self {
            snapshot,
            points,
            palette,
        }
    }
}

/// One slot per answer glyph, filled in selection order.
pub fn slot_text(selection: &[char], answer_len: usize) -> String {
    let mut out = String::new();
    for i in 0..answer_len.max(selection.len()) {
        if i > 0 {
            out.push(' ');
        }
        out.push(selection.get(i).copied().unwrap_or(EMPTY_SLOT));
    }
    out
}

/// Verdict shown under the slots, or `None` while the round is running.
pub fn verdict(snapshot: &RoundSnapshot, points: Option<u64>) -> Option<String> {
    let reason = match snapshot.phase {
        Phase::Locked(reason) | Phase::Resolved(reason) => reason,
        Phase::Loading | Phase::Active => return None,
    };
    let text = match (snapshot.outcome, reason) {
        (Some(Outcome::Correct), _) => format!("Correct! +{} points", points.unwrap_or(0)),
        (_, LockReason::TimedOut) => "Time's up.".to_string(),
        (_, LockReason::Submitted) => match &snapshot.revealed_answer {
            Some(answer) => format!("Out of retries. The line was {answer}"),
            None => format!("Not quite. {} retries left", snapshot.retries_left),
        },
    };
    Some(text)
}

impl Widget for AnswerPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = self.palette;
        let snap = self.snapshot;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(4)])
            .split(area);

        let hint_block = Block::bordered()
            .title(" Hint ")
            .border_style(Style::default().fg(colors.border));
        let hint = if snap.phase == Phase::Loading {
            Paragraph::new(Span::styled(
                "Composing a poem...",
                Style::default().fg(colors.dim).add_modifier(Modifier::ITALIC),
            ))
        } else {
            Paragraph::new(snap.hint.as_str()).style(Style::default().fg(colors.accent))
        };
        hint.block(hint_block)
            .wrap(Wrap { trim: false })
            .render(sections[0], buf);

        let mut lines = vec![Line::from(Span::styled(
            slot_text(&snap.selection, snap.answer_len),
            Style::default().fg(colors.fg).add_modifier(Modifier::BOLD),
        ))];
        if let Some(text) = verdict(snap, self.points) {
            let color = if snap.outcome == Some(Outcome::Correct) {
                colors.success
            } else {
                colors.error
            };
            lines.push(Line::from(Span::styled(text, Style::default().fg(color))));
        }

        let answer_block = Block::bordered()
            .title(format!(" Level {} ", snap.level))
            .border_style(Style::default().fg(colors.border));
        Paragraph::new(lines)
            .block(answer_block)
            .render(sections[1], buf);
    }
}
