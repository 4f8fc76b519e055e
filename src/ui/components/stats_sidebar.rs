use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use poem_scramble::engine::scoring::GameAggregate;
use poem_scramble::session::result::RoundRecord;

use crate::ui::components::progress_bar::format_clock;
use crate::ui::theme::Palette;

/// Rows of history shown under the totals.
const RECENT_ROUNDS: usize = 8;

pub struct StatsSidebar<'a> {
    aggregate: &'a GameAggregate,
    accuracy: f64,
    history: &'a [RoundRecord],
    player: Option<&'a str>,
    palette: &'a Palette,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        aggregate: &'a GameAggregate,
        accuracy: f64,
        history: &'a [RoundRecord],
        palette: &'a Palette,
    ) -> Self {
        Self {
            aggregate,
            accuracy,
            history,
            player: None,
            palette,
        }
    }

    pub fn player(mut self, name: Option<&'a str>) -> Self {
        self.player = name;
        self
    }
}

fn stat_line<'a>(label: &'a str, value: String, palette: &Palette, color: ratatui::style::Color) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(palette.fg)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = self.palette;
        let agg = self.aggregate;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(11), Constraint::Min(3)])
            .split(area);

        let accuracy_color = if self.accuracy >= 80.0 {
            colors.success
        } else if self.accuracy >= 50.0 {
            colors.accent
        } else {
            colors.error
        };

        let mut lines = vec![
            stat_line("Score:      ", agg.score.to_string(), colors, colors.accent),
            stat_line("High score: ", agg.high_score.to_string(), colors, colors.accent),
            Line::from(""),
            stat_line("Streak:     ", agg.current_streak.to_string(), colors, colors.success),
            stat_line("Best:       ", agg.best_streak.to_string(), colors, colors.success),
            Line::from(""),
            stat_line("Played:     ", agg.games_played.to_string(), colors, colors.fg),
            stat_line("Accuracy:   ", format!("{:.1}%", self.accuracy), colors, accuracy_color),
        ];
        if let Some(name) = self.player {
            lines.push(stat_line("Player:     ", name.to_string(), colors, colors.dim));
        }

        let block = Block::bordered()
            .title(" Totals ")
            .border_style(Style::default().fg(colors.border));
        Paragraph::new(lines).block(block).render(sections[0], buf);

        let recent: Vec<Line> = if self.history.is_empty() {
            vec![Line::from(Span::styled(
                "No rounds yet",
                Style::default().fg(colors.dim),
            ))]
        } else {
            self.history
                .iter()
                .take(RECENT_ROUNDS)
                .map(|record| {
                    let (mark, color) = if record.is_correct {
                        ("\u{2713}", colors.success)
                    } else {
                        ("\u{2717}", colors.error)
                    };
                    Line::from(vec![
                        Span::styled(format!("{mark} "), Style::default().fg(color)),
                        Span::styled(record.answer_text.clone(), Style::default().fg(colors.fg)),
                        Span::styled(
                            format!(" {} {}", format_clock(record.time_spent), record.difficulty),
                            Style::default().fg(colors.dim),
                        ),
                    ])
                })
                .collect()
        };

        let block = Block::bordered()
            .title(" Recent ")
            .border_style(Style::default().fg(colors.border));
        Paragraph::new(recent).block(block).render(sections[1], buf);
    }
}
