use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Palette;

/// Below this share of time left the bar changes color.
const LOW_RATIO: f64 = 0.25;

pub struct ProgressBar<'a> {
    pub label: String,
    pub ratio: f64,
    pub text: String,
    pub palette: &'a Palette,
}

impl<'a> ProgressBar<'a> {
    /// Countdown bar: full at the start of the round.
    pub fn countdown(seconds_remaining: u32, time_limit: u32, palette: &'a Palette) -> Self {
        let ratio = if time_limit == 0 {
            0.0
        } else {
            seconds_remaining as f64 / time_limit as f64
        };
        Self {
            label: "Time".to_string(),
            ratio: ratio.clamp(0.0, 1.0),
            text: format_clock(seconds_remaining),
            palette,
        }
    }
}

/// `m:ss` display of a second count.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = self.palette;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64) as u16;
        let fill = if self.ratio < LOW_RATIO {
            colors.bar_low
        } else {
            colors.bar_filled
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg).bg(fill)
            } else {
                Style::default().fg(colors.fg).bg(colors.bar_empty)
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(self.text.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &self.text, Style::default().fg(colors.fg));
    }
}
