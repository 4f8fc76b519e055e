use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use poem_scramble::engine::pool::ROW_WIDTH;
use poem_scramble::session::round::TileView;

use crate::ui::theme::Palette;

/// Columns per tile: padding, a double-width glyph, padding, gap.
const CELL_WIDTH: u16 = 5;
const CELL_HEIGHT: u16 = 2;

/// Keyboard focus within the tile grid, in pool order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileCursor {
    pub index: usize,
}

impl TileCursor {
    pub fn left(&mut self, len: usize) {
        if len > 0 && self.index % ROW_WIDTH > 0 {
            self.index -= 1;
        }
    }

    pub fn right(&mut self, len: usize) {
        if self.index % ROW_WIDTH + 1 < ROW_WIDTH && self.index + 1 < len {
            self.index += 1;
        }
    }

    pub fn up(&mut self) {
        if self.index >= ROW_WIDTH {
            self.index -= ROW_WIDTH;
        }
    }

    pub fn down(&mut self, len: usize) {
        if self.index + ROW_WIDTH < len {
            self.index += ROW_WIDTH;
        }
    }

    /// Keep the cursor on a real tile after the grid changed size.
    pub fn clamp(&mut self, len: usize) {
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }
}

pub struct TileGrid<'a> {
    tiles: &'a [TileView],
    cursor: Option<TileCursor>,
    palette: &'a Palette,
}

impl<'a> TileGrid<'a> {
    pub fn new(tiles: &'a [TileView], palette: &'a Palette) -> Self {
        Self {
            tiles,
            cursor: None,
            palette,
        }
    }

    pub fn cursor(mut self, cursor: Option<TileCursor>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn required_size(&self) -> (u16, u16) {
        let rows = self.tiles.len().div_ceil(ROW_WIDTH) as u16;
        (ROW_WIDTH as u16 * CELL_WIDTH + 2, rows * CELL_HEIGHT + 1)
    }
}

impl Widget for TileGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = self.palette;

        let block = Block::bordered()
            .title(" Tiles ")
            .border_style(Style::default().fg(colors.border));
        let inner = block.inner(area);
        block.render(area, buf);

        for tile in self.tiles {
            let row = (tile.pool_index / ROW_WIDTH) as u16;
            let col = (tile.pool_index % ROW_WIDTH) as u16;
            let x = inner.x + 1 + col * CELL_WIDTH;
            let y = inner.y + row * CELL_HEIGHT;
            if x + CELL_WIDTH - 1 > inner.right() || y >= inner.bottom() {
                continue;
            }

            let focused = self.cursor.is_some_and(|c| c.index == tile.pool_index);
            let style = if focused {
                Style::default()
                    .fg(colors.cursor_fg)
                    .bg(colors.cursor_bg)
                    .add_modifier(Modifier::BOLD)
            } else if tile.selected {
                Style::default()
                    .fg(colors.dim)
                    .bg(colors.tile_selected_bg)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(colors.fg).bg(colors.bg)
            };
            buf.set_string(x, y, format!(" {} ", tile.glyph), style);
        }
    }
}
