use ratatui::style::Color;

/// Fixed colors for every widget.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub tile_selected_bg: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,
    pub bar_filled: Color,
    pub bar_low: Color,
    pub bar_empty: Color,
    pub success: Color,
    pub error: Color,
}

pub const PALETTE: Palette = Palette {
    bg: Color::Rgb(0x1e, 0x1e, 0x2e),
    fg: Color::Rgb(0xcd, 0xd6, 0xf4),
    dim: Color::Rgb(0x6c, 0x70, 0x86),
    accent: Color::Rgb(0xf9, 0xe2, 0xaf),
    border: Color::Rgb(0x45, 0x47, 0x5a),
    header_bg: Color::Rgb(0x31, 0x32, 0x44),
    header_fg: Color::Rgb(0xf5, 0xe0, 0xdc),
    tile_selected_bg: Color::Rgb(0x58, 0x5b, 0x70),
    cursor_bg: Color::Rgb(0x89, 0xb4, 0xfa),
    cursor_fg: Color::Rgb(0x11, 0x11, 0x1b),
    bar_filled: Color::Rgb(0xa6, 0xe3, 0xa1),
    bar_low: Color::Rgb(0xfa, 0xb3, 0x87),
    bar_empty: Color::Rgb(0x31, 0x32, 0x44),
    success: Color::Rgb(0xa6, 0xe3, 0xa1),
    error: Color::Rgb(0xf3, 0x8b, 0xa8),
};
