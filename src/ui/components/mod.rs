pub mod answer_panel;
pub mod progress_bar;
pub mod stats_sidebar;
pub mod tile_grid;
