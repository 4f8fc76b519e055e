mod event;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use poem_scramble::app::Game;
use poem_scramble::config::Config;
use poem_scramble::engine::difficulty::Difficulty;
use poem_scramble::generator::PoemGenerator;
use poem_scramble::generator::fallback::FallbackTable;
use poem_scramble::generator::remote::{HttpGenerator, OfflineGenerator};
use poem_scramble::generator::source::PoemSource;
use poem_scramble::session::round::Phase;
use poem_scramble::store::RecordStore;
use poem_scramble::store::history::UsedAnswers;
use poem_scramble::store::json_store::{JsonStore, MemoryStore};
use poem_scramble::store::schema::GameRecords;

use event::{AppEvent, EventHandler};
use ui::components::answer_panel::AnswerPanel;
use ui::components::progress_bar::ProgressBar;
use ui::components::stats_sidebar::StatsSidebar;
use ui::components::tile_grid::{TileCursor, TileGrid};
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use ui::theme::{PALETTE, Palette};

const SECOND: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(
    name = "poem-scramble",
    version,
    about = "Rebuild a scrambled line of classical poetry before the clock runs out"
)]
struct Cli {
    #[arg(short, long, help = "Difficulty tier (easy, hard)")]
    difficulty: Option<Difficulty>,

    #[arg(long, help = "Never contact the generator; serve built-in poems only")]
    offline: bool,

    #[arg(long, help = "Seed for puzzle shuffling")]
    seed: Option<u64>,

    #[arg(long, help = "Forget which poems were already served")]
    reset_used: bool,

    #[arg(long, help = "Keep scores in memory only")]
    ephemeral: bool,

    #[arg(
        long,
        num_args = 2,
        value_names = ["NAME", "EMAIL"],
        help = "Sign in on this machine before playing"
    )]
    sign_in: Option<Vec<String>>,

    #[arg(long, conflicts_with = "sign_in", help = "Forget the signed-in player")]
    sign_out: bool,
}

/// Front-end state that the engine does not care about.
struct Ui {
    cursor: TileCursor,
    palette: &'static Palette,
    should_quit: bool,
    next_tick: Instant,
}

fn init_logging(data_dir: &str) -> Result<()> {
    let dir = PathBuf::from(data_dir);
    fs::create_dir_all(&dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("poem-scramble.log"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn build_source(config: &Config, offline: bool) -> PoemSource {
    let generator: Arc<dyn PoemGenerator> = match HttpGenerator::from_config(&config.generator) {
        Some(http) if !offline => {
            log::info!("generating poems via {}", http.url());
            Arc::new(http)
        }
        _ => {
            log::info!("no generator configured; serving built-in poems");
            Arc::new(OfflineGenerator)
        }
    };
    PoemSource::new(generator, FallbackTable::load(), config.generator.clone())
}

fn build_records(config: &Config, ephemeral: bool) -> Result<GameRecords> {
    let store: Box<dyn RecordStore> = if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        let store = JsonStore::with_base_dir(PathBuf::from(&config.data_dir))
            .with_context(|| format!("cannot create data directory {}", config.data_dir))?;
        Box::new(store)
    };
    Ok(GameRecords::new(store))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    init_logging(&config.data_dir)?;

    let records = build_records(&config, cli.ephemeral)?;
    if cli.reset_used {
        if let Err(e) = records.save_used_answers(&UsedAnswers::default()) {
            log::warn!("{e}");
        }
    }
    let source = build_source(&config, cli.offline);
    let rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let mut game = Game::new(&config, records, source, rng);
    if let Some([name, email]) = cli.sign_in.as_deref() {
        game.sign_in(name, email);
    } else if cli.sign_out {
        game.sign_out();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));
    let mut ui = Ui {
        cursor: TileCursor::default(),
        palette: &PALETTE,
        should_quit: false,
        next_tick: Instant::now() + SECOND,
    };

    let result = run_app(&mut terminal, &mut game, &mut ui, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    ui: &mut Ui,
    events: &EventHandler,
) -> Result<()> {
    loop {
        if game.poll() {
            ui.cursor = TileCursor::default();
            ui.next_tick = Instant::now() + SECOND;
        }

        // The countdown advances in whole seconds regardless of input rate.
        while Instant::now() >= ui.next_tick {
            game.tick();
            ui.next_tick += SECOND;
        }

        terminal.draw(|frame| render(frame, game, ui))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(game, ui, key),
            AppEvent::Idle | AppEvent::Resize => {}
        }

        if ui.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(game: &mut Game, ui: &mut Ui, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        ui.should_quit = true;
        return;
    }

    let snapshot = game.snapshot();
    let len = snapshot.tiles.len();

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => ui.should_quit = true,
        KeyCode::Left | KeyCode::Char('h') => ui.cursor.left(len),
        KeyCode::Right | KeyCode::Char('l') => ui.cursor.right(len),
        KeyCode::Up | KeyCode::Char('k') => ui.cursor.up(),
        KeyCode::Down | KeyCode::Char('j') => ui.cursor.down(len),
        KeyCode::Char(' ') => {
            game.toggle_tile(ui.cursor.index);
        }
        KeyCode::Backspace | KeyCode::Char('u') => {
            game.undo_last();
        }
        KeyCode::Enter => {
            if snapshot.locked {
                game.reset();
                ui.next_tick = Instant::now() + SECOND;
            } else if game.submit().is_some() {
                log::debug!("submitted {} glyphs", snapshot.selection.len());
            }
        }
        KeyCode::Char('d') => {
            game.change_difficulty(game.difficulty().toggled());
        }
        KeyCode::Char('c') => game.clear_used_answers(),
        _ => {}
    }
    ui.cursor.clamp(len);
}

fn render(frame: &mut ratatui::Frame, game: &Game, ui: &Ui) {
    let area = frame.area();
    let colors = ui.palette;
    let snapshot = game.snapshot();

    let bg = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg, area);

    let app_layout = AppLayout::new(area);

    let aggregate = game.aggregate();
    let header_info = if app_layout.tier.show_sidebar() {
        format!(" {} | Level {}", snapshot.difficulty, snapshot.level)
    } else {
        format!(
            " {} | Level {} | Score {} | Streak {}",
            snapshot.difficulty, snapshot.level, aggregate.score, aggregate.current_streak
        )
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " poem-scramble ",
            Style::default()
                .fg(colors.header_fg)
                .bg(colors.header_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            header_info,
            Style::default().fg(colors.dim).bg(colors.header_bg),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg));
    frame.render_widget(header, app_layout.header);

    let grid = TileGrid::new(&snapshot.tiles, colors)
        .cursor((snapshot.phase == Phase::Active).then_some(ui.cursor));
    let (grid_w, grid_h) = grid.required_size();

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(grid_h),
        ])
        .split(app_layout.main);

    let timer = ProgressBar::countdown(snapshot.seconds_remaining, snapshot.time_limit, colors);
    frame.render_widget(timer, main[0]);

    let points = game.last_round().map(|r| r.points);
    frame.render_widget(AnswerPanel::new(&snapshot, points, colors), main[1]);

    frame.render_widget(grid, centered_rect(grid_w, grid_h, main[2]));

    if let Some(sidebar_area) = app_layout.sidebar {
        let sidebar = StatsSidebar::new(
            aggregate,
            game.accuracy(),
            game.history().records(),
            colors,
        )
        .player(game.auth().display_name());
        frame.render_widget(sidebar, sidebar_area);
    }

    let hints: &[&str] = if snapshot.locked {
        &["[Enter] Continue", "[d] Difficulty", "[c] Forget used poems", "[q] Quit"]
    } else {
        &[
            "[\u{2190}\u{2191}\u{2193}\u{2192}/hjkl] Move",
            "[Space] Pick",
            "[Bksp] Undo",
            "[Enter] Submit",
            "[d] Difficulty",
            "[c] Forget used poems",
            "[q] Quit",
        ]
    };
    let footer_text = pack_hint_lines(hints, app_layout.footer.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(colors.dim),
    )));
    frame.render_widget(footer, app_layout.footer);
}
