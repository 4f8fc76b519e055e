use std::time::Duration;

use rand::Rng;
use rand::rngs::SmallRng;

use crate::auth::AuthState;
use crate::config::Config;
use crate::engine::difficulty::Difficulty;
use crate::engine::scoring::{self, GameAggregate, StreakRule};
use crate::generator::source::PoemSource;
use crate::session::loader::{Loaded, Loader};
use crate::session::result::{Resolution, RoundRecord};
use crate::session::round::{Advance, Outcome, RoundController, RoundSnapshot};
use crate::store::history::{RoundHistory, UsedAnswers};
use crate::store::schema::GameRecords;

/// Result of the most recent resolved round, for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastRound {
    pub resolution: Resolution,
    pub points: u64,
}

/// Owns one player's game: the live round, the ledger and everything that
/// gets persisted. All mutation goes through its methods.
pub struct Game {
    records: GameRecords,
    aggregate: GameAggregate,
    history: RoundHistory,
    used: UsedAnswers,
    auth: AuthState,
    round: RoundController,
    loader: Loader,
    streak_rule: StreakRule,
    last_round: Option<LastRound>,
    rng: SmallRng,
}

impl Game {
    /// Load persisted state and start acquiring the first puzzle.
    pub fn new(config: &Config, records: GameRecords, source: PoemSource, rng: SmallRng) -> Self {
        let aggregate = records.load_aggregate();
        let history = records.load_history();
        let used = records.load_used_answers();
        let auth = records.load_auth();
        log::info!(
            "loaded {} past rounds, {} used answers, score {}",
            history.len(),
            used.len(),
            aggregate.score
        );

        let mut game = Self {
            records,
            aggregate,
            history,
            used,
            auth,
            round: RoundController::new(config.difficulty),
            loader: Loader::new(source),
            streak_rule: config.streak_rule(),
            last_round: None,
            rng,
        };
        game.start_acquisition(config.difficulty);
        game
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.round.snapshot()
    }

    pub fn aggregate(&self) -> &GameAggregate {
        &self.aggregate
    }

    pub fn accuracy(&self) -> f64 {
        scoring::accuracy(&self.aggregate)
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn used_answers(&self) -> &UsedAnswers {
        &self.used
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn last_round(&self) -> Option<&LastRound> {
        self.last_round.as_ref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.round.difficulty()
    }

    fn start_acquisition(&mut self, difficulty: Difficulty) {
        let epoch = self.round.begin_loading(difficulty);
        let seed = self.rng.r#gen::<u64>();
        log::debug!("acquiring {difficulty} puzzle (epoch {epoch})");
        self.loader.spawn(epoch, difficulty, self.used.clone(), seed);
    }

    /// Apply finished acquisitions. Returns true when a new puzzle went live.
    pub fn poll(&mut self) -> bool {
        let mut installed = false;
        while let Some(loaded) = self.loader.try_recv() {
            installed |= self.install(loaded);
        }
        installed
    }

    /// Block until the pending puzzle arrives or `timeout` passes.
    pub fn wait_for_puzzle(&mut self, timeout: Duration) -> bool {
        if self.poll() {
            return true;
        }
        while let Some(loaded) = self.loader.recv_timeout(timeout) {
            if self.install(loaded) {
                return true;
            }
        }
        false
    }

    fn install(&mut self, loaded: Loaded) -> bool {
        let epoch = loaded.epoch;
        if !self.round.complete_loading(epoch, loaded.puzzle) {
            log::debug!("discarding superseded acquisition (epoch {epoch})");
            return false;
        }
        log::info!(
            "puzzle ready ({:?}, {} glyphs)",
            loaded.draw.origin,
            loaded.draw.answer.chars().count()
        );
        // Apply the draw to the live set; it may have been cleared since the
        // worker took its copy.
        if loaded.cleared {
            self.used.clear();
        }
        self.used.insert(&loaded.draw.answer);
        if let Err(e) = self.records.save_used_answers(&self.used) {
            log::warn!("{e}; continuing in memory");
        }
        true
    }

    /// One second of countdown.
    pub fn tick(&mut self) {
        if self.round.tick().is_some() {
            self.resolve();
        }
    }

    pub fn toggle_tile(&mut self, pool_index: usize) -> bool {
        self.round.toggle_tile(pool_index)
    }

    pub fn undo_last(&mut self) -> bool {
        self.round.undo_last()
    }

    pub fn submit(&mut self) -> Option<Outcome> {
        let outcome = self.round.submit()?;
        self.resolve();
        Some(outcome)
    }

    /// Continue after a finished round: next puzzle when solved, otherwise
    /// the same puzzle again.
    pub fn reset(&mut self) -> Advance {
        let advance = self.round.advance();
        if advance == Advance::NextPuzzle {
            let difficulty = self.round.difficulty();
            self.start_acquisition(difficulty);
        }
        advance
    }

    /// Switch tier and fetch a fresh puzzle. Used answers are kept.
    pub fn change_difficulty(&mut self, difficulty: Difficulty) {
        self.start_acquisition(difficulty);
    }

    pub fn clear_used_answers(&mut self) {
        self.used.clear();
        if let Err(e) = self.records.save_used_answers(&self.used) {
            log::warn!("{e}; continuing in memory");
        }
    }

    pub fn sign_in(&mut self, name: &str, email: &str) {
        self.auth = AuthState::sign_in(name, email);
        if let Err(e) = self.records.save_auth(&self.auth) {
            log::warn!("{e}; sign-in kept for this session only");
        }
    }

    pub fn sign_out(&mut self) {
        self.auth = AuthState::default();
        if let Err(e) = self.records.clear_auth() {
            log::warn!("{e}");
        }
    }

    fn resolve(&mut self) {
        let Some(resolution) = self.round.take_resolution() else {
            return;
        };
        let points = if resolution.is_correct {
            scoring::compute_score(
                resolution.seconds_remaining,
                resolution.difficulty,
                self.aggregate.current_streak,
            )
        } else {
            0
        };
        self.aggregate =
            scoring::apply_outcome(&self.aggregate, resolution.is_correct, points, self.streak_rule);
        self.history.append(RoundRecord::from_resolution(&resolution));
        log::info!(
            "round resolved: correct={} points={} streak={}",
            resolution.is_correct,
            points,
            self.aggregate.current_streak
        );
        self.last_round = Some(LastRound { resolution, points });
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.records.save_aggregate(&self.aggregate) {
            log::warn!("{e}; continuing in memory");
        }
        if let Err(e) = self.records.save_history(&self.history) {
            log::warn!("{e}; continuing in memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;

    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::fallback::{FallbackPoem, FallbackTable};
    use crate::generator::remote::OfflineGenerator;
    use crate::session::round::Phase;
    use crate::store::json_store::{JsonStore, MemoryStore};
    use crate::store::{PersistenceError, RecordStore};

    const WAIT: Duration = Duration::from_secs(5);

    fn table_source(entries: &[&str]) -> PoemSource {
        let table = FallbackTable::new(
            entries
                .iter()
                .map(|a| FallbackPoem {
                    answer: a.to_string(),
                    hint: format!("hint for {a}"),
                })
                .collect(),
        );
        PoemSource::new(
            Arc::new(OfflineGenerator),
            table,
            GeneratorConfig::default(),
        )
    }

    fn game_with(entries: &[&str], config: &Config) -> Game {
        let records = GameRecords::new(Box::new(MemoryStore::new()));
        let mut game = Game::new(config, records, table_source(entries), SmallRng::seed_from_u64(12));
        assert!(game.wait_for_puzzle(WAIT));
        game
    }

    /// Store whose every operation fails.
    struct FailingStore;

    impl RecordStore for FailingStore {
        fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::Io {
                key: key.to_string(),
                source: std::io::Error::other("read-only medium"),
            })
        }

        fn write(&self, key: &str, _value: &str) -> Result<(), PersistenceError> {
            self.read(key).map(|_| ())
        }

        fn remove(&self, key: &str) -> Result<(), PersistenceError> {
            self.read(key).map(|_| ())
        }
    }

    /// Select the answer glyph by glyph using the visible grid.
    fn solve(game: &mut Game, answer: &str) {
        let snap = game.snapshot();
        let mut taken = Vec::new();
        for ch in answer.chars() {
            let tile = snap
                .tiles
                .iter()
                .find(|t| t.glyph == ch && !taken.contains(&t.pool_index))
                .unwrap();
            taken.push(tile.pool_index);
            assert!(game.toggle_tile(tile.pool_index));
        }
    }

    fn current_answer(game: &Game) -> String {
        game.used_answers().list().last().cloned().unwrap()
    }

    #[test]
    fn test_first_puzzle_is_recorded_as_used() {
        let game = game_with(&["床前明月光"], &Config::default());
        assert_eq!(game.snapshot().phase, Phase::Active);
        assert!(game.used_answers().contains("床前明月光"));
        assert_eq!(game.snapshot().hint, "hint for 床前明月光");
    }

    #[test]
    fn test_correct_round_scores_and_advances() {
        let mut game = game_with(&["床前明月光", "春眠不觉晓"], &Config::default());
        let first = current_answer(&game);
        game.tick();
        solve(&mut game, &first);
        assert_eq!(game.submit(), Some(Outcome::Correct));

        let agg = game.aggregate().clone();
        assert_eq!(agg.games_played, 1);
        assert_eq!(agg.score, 100 + 179);
        assert_eq!(game.last_round().unwrap().points, 279);
        assert_eq!(game.history().len(), 1);
        assert!(game.history().records()[0].is_correct);

        assert_eq!(game.reset(), Advance::NextPuzzle);
        assert!(game.wait_for_puzzle(WAIT));
        assert_eq!(game.snapshot().level, 2);
        assert_ne!(current_answer(&game), first);
    }

    #[test]
    fn test_timeout_is_recorded_as_wrong() {
        let mut game = game_with(&["孤帆远影碧空尽"], &Config::default());
        for _ in 0..180 {
            game.tick();
        }
        let snap = game.snapshot();
        assert_eq!(snap.outcome, Some(Outcome::Incorrect));
        assert!(snap.locked);
        assert_eq!(game.aggregate().wrong_answers, 1);
        assert_eq!(game.history().records()[0].time_spent, 180);
        // Further ticks do nothing.
        game.tick();
        assert_eq!(game.aggregate().games_played, 1);
    }

    #[test]
    fn test_difficulty_change_keeps_used_answers() {
        let mut game = game_with(&["床前明月光", "春眠不觉晓", "孤帆远影碧空尽"], &Config::default());
        let first = current_answer(&game);
        game.change_difficulty(Difficulty::Hard);
        assert_eq!(game.snapshot().phase, Phase::Loading);
        assert!(game.wait_for_puzzle(WAIT));
        assert_eq!(game.difficulty(), Difficulty::Hard);
        assert_eq!(game.snapshot().seconds_remaining, 120);
        assert_eq!(game.snapshot().tiles.len(), 28);
        assert!(game.used_answers().contains(&first));
        assert_eq!(game.used_answers().len(), 2);
    }

    #[test]
    fn test_rapid_switch_discards_stale_load() {
        let mut game = game_with(&["床前明月光", "春眠不觉晓", "孤帆远影碧空尽"], &Config::default());
        game.change_difficulty(Difficulty::Hard);
        game.change_difficulty(Difficulty::Easy);
        assert!(game.wait_for_puzzle(WAIT));
        assert_eq!(game.difficulty(), Difficulty::Easy);
        assert_eq!(game.snapshot().tiles.len(), 21);
        // Only the winning acquisition is recorded; the superseded one is not.
        assert_eq!(game.used_answers().len(), 2);
    }

    #[test]
    fn test_streak_bonus_applies_from_third_win() {
        let mut game = game_with(&["床前明月光", "春眠不觉晓", "孤帆远影碧空尽", "举头望明月"], &Config::default());
        let mut points = Vec::new();
        for _ in 0..4 {
            let answer = current_answer(&game);
            solve(&mut game, &answer);
            game.submit();
            points.push(game.last_round().unwrap().points);
            game.reset();
            assert!(game.wait_for_puzzle(WAIT));
        }
        assert_eq!(points, vec![280, 280, 280, 330]);
        assert_eq!(game.aggregate().best_streak, 4);
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut game = game_with(&["床前明月光"], &Config::default());
        game.sign_in("李白", "libai@example.com");
        assert_eq!(game.auth().display_name(), Some("李白"));
        game.sign_out();
        assert!(!game.auth().is_authenticated);
    }

    #[test]
    fn test_clear_during_load_is_not_undone() {
        let dir = tempfile::TempDir::new().unwrap();
        let open = || GameRecords::new(Box::new(JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap()));
        open()
            .save_used_answers(&UsedAnswers::from_list(vec![
                "床前明月光".to_string(),
                "春眠不觉晓".to_string(),
            ]))
            .unwrap();

        let entries = ["床前明月光", "春眠不觉晓", "孤帆远影碧空尽"];
        let mut game = Game::new(
            &Config::default(),
            open(),
            table_source(&entries),
            SmallRng::seed_from_u64(3),
        );
        // The worker already holds its copy of the old set.
        game.clear_used_answers();
        assert!(game.wait_for_puzzle(WAIT));

        assert_eq!(game.used_answers().list(), ["孤帆远影碧空尽"]);
        assert_eq!(open().load_used_answers().list(), ["孤帆远影碧空尽"]);
    }

    #[test]
    fn test_exhausted_table_restarts_used_set() {
        let mut game = game_with(&["床前明月光", "春眠不觉晓"], &Config::default());
        for _ in 0..2 {
            let answer = current_answer(&game);
            solve(&mut game, &answer);
            game.submit();
            game.reset();
            assert!(game.wait_for_puzzle(WAIT));
        }
        assert_eq!(game.used_answers().len(), 1);
    }

    #[test]
    fn test_failing_store_keeps_playing_in_memory() {
        let records = GameRecords::new(Box::new(FailingStore));
        let mut game = Game::new(
            &Config::default(),
            records,
            table_source(&["床前明月光", "春眠不觉晓"]),
            SmallRng::seed_from_u64(5),
        );
        assert!(game.wait_for_puzzle(WAIT));
        assert_eq!(game.used_answers().len(), 1);

        let answer = current_answer(&game);
        solve(&mut game, &answer);
        assert_eq!(game.submit(), Some(Outcome::Correct));
        assert_eq!(game.aggregate().games_played, 1);
        assert_eq!(game.history().len(), 1);

        assert_eq!(game.reset(), Advance::NextPuzzle);
        assert!(game.wait_for_puzzle(WAIT));
        for _ in 0..180 {
            game.tick();
        }
        assert_eq!(game.aggregate().games_played, 2);
        assert_eq!(game.aggregate().wrong_answers, 1);
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.used_answers().len(), 2);
    }
}
