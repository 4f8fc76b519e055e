use crate::engine::difficulty::Difficulty;
use crate::engine::pool::Tile;
use crate::session::result::Resolution;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockReason {
    Submitted,
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a puzzle; no input accepted.
    Loading,
    /// Countdown running, tiles selectable.
    Active,
    /// Round ended; its resolution has not been collected yet.
    Locked(LockReason),
    /// Round ended and was recorded.
    Resolved(LockReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// What `advance` did after a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Solved: the level went up and a fresh puzzle must be loaded.
    NextPuzzle,
    /// Out of retries: the same puzzle restarts with full timer and retries.
    Restarted,
    /// Wrong but retries remain: the same puzzle resumes with retries kept.
    Retried,
    /// Nothing to advance from.
    Ignored,
}

/// A drawn answer with its hint and shuffled grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    pub answer: Vec<char>,
    pub hint: String,
    pub tiles: Vec<Tile>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileView {
    pub glyph: char,
    pub pool_index: usize,
    pub selected: bool,
}

/// Read-only view handed to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSnapshot {
    pub phase: Phase,
    pub difficulty: Difficulty,
    pub level: u32,
    pub hint: String,
    pub answer_len: usize,
    pub tiles: Vec<TileView>,
    pub selection: Vec<char>,
    pub seconds_remaining: u32,
    pub time_limit: u32,
    pub retries_left: u32,
    pub locked: bool,
    pub outcome: Option<Outcome>,
    pub revealed_answer: Option<String>,
}

pub struct RoundController {
    difficulty: Difficulty,
    epoch: u64,
    phase: Phase,
    level: u32,
    answer: Vec<char>,
    hint: String,
    tiles: Vec<Tile>,
    selection: Vec<usize>,
    seconds_remaining: u32,
    retries_left: u32,
    outcome: Option<Outcome>,
    revealed: bool,
}

impl RoundController {
    pub fn new(difficulty: Difficulty) -> Self {
        let tier = difficulty.tier();
        Self {
            difficulty,
            epoch: 0,
            phase: Phase::Loading,
            level: 1,
            answer: Vec::new(),
            hint: String::new(),
            tiles: Vec::new(),
            selection: Vec::new(),
            seconds_remaining: tier.time_limit_secs,
            retries_left: tier.retries,
            outcome: None,
            revealed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.phase, Phase::Locked(_) | Phase::Resolved(_))
    }

    pub fn answer_text(&self) -> String {
        self.answer.iter().collect()
    }

    /// Glyphs of the current selection, in selection order.
    pub fn selected_glyphs(&self) -> Vec<char> {
        self.selection
            .iter()
            .filter_map(|&idx| self.tiles.get(idx).map(|t| t.glyph))
            .collect()
    }

    /// Drop the current puzzle and wait for a new one. Returns the epoch the
    /// caller must hand back to `complete_loading`; any older epoch is stale.
    pub fn begin_loading(&mut self, difficulty: Difficulty) -> u64 {
        self.epoch += 1;
        self.difficulty = difficulty;
        self.phase = Phase::Loading;
        self.answer.clear();
        self.hint.clear();
        self.tiles.clear();
        self.restore_round_budget();
        self.epoch
    }

    /// Install a loaded puzzle. Returns false (and changes nothing) when the
    /// epoch was superseded or no load is pending.
    pub fn complete_loading(&mut self, epoch: u64, puzzle: Puzzle) -> bool {
        if epoch != self.epoch || self.phase != Phase::Loading || puzzle.answer.is_empty() {
            return false;
        }
        self.answer = puzzle.answer;
        self.hint = puzzle.hint;
        self.tiles = puzzle.tiles;
        self.restore_round_budget();
        self.phase = Phase::Active;
        true
    }

    fn restore_round_budget(&mut self) {
        let tier = self.difficulty.tier();
        self.seconds_remaining = tier.time_limit_secs;
        self.retries_left = tier.retries;
        self.selection.clear();
        self.outcome = None;
        self.revealed = false;
    }

    /// One second of countdown. A tick outside the active phase is a no-op.
    pub fn tick(&mut self) -> Option<Outcome> {
        if self.phase != Phase::Active {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.phase = Phase::Locked(LockReason::TimedOut);
            self.outcome = Some(Outcome::Incorrect);
            return self.outcome;
        }
        None
    }

    /// Select an unselected tile or deselect a selected one.
    pub fn toggle_tile(&mut self, pool_index: usize) -> bool {
        if self.phase != Phase::Active || pool_index >= self.tiles.len() {
            return false;
        }
        if let Some(pos) = self.selection.iter().position(|&i| i == pool_index) {
            self.selection.remove(pos);
        } else {
            self.selection.push(pool_index);
        }
        true
    }

    /// Remove the most recently selected tile.
    pub fn undo_last(&mut self) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        self.selection.pop().is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Active && !self.selection.is_empty() && !self.revealed
    }

    pub fn submit(&mut self) -> Option<Outcome> {
        if !self.can_submit() {
            return None;
        }
        let outcome = if self.selected_glyphs() == self.answer {
            Outcome::Correct
        } else {
            self.retries_left = self.retries_left.saturating_sub(1);
            if self.retries_left == 0 {
                self.revealed = true;
            }
            Outcome::Incorrect
        };
        self.phase = Phase::Locked(LockReason::Submitted);
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Collect the pending resolution once; moves Locked to Resolved.
    pub fn take_resolution(&mut self) -> Option<Resolution> {
        let Phase::Locked(reason) = self.phase else {
            return None;
        };
        self.phase = Phase::Resolved(reason);
        let time_limit = self.difficulty.tier().time_limit_secs;
        Some(Resolution {
            is_correct: self.outcome == Some(Outcome::Correct),
            seconds_remaining: self.seconds_remaining,
            time_spent: time_limit - self.seconds_remaining,
            answer_text: self.answer_text(),
            difficulty: self.difficulty,
        })
    }

    /// Move on from a finished round. A solved round raises the level and asks
    /// for a new puzzle; otherwise the same puzzle is played again.
    pub fn advance(&mut self) -> Advance {
        if !self.is_locked() {
            return Advance::Ignored;
        }
        match self.outcome {
            Some(Outcome::Correct) => {
                self.level += 1;
                self.restore_round_budget();
                Advance::NextPuzzle
            }
            Some(Outcome::Incorrect) if self.revealed => {
                self.restore_round_budget();
                self.phase = Phase::Active;
                Advance::Restarted
            }
            Some(Outcome::Incorrect) => {
                let tier = self.difficulty.tier();
                self.seconds_remaining = tier.time_limit_secs;
                self.selection.clear();
                self.outcome = None;
                self.phase = Phase::Active;
                Advance::Retried
            }
            None => Advance::Ignored,
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let tiles = self
            .tiles
            .iter()
            .map(|t| TileView {
                glyph: t.glyph,
                pool_index: t.pool_index,
                selected: self.selection.contains(&t.pool_index),
            })
            .collect();

        RoundSnapshot {
            phase: self.phase,
            difficulty: self.difficulty,
            level: self.level,
            hint: self.hint.clone(),
            answer_len: self.answer.len(),
            tiles,
            selection: self.selected_glyphs(),
            seconds_remaining: self.seconds_remaining,
            time_limit: self.difficulty.tier().time_limit_secs,
            retries_left: self.retries_left,
            locked: self.is_locked(),
            outcome: self.outcome,
            revealed_answer: self.revealed.then(|| self.answer_text()),
        }
    }
}
