use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::engine::difficulty::Difficulty;
use crate::engine::pool;
use crate::generator::PoemDraw;
use crate::generator::source::PoemSource;
use crate::session::round::Puzzle;
use crate::store::history::UsedAnswers;

/// A finished acquisition, tagged with the epoch it was started for.
#[derive(Debug)]
pub struct Loaded {
    pub epoch: u64,
    pub draw: PoemDraw,
    pub puzzle: Puzzle,
    /// The draw ran out of fresh poems and started over from an empty used
    /// set; the caller must clear its own set before recording the answer.
    pub cleared: bool,
}

/// Draw a poem and build its grid on the current thread.
pub fn load_now<R: Rng + ?Sized>(
    source: &PoemSource,
    epoch: u64,
    difficulty: Difficulty,
    mut used: UsedAnswers,
    rng: &mut R,
) -> Loaded {
    let before = used.len();
    let draw = source.acquire(difficulty, &mut used, rng);
    // A normal draw adds exactly one new answer; anything less means the
    // set was emptied along the way.
    let cleared = before > 0 && used.len() <= before;
    let answer = draw.glyphs();
    let tiles = pool::build(&answer, difficulty, rng);
    let puzzle = Puzzle {
        answer,
        hint: draw.hint.clone(),
        tiles,
    };
    Loaded {
        epoch,
        draw,
        puzzle,
        cleared,
    }
}

/// Runs acquisitions on worker threads and hands results back over a channel.
/// Results are never filtered here; the round controller rejects stale epochs.
pub struct Loader {
    source: Arc<PoemSource>,
    tx: mpsc::Sender<Loaded>,
    rx: mpsc::Receiver<Loaded>,
}

impl Loader {
    pub fn new(source: PoemSource) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source: Arc::new(source),
            tx,
            rx,
        }
    }

    /// Start an acquisition against a snapshot of the used set.
    pub fn spawn(&self, epoch: u64, difficulty: Difficulty, used: UsedAnswers, seed: u64) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let mut rng = SmallRng::seed_from_u64(seed);
            let loaded = load_now(&source, epoch, difficulty, used, &mut rng);
            // The receiver only disappears when the game shuts down.
            let _ = tx.send(loaded);
        });
    }

    pub fn try_recv(&self) -> Option<Loaded> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Loaded> {
        self.rx.recv_timeout(timeout).ok()
    }
}
