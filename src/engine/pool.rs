use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::difficulty::Difficulty;

/// Tiles per grid row.
pub const ROW_WIDTH: usize = 7;

/// Filler glyphs drawn (with replacement) to pad the pool. 月 appears twice,
/// which weights it double.
pub const COMMON_GLYPHS: &str = "山水春秋风雨花月日月星云天地人情思归去来高低远近明暗静动";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub glyph: char,
    pub pool_index: usize,
}

fn round_up_to_row(n: usize) -> usize {
    n.div_ceil(ROW_WIDTH) * ROW_WIDTH
}

/// Draw `count` distractors uniformly from the common alphabet.
pub fn random_distractors<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<char> {
    let alphabet: Vec<char> = COMMON_GLYPHS.chars().collect();
    (0..count)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Number of tiles a pool for `answer_len` glyphs ends up with.
pub fn pool_size(answer_len: usize, difficulty: Difficulty) -> usize {
    let padded = round_up_to_row(answer_len);
    let minimum = difficulty.tier().min_pool;
    if padded < minimum {
        round_up_to_row(minimum)
    } else {
        padded
    }
}

/// Pad the answer with distractors to a full grid and shuffle it.
///
/// The grid always holds a whole number of rows and at least the tier's
/// minimum, and every answer glyph is present at least as often as it occurs
/// in the answer.
pub fn build<R: Rng + ?Sized>(answer: &[char], difficulty: Difficulty, rng: &mut R) -> Vec<Tile> {
    let mut glyphs: Vec<char> = answer.to_vec();

    let padded = round_up_to_row(glyphs.len());
    glyphs.extend(random_distractors(padded - answer.len(), rng));

    let minimum = difficulty.tier().min_pool;
    if glyphs.len() < minimum {
        glyphs.extend(random_distractors(minimum - glyphs.len(), rng));
    }

    let full = round_up_to_row(glyphs.len());
    if glyphs.len() < full {
        glyphs.extend(random_distractors(full - glyphs.len(), rng));
    }

    glyphs.shuffle(rng);

    glyphs
        .into_iter()
        .enumerate()
        .map(|(pool_index, glyph)| Tile { glyph, pool_index })
        .collect()
}
