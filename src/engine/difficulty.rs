use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

/// Per-difficulty rules for timing, scoring, retries and pool size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tier {
    pub time_limit_secs: u32,
    pub base_points: u32,
    pub time_bonus: u32,
    pub streak_bonus: u32,
    pub retries: u32,
    pub min_pool: usize,
}

const EASY: Tier = Tier {
    time_limit_secs: 180,
    base_points: 100,
    time_bonus: 1,
    streak_bonus: 50,
    retries: 3,
    min_pool: 21,
};

const HARD: Tier = Tier {
    time_limit_secs: 120,
    base_points: 200,
    time_bonus: 2,
    streak_bonus: 100,
    retries: 2,
    min_pool: 28,
};

impl Difficulty {
    pub const ALL: [Difficulty; 2] = [Difficulty::Easy, Difficulty::Hard];

    pub fn tier(self) -> &'static Tier {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Hard => &HARD,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other} (expected easy or hard)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_is_shorter_and_richer() {
        let easy = Difficulty::Easy.tier();
        let hard = Difficulty::Hard.tier();
        assert!(hard.time_limit_secs < easy.time_limit_secs);
        assert!(hard.base_points > easy.base_points);
        assert!(hard.retries < easy.retries);
        assert!(hard.min_pool > easy.min_pool);
    }

    #[test]
    fn test_min_pool_is_multiple_of_row_width() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.tier().min_pool % 7, 0);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("medium".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, "\"hard\"");
        let back: Difficulty = serde_json::from_str("\"easy\"").unwrap();
        assert_eq!(back, Difficulty::Easy);
    }
}
