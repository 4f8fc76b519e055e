use serde::{Deserialize, Serialize};

use crate::engine::difficulty::Difficulty;

/// Consecutive correct rounds needed before the streak bonus applies.
pub const STREAK_BONUS_THRESHOLD: u32 = 3;

/// Running totals across every round ever played.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameAggregate {
    pub score: u64,
    #[serde(alias = "highScore")]
    pub high_score: u64,
    #[serde(alias = "currentStreak")]
    pub current_streak: u32,
    #[serde(alias = "bestStreak")]
    pub best_streak: u32,
    #[serde(alias = "gamesPlayed")]
    pub games_played: u32,
    #[serde(alias = "correctAnswers")]
    pub correct_answers: u32,
    #[serde(alias = "wrongAnswers")]
    pub wrong_answers: u32,
}

/// How `best_streak` follows `current_streak` on a correct answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreakRule {
    /// Best streak is the longest run actually achieved.
    #[default]
    Exact,
    /// Best streak runs one ahead of the current streak, as older saves did.
    Legacy,
}

pub fn compute_score(seconds_remaining: u32, difficulty: Difficulty, current_streak: u32) -> u64 {
    let tier = difficulty.tier();
    let streak_bonus = if current_streak >= STREAK_BONUS_THRESHOLD {
        tier.streak_bonus
    } else {
        0
    };
    u64::from(tier.base_points)
        + u64::from(seconds_remaining) * u64::from(tier.time_bonus)
        + u64::from(streak_bonus)
}

pub fn apply_outcome(
    aggregate: &GameAggregate,
    is_correct: bool,
    points_if_correct: u64,
    rule: StreakRule,
) -> GameAggregate {
    let mut next = aggregate.clone();
    next.games_played += 1;

    if is_correct {
        next.score += points_if_correct;
        next.high_score = next.high_score.max(next.score);
        next.current_streak += 1;
        next.correct_answers += 1;
        let candidate = match rule {
            StreakRule::Exact => next.current_streak,
            StreakRule::Legacy => next.current_streak + 1,
        };
        next.best_streak = next.best_streak.max(candidate);
    } else {
        next.current_streak = 0;
        next.wrong_answers += 1;
    }

    next
}

/// Share of rounds answered correctly, in percent.
pub fn accuracy(aggregate: &GameAggregate) -> f64 {
    if aggregate.games_played == 0 {
        return 0.0;
    }
    aggregate.correct_answers as f64 / aggregate.games_played as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_time_no_streak_is_base() {
        assert_eq!(compute_score(0, Difficulty::Easy, 0), 100);
        assert_eq!(compute_score(0, Difficulty::Hard, 0), 200);
    }

    #[test]
    fn test_hard_with_time_and_streak() {
        assert_eq!(compute_score(60, Difficulty::Hard, 3), 200 + 60 * 2 + 100);
    }

    #[test]
    fn test_streak_bonus_starts_at_three() {
        assert_eq!(compute_score(10, Difficulty::Easy, 2), 110);
        assert_eq!(compute_score(10, Difficulty::Easy, 3), 160);
    }

    #[test]
    fn test_correct_outcome_updates_totals() {
        let start = GameAggregate::default();
        let next = apply_outcome(&start, true, 250, StreakRule::Exact);
        assert_eq!(next.games_played, 1);
        assert_eq!(next.correct_answers, 1);
        assert_eq!(next.wrong_answers, 0);
        assert_eq!(next.score, 250);
        assert_eq!(next.high_score, 250);
        assert_eq!(next.current_streak, 1);
        assert_eq!(next.best_streak, 1);
    }

    #[test]
    fn test_incorrect_outcome_breaks_streak_but_keeps_best() {
        let mut agg = GameAggregate::default();
        for _ in 0..4 {
            agg = apply_outcome(&agg, true, 100, StreakRule::Exact);
        }
        let after = apply_outcome(&agg, false, 999, StreakRule::Exact);
        assert_eq!(after.current_streak, 0);
        assert_eq!(after.best_streak, 4);
        assert_eq!(after.score, 400);
        assert_eq!(after.wrong_answers, 1);
        assert_eq!(after.correct_answers + after.wrong_answers, after.games_played);
    }

    #[test]
    fn test_legacy_rule_runs_one_ahead() {
        let agg = apply_outcome(&GameAggregate::default(), true, 100, StreakRule::Legacy);
        assert_eq!(agg.current_streak, 1);
        assert_eq!(agg.best_streak, 2);
    }

    #[test]
    fn test_high_score_tracks_maximum() {
        let agg = GameAggregate {
            score: 10,
            high_score: 5000,
            ..GameAggregate::default()
        };
        let next = apply_outcome(&agg, true, 100, StreakRule::Exact);
        assert_eq!(next.score, 110);
        assert_eq!(next.high_score, 5000);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&GameAggregate::default()), 0.0);
        let agg = GameAggregate {
            games_played: 4,
            correct_answers: 3,
            wrong_answers: 1,
            ..GameAggregate::default()
        };
        assert!((accuracy(&agg) - 75.0).abs() < f64::EPSILON);
    }
}
