use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::difficulty::Difficulty;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    #[serde(alias = "poem")]
    pub answer_text: String,
    #[serde(deserialize_with = "timestamp_or_millis")]
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "isCorrect")]
    pub is_correct: bool,
    /// Seconds spent before the round resolved.
    #[serde(alias = "timeSpent")]
    pub time_spent: u32,
    pub difficulty: Difficulty,
}

/// Accepts RFC 3339 strings or bare epoch milliseconds (browser-era saves).
pub(crate) fn timestamp_or_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(DateTime<Utc>),
        Millis(i64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(ts) => Ok(ts),
        Raw::Millis(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {ms}"))),
    }
}

/// Everything a resolved round reports back to the ledger and history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub is_correct: bool,
    pub seconds_remaining: u32,
    pub time_spent: u32,
    pub answer_text: String,
    pub difficulty: Difficulty,
}

impl RoundRecord {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        Self {
            answer_text: resolution.answer_text.clone(),
            timestamp: Utc::now(),
            is_correct: resolution.is_correct,
            time_spent: resolution.time_spent,
            difficulty: resolution.difficulty,
        }
    }
}
