use serde::{Deserialize, Serialize};

use crate::session::result::RoundRecord;

/// Most recent rounds kept in the log.
pub const HISTORY_LIMIT: usize = 50;

/// Round log, newest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundHistory {
    records: Vec<RoundRecord>,
}

impl RoundHistory {
    pub fn from_records(mut records: Vec<RoundRecord>) -> Self {
        records.truncate(HISTORY_LIMIT);
        Self { records }
    }

    pub fn append(&mut self, record: RoundRecord) {
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
    }

    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Answers already served, in the order they were served.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedAnswers {
    answers: Vec<String>,
}

impl UsedAnswers {
    pub fn from_list(list: Vec<String>) -> Self {
        let mut used = Self::default();
        for answer in list {
            used.insert(&answer);
        }
        used
    }

    /// Returns false when the answer was already present.
    pub fn insert(&mut self, answer: &str) -> bool {
        if self.contains(answer) {
            return false;
        }
        self.answers.push(answer.to_string());
        true
    }

    pub fn contains(&self, answer: &str) -> bool {
        self.answers.iter().any(|a| a == answer)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn list(&self) -> &[String] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
