use rand::Rng;
use rand::seq::SliceRandom;
use rust_embed::Embed;
use serde::Deserialize;

use crate::generator::source::normalize_answer;
use crate::store::history::UsedAnswers;

#[derive(Embed)]
#[folder = "assets/"]
struct PoemAssets;

const TABLE_FILE: &str = "fallback_poems.toml";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FallbackPoem {
    pub answer: String,
    pub hint: String,
}

#[derive(Deserialize)]
struct TableFile {
    #[serde(default)]
    poem: Vec<FallbackPoem>,
}

/// Canonical answer/hint pairs served when the generator cannot be used.
#[derive(Clone, Debug)]
pub struct FallbackTable {
    entries: Vec<FallbackPoem>,
}

impl FallbackTable {
    pub fn load() -> Self {
        let entries = PoemAssets::get(TABLE_FILE)
            .and_then(|file| {
                let text = std::str::from_utf8(file.data.as_ref()).ok()?.to_string();
                toml::from_str::<TableFile>(&text).ok()
            })
            .map(|table| table.poem)
            .unwrap_or_default();

        if entries.is_empty() {
            log::warn!("fallback table {TABLE_FILE} missing or empty; using built-in entry");
        }
        Self::new(entries)
    }

    /// Build a table; an empty list is replaced by a single built-in entry so
    /// the table can never be exhausted by construction. Answers are stored
    /// normalized so they compare equal to the used set.
    pub fn new(entries: Vec<FallbackPoem>) -> Self {
        let entries: Vec<FallbackPoem> = entries
            .into_iter()
            .map(|p| FallbackPoem {
                answer: normalize_answer(&p.answer),
                hint: p.hint,
            })
            .filter(|p| !p.answer.is_empty())
            .collect();
        let entries = if entries.is_empty() {
            vec![FallbackPoem {
                answer: "床前明月光".to_string(),
                hint: "if(moon.isShining()) {\n  heart.remember(hometown);\n}".to_string(),
            }]
        } else {
            entries
        };
        Self { entries }
    }

    pub fn entries(&self) -> &[FallbackPoem] {
        &self.entries
    }

    /// Uniform pick among entries not yet used; `None` once all are used.
    pub fn pick<R: Rng + ?Sized>(&self, used: &UsedAnswers, rng: &mut R) -> Option<&FallbackPoem> {
        let available: Vec<&FallbackPoem> = self
            .entries
            .iter()
            .filter(|p| !used.contains(&p.answer))
            .collect();
        available.choose(rng).copied()
    }
}
