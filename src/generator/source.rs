use std::sync::{Arc, LazyLock};

use icu_normalizer::ComposingNormalizerBorrowed;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;

use crate::config::GeneratorConfig;
use crate::engine::difficulty::Difficulty;
use crate::generator::fallback::FallbackTable;
use crate::generator::prompt::build_request;
use crate::generator::{Origin, PoemDraw, PoemGenerator, SourceError};
use crate::store::history::UsedAnswers;

/// Punctuation removed from answers before they are compared or served.
pub const STRIPPED_PUNCTUATION: &[char] = &['，', '。', '！', '？', '；', '：', '、'];

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

/// Canonical form of an answer: no line breaks, punctuation or whitespace,
/// NFC composed.
pub fn normalize_answer(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| {
            !STRIPPED_PUNCTUATION.contains(c) && !c.is_whitespace() && !c.is_ascii_punctuation()
        })
        .collect();
    ComposingNormalizerBorrowed::new_nfc()
        .normalize(stripped.trim())
        .into_owned()
}

#[derive(Deserialize)]
struct RawPair {
    #[serde(alias = "answer")]
    poem: Option<String>,
    #[serde(alias = "hint")]
    code: Option<String>,
}

/// Find the `{...}` object in free text and read its poem and code fields.
pub fn parse_pair(content: &str) -> Result<(String, String), SourceError> {
    let found = JSON_OBJECT
        .find(content)
        .ok_or_else(|| SourceError::MalformedResponse("no JSON found in response".to_string()))?;
    let raw: RawPair = serde_json::from_str(found.as_str())
        .map_err(|e| SourceError::MalformedResponse(format!("invalid JSON: {e}")))?;

    match (raw.poem, raw.code) {
        (Some(poem), Some(code)) if !poem.trim().is_empty() && !code.trim().is_empty() => {
            Ok((poem, code))
        }
        _ => Err(SourceError::MalformedResponse(
            "invalid response format".to_string(),
        )),
    }
}

/// Resolves answer/hint pairs, preferring the generator and never repeating
/// an answer that is still in the used set.
pub struct PoemSource {
    generator: Arc<dyn PoemGenerator>,
    fallback: FallbackTable,
    config: GeneratorConfig,
}

impl PoemSource {
    pub fn new(
        generator: Arc<dyn PoemGenerator>,
        fallback: FallbackTable,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            generator,
            fallback,
            config,
        }
    }

    /// Always yields a usable draw; the answer is added to `used` before
    /// returning.
    pub fn acquire<R: Rng + ?Sized>(
        &self,
        difficulty: Difficulty,
        used: &mut UsedAnswers,
        rng: &mut R,
    ) -> PoemDraw {
        let mut duplicates = 0;
        loop {
            match self.request_remote(difficulty, used) {
                Ok(draw) => {
                    log::info!("generator served a {difficulty} poem");
                    used.insert(&draw.answer);
                    return draw;
                }
                Err(SourceError::DuplicateAnswer(answer))
                    if duplicates < self.config.max_duplicate_retries =>
                {
                    duplicates += 1;
                    log::debug!("generator repeated {answer}; asking again ({duplicates})");
                }
                Err(e) => {
                    log::warn!("poem generation failed, using fallback table: {e}");
                    break;
                }
            }
        }
        self.acquire_fallback(used, rng)
    }

    fn request_remote(
        &self,
        difficulty: Difficulty,
        used: &UsedAnswers,
    ) -> Result<PoemDraw, SourceError> {
        let request = build_request(difficulty, used.list(), &self.config);
        let content = self.generator.complete(&request)?;
        let (poem, code) = parse_pair(&content)?;

        let answer = normalize_answer(&poem);
        if answer.is_empty() {
            return Err(SourceError::MalformedResponse(
                "answer is empty after normalization".to_string(),
            ));
        }
        if used.contains(&answer) {
            return Err(SourceError::DuplicateAnswer(answer));
        }
        Ok(PoemDraw {
            answer,
            hint: code,
            origin: Origin::Remote,
        })
    }

    fn acquire_fallback<R: Rng + ?Sized>(&self, used: &mut UsedAnswers, rng: &mut R) -> PoemDraw {
        loop {
            if let Some(poem) = self.fallback.pick(used, rng) {
                let draw = PoemDraw {
                    answer: normalize_answer(&poem.answer),
                    hint: poem.hint.clone(),
                    origin: Origin::Fallback,
                };
                used.insert(&draw.answer);
                return draw;
            }
            log::info!("fallback table exhausted; clearing {} used answers", used.len());
            used.clear();
        }
    }
}
