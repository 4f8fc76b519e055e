pub mod fallback;
pub mod prompt;
pub mod remote;
pub mod source;

use thiserror::Error;

use crate::generator::prompt::GenerationRequest;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("answer already used: {0}")]
    DuplicateAnswer(String),
}

/// Something that turns a generation request into the raw completion text.
pub trait PoemGenerator: Send + Sync {
    fn complete(&self, request: &GenerationRequest) -> Result<String, SourceError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Remote,
    Fallback,
}

/// An answer and its hint, ready for the pool builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoemDraw {
    pub answer: String,
    pub hint: String,
    pub origin: Origin,
}

impl PoemDraw {
    pub fn glyphs(&self) -> Vec<char> {
        self.answer.chars().collect()
    }
}
