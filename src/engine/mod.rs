pub mod difficulty;
pub mod pool;
pub mod scoring;

pub use difficulty::Difficulty;
