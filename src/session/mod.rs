pub mod loader;
pub mod result;
pub mod round;
