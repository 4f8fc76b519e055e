// Game engine and persistence. The terminal front-end in main.rs, event.rs
// and ui/ talks to it only through `app::Game`.

pub mod app;
pub mod auth;
pub mod config;
pub mod engine;
pub mod generator;
pub mod multiplayer;
pub mod session;
pub mod store;
