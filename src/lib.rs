// The binary in main.rs drives the terminal UI; everything it needs lives in
// this library so integration tests and benchmarks can reach the engine.

rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod audio;
pub mod config;
pub mod engine;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;
pub mod vocab;
