// Kart Rust library
// Addons, input devices and menu screens

pub mod addons;
pub mod cli;
pub mod config;
pub mod input;
pub mod logging;
pub mod screens;

pub use cli::Cli;
pub use config::Options;
pub use logging::LogLevel;
