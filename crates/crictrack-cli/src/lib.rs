// Command-line front end for the cricket performance tracker: subcommand
// handlers, terminal rendering and chart series export.

pub mod commands;
pub mod export;
pub mod render;

pub use commands::Settings;
