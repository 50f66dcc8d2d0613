//! Clapi: discovers route/server generator commands, collects and validates
//! their arguments from flags or prompts, and writes the generated files.

pub mod args;
pub mod channel;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod dispatch;
pub mod error;
pub mod generate;
pub mod list;
pub mod prompter;
pub mod registry;
pub mod schema;
pub mod utils;
