// src/cli.rs
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::registry::DEFAULT_EXTENSION;

#[derive(Parser, Debug)]
#[command(
    name = "clapi",
    author,
    version,
    about = "Generates HTTP route and server boilerplate from validated arguments.",
    long_about = None
)]
pub struct Cli {
  /// Defaults to the interactive flow
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Increase verbosity level (e.g., -v, -vv)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Directory of command manifests (built-in commands when omitted)
  #[arg(long, global = true)]
  #[clap(env = "CLAPI_COMMANDS_DIR")]
  pub commands_dir: Option<PathBuf>,

  /// Directory searched for `{Command}Validator` files
  #[arg(long, global = true)]
  #[clap(env = "CLAPI_VALIDATORS_DIR")]
  pub validators_dir: Option<PathBuf>,

  /// Extension of command and validator files
  #[arg(long, default_value = DEFAULT_EXTENSION, global = true)]
  pub ext: String,

  /// Directory to read clapi.config.json from and generate files into
  #[arg(long, global = true)]
  pub cwd: Option<PathBuf>,

  /// Task-runner keyword, e.g. `clapi:route`. Enables the modifier check.
  #[arg(long, global = true)]
  #[clap(env = "npm_lifecycle_event")]
  pub invocation: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Select a command and answer its argument prompts
  Interactive(InteractiveArgs),
  /// Run a command with `key=value` arguments, no prompts unless a file conflicts
  Run(RunArgs),
  /// List available commands and their arguments
  List,
}

#[derive(Args, Debug, Default)]
pub struct InteractiveArgs {
  /// Arguments supplied up front (`key=value`)
  pub tokens: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
  /// Command name (e.g. route, http-server). Taken from --invocation when omitted.
  pub command: Option<String>,

  /// Command arguments (`key=value`)
  pub tokens: Vec<String>,
}

impl RunArgs {
  /// Splits the command name from the tokens; `run name=x` has no command name.
  pub fn into_parts(self) -> (Option<String>, Vec<String>) {
    match self.command {
      Some(first) if first.contains('=') => {
        let mut tokens = vec![first];
        tokens.extend(self.tokens);
        (None, tokens)
      }
      command => (command, self.tokens),
    }
  }
}
