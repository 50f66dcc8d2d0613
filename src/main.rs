// src/main.rs
use std::process;

use clap::Parser;
use clapi::args::Invocation;
use clapi::channel::{print_styled, Severity, TerminalChannel};
use clapi::cli::{Cli, Commands, InteractiveArgs};
use clapi::dispatch::CommandDispatcher;
use clapi::error::ClapiError;
use clapi::list;
use clapi::registry::{builtin_commands, load_command_validators, load_commands, Command};
use clapi::utils::Workspace;
use log::LevelFilter;

fn main() {
  let cli = Cli::parse();

  // Setup logging based on verbosity
  let log_level = match cli.verbose {
    0 => LevelFilter::Info,
    1 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  env_logger::Builder::new().filter_level(log_level).init();

  log::debug!("CLI args: {:?}", cli);

  if let Err(e) = run(cli) {
    print_styled(Severity::Error, &e.to_string());
    process::exit(1);
  }
}

fn run(cli: Cli) -> Result<(), ClapiError> {
  let workspace = match &cli.cwd {
    Some(dir) => Workspace::new(dir),
    None => Workspace::current()?,
  };
  log::debug!("Using workspace: {}", workspace.root().display());

  let commands = load_registry(&cli)?;
  let invocation = Invocation::new(cli.invocation.clone());
  let dispatcher = CommandDispatcher::new(&workspace);
  let mut channel = TerminalChannel::new();

  match cli.command.unwrap_or(Commands::Interactive(InteractiveArgs::default())) {
    Commands::List => {
      list::run_list(&commands)?;
    }
    Commands::Interactive(args) => {
      dispatcher.run_interactive(&commands, args.tokens, &mut channel)?;
    }
    Commands::Run(args) => {
      let (name, tokens) = args.into_parts();
      dispatcher.run_named(&commands, name.as_deref(), &tokens, &invocation, &mut channel)?;
    }
  }

  Ok(())
}

/// Loads commands from --commands-dir when given, otherwise the built-in set.
/// A --validators-dir on its own re-resolves the built-in commands' validators.
fn load_registry(cli: &Cli) -> Result<Vec<Command>, ClapiError> {
  let mut discovery = match &cli.commands_dir {
    Some(dir) => {
      log::info!("Using commands directory: {}", dir.display());
      load_commands(dir, &cli.ext, cli.validators_dir.as_deref())?
    }
    None => builtin_commands()?,
  };

  if let (None, Some(validators_dir)) = (&cli.commands_dir, &cli.validators_dir) {
    log::info!("Using validators directory: {}", validators_dir.display());
    let warnings = load_command_validators(validators_dir, &mut discovery.commands, &cli.ext)?;
    discovery.warnings.extend(warnings);
  }

  discovery.log_warnings();
  if discovery.commands.is_empty() {
    return Err(ClapiError::NoCommands);
  }
  Ok(discovery.commands)
}
