// src/dispatch.rs
use std::path::PathBuf;

use log::{debug, info};

use crate::args::{parse_and_validate, Invocation};
use crate::channel::Channel;
use crate::config::{apply_config, load_config};
use crate::conflict::{ConflictResolver, Resolution};
use crate::error::ClapiError;
use crate::prompter::{InteractivePrompter, Selection};
use crate::registry::{find_command, Command};
use crate::utils::Workspace;

pub struct CommandDispatcher<'a> {
  workspace: &'a Workspace,
}

impl<'a> CommandDispatcher<'a> {
  pub fn new(workspace: &'a Workspace) -> Self {
    Self { workspace }
  }

  /// Validates `tokens`, merges config defaults and runs the command's
  /// generator, settling file conflicts through `channel`. Returns the path
  /// written, relative to the workspace when the output directory is relative.
  pub fn execute<C: Channel + ?Sized>(
    &self,
    command: &Command,
    tokens: &[String],
    invocation: &Invocation,
    channel: &mut C,
  ) -> Result<PathBuf, ClapiError> {
    info!("Running '{}' command...", command.validator.name);
    let mut args = parse_and_validate(tokens, &command.validator, invocation)?;
    let config = load_config(self.workspace)?;
    apply_config(&mut args, config.as_ref());
    debug!("Merged arguments: {:?}", args);

    loop {
      let intent = command.generator.plan(&args, config.as_ref())?;
      self.workspace.ensure_dir(&intent.dir)?;

      let rename_arg = command.generator.rename_arg();
      let resolution = ConflictResolver::new(channel, self.workspace).resolve(
        &intent,
        &args,
        rename_arg,
        command.validator.detail(rename_arg),
      )?;
      match resolution {
        Resolution::Write(path) => {
          self.workspace.write(&path, &intent.contents)?;
          channel.good(&format!("{} file successfully created.", path.display()));
          channel.close();
          return Ok(path);
        }
        Resolution::Retry(renamed) => {
          debug!("Retrying generation with renamed arguments: {:?}", renamed);
          args = renamed;
        }
      }
    }
  }

  pub fn execute_selection<C: Channel + ?Sized>(
    &self,
    selection: &Selection<'_>,
    channel: &mut C,
  ) -> Result<PathBuf, ClapiError> {
    self.execute(
      selection.command,
      &selection.tokens,
      &selection.invocation,
      channel,
    )
  }

  /// Non-interactive path: the command comes from `name` or, failing that, from
  /// the invocation keyword's modifier.
  pub fn run_named<C: Channel + ?Sized>(
    &self,
    commands: &[Command],
    name: Option<&str>,
    tokens: &[String],
    invocation: &Invocation,
    channel: &mut C,
  ) -> Result<PathBuf, ClapiError> {
    let name = match name {
      Some(n) => n.to_string(),
      None => invocation
        .modifier()?
        .filter(|m| !m.is_empty())
        .ok_or(ClapiError::InvalidKeyword)?,
    };
    let command =
      find_command(commands, &name).ok_or_else(|| ClapiError::CommandNotFound(name.clone()))?;
    self.execute(command, tokens, invocation, channel)
  }

  /// Interactive path: prompt for a command and its arguments, then execute.
  pub fn run_interactive<C: Channel + ?Sized>(
    &self,
    commands: &[Command],
    tokens: Vec<String>,
    channel: &mut C,
  ) -> Result<PathBuf, ClapiError> {
    let selection = InteractivePrompter::new(channel, commands, tokens).run()?;
    self.execute_selection(&selection, channel)
  }
}
