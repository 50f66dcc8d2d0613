// src/prompter.rs
use std::collections::VecDeque;

use log::{debug, trace};

use crate::args::{check_value, split_token, Invocation};
use crate::channel::{is_yes, Channel, Severity};
use crate::error::ClapiError;
use crate::registry::Command;

const SELECT_COMMAND_QUESTION: &str = "1. Enter the number of a command: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
  SelectCommand,
  ConfirmSelection(usize),
  DisplayArgDetails(usize),
  CollectArg {
    command: usize,
    remaining: VecDeque<String>,
  },
  Dispatch(usize),
}

/// The outcome of an interactive session: the chosen command and every raw
/// `key=value` token gathered for it.
#[derive(Debug, Clone)]
pub struct Selection<'c> {
  pub command: &'c Command,
  pub tokens: Vec<String>,
  pub invocation: Invocation,
}

pub struct InteractivePrompter<'io, 'a, C: Channel + ?Sized> {
  channel: &'io mut C,
  commands: &'a [Command],
  tokens: Vec<String>,
}

impl<'io, 'a, C: Channel + ?Sized> InteractivePrompter<'io, 'a, C> {
  /// `tokens` are arguments already supplied on the command line; answers are
  /// appended to them.
  pub fn new(channel: &'io mut C, commands: &'a [Command], tokens: Vec<String>) -> Self {
    Self {
      channel,
      commands,
      tokens,
    }
  }

  pub fn display_commands(&mut self) {
    self.channel.good("Available commands: ");
    for (index, command) in self.commands.iter().enumerate() {
      self
        .channel
        .show(Severity::Listing, &format!("[{}] {}", index, command.validator.name));
    }
  }

  /// Runs the question loop until a command is ready to dispatch.
  pub fn run(mut self) -> Result<Selection<'a>, ClapiError> {
    if self.commands.is_empty() {
      return Err(ClapiError::NoCommands);
    }
    self.display_commands();

    let mut state = PromptState::SelectCommand;
    loop {
      trace!("Prompt state: {:?}", state);
      state = match state {
        PromptState::Dispatch(index) => {
          let commands = self.commands;
          let command = &commands[index];
          debug!(
            "Dispatching '{}' with tokens {:?}",
            command.validator.name, self.tokens
          );
          return Ok(Selection {
            command,
            tokens: self.tokens,
            invocation: Invocation::for_command(&command.validator.name),
          });
        }
        other => self.step(other)?,
      };
    }
  }

  /// Transition function: asks at most one question and returns the next state.
  pub fn step(&mut self, state: PromptState) -> Result<PromptState, ClapiError> {
    let next = match state {
      PromptState::SelectCommand => {
        let answer = self.channel.ask(SELECT_COMMAND_QUESTION)?;
        match answer.trim().parse::<usize>() {
          Ok(index) if index < self.commands.len() => PromptState::ConfirmSelection(index),
          Ok(_) => {
            self.channel.error("Invalid command");
            PromptState::SelectCommand
          }
          Err(_) => {
            self.channel.error("Invalid selection");
            PromptState::SelectCommand
          }
        }
      }
      PromptState::ConfirmSelection(index) => {
        let question = format!(
          "2. Please confirm your selection of the {} command [Y / N]: ",
          self.commands[index].validator.name
        );
        let answer = self.channel.ask(&question)?;
        if is_yes(&answer) {
          PromptState::DisplayArgDetails(index)
        } else {
          PromptState::SelectCommand
        }
      }
      PromptState::DisplayArgDetails(index) => {
        self.display_arg_details(index);
        let remaining: VecDeque<String> =
          self.commands[index].validator.available.iter().cloned().collect();
        if remaining.is_empty() {
          PromptState::Dispatch(index)
        } else {
          PromptState::CollectArg {
            command: index,
            remaining,
          }
        }
      }
      PromptState::CollectArg {
        command,
        mut remaining,
      } => {
        let Some(option) = remaining.front().cloned() else {
          return Ok(PromptState::Dispatch(command));
        };
        if self.collect_arg(command, &option)? {
          remaining.pop_front();
        }
        if remaining.is_empty() {
          PromptState::Dispatch(command)
        } else {
          PromptState::CollectArg { command, remaining }
        }
      }
      PromptState::Dispatch(index) => PromptState::Dispatch(index),
    };
    Ok(next)
  }

  fn display_arg_details(&mut self, index: usize) {
    let validator = &self.commands[index].validator;
    self
      .channel
      .warn("Here are the available arguments to choose from: ");
    for available in &validator.available {
      self.channel.info(&format!("- {}", available));
      if let Some(detail) = validator.detail(available) {
        self
          .channel
          .good(&format!("-- Description: {}", detail.description));
      }
    }
    self.channel.error("The following arguments are required: ");
    for required in &validator.required {
      self.channel.info(&format!("- {}", required));
    }
  }

  /// Asks for one argument. Returns `false` when the same argument must be asked again.
  fn collect_arg(&mut self, index: usize, option: &str) -> Result<bool, ClapiError> {
    let validator = &self.commands[index].validator;
    let answer = self
      .channel
      .ask(&format!("Enter value for {}: ", option))?;

    if answer.is_empty() {
      let already_supplied = self.tokens.iter().any(|t| split_token(t).0 == option);
      if validator.is_required(option) && !already_supplied {
        self.channel.error(&format!("{} is required.", option));
        return Ok(false);
      }
      return Ok(true);
    }

    if let Some(detail) = validator.detail(option) {
      if let Err(e) = check_value(detail, &answer) {
        self.channel.error(&e.to_string());
        return Ok(false);
      }
    }

    self.tokens.push(format!("{}={}", option, answer));
    Ok(true)
  }
}
