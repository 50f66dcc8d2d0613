// src/channel.rs
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input};
use log::trace;

use crate::error::ClapiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Info,
  Good,
  Warn,
  Error,
  Listing,
}

/// The single question/answer channel every prompt goes through, plus the
/// severity-tagged message sink for everything the user should see.
pub trait Channel {
  /// Blocks until the user supplies an answer.
  fn ask(&mut self, question: &str) -> Result<String, ClapiError>;

  fn show(&mut self, severity: Severity, message: &str);

  fn close(&mut self);

  fn info(&mut self, message: &str) {
    self.show(Severity::Info, message);
  }

  fn good(&mut self, message: &str) {
    self.show(Severity::Good, message);
  }

  fn warn(&mut self, message: &str) {
    self.show(Severity::Warn, message);
  }

  fn error(&mut self, message: &str) {
    self.show(Severity::Error, message);
  }
}

/// `Y`/`y` confirms; every other answer declines.
pub fn is_yes(answer: &str) -> bool {
  answer.trim().eq_ignore_ascii_case("y")
}

/// Prints a colorized message for the given severity. Errors go to stderr.
pub fn print_styled(severity: Severity, message: &str) {
  match severity {
    Severity::Info => println!("{}", message),
    Severity::Good => println!("{}", style(message).green()),
    Severity::Warn => println!("{}", style(message).yellow()),
    Severity::Error => eprintln!("{}", style(message).red()),
    Severity::Listing => println!("{}", style(message).cyan()),
  }
}

/// Terminal-backed channel. Uses dialoguer when attached to a TTY and falls
/// back to line-based stdin otherwise, so answers can be piped in.
pub struct TerminalChannel {
  interactive: bool,
  closed: bool,
}

impl TerminalChannel {
  pub fn new() -> Self {
    Self {
      interactive: Term::stdout().is_term() && Term::stderr().is_term(),
      closed: false,
    }
  }

  fn read_line(&self, question: &str) -> Result<String, ClapiError> {
    print!("{} ", style(question.trim_end()).yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
      return Err(ClapiError::ChannelClosed);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
  }
}

impl Default for TerminalChannel {
  fn default() -> Self {
    Self::new()
  }
}

impl Channel for TerminalChannel {
  fn ask(&mut self, question: &str) -> Result<String, ClapiError> {
    if self.closed {
      return Err(ClapiError::ChannelClosed);
    }
    let answer = if self.interactive {
      Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(question.trim_end())
        .allow_empty(true)
        .interact_text()?
    } else {
      self.read_line(question)?
    };
    trace!("Answer to {:?}: {:?}", question, answer);
    Ok(answer)
  }

  fn show(&mut self, severity: Severity, message: &str) {
    print_styled(severity, message);
  }

  fn close(&mut self) {
    self.closed = true;
  }
}

/// Replays a fixed sequence of answers and records everything shown.
/// Running out of answers behaves like the input stream closing.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
  answers: VecDeque<String>,
  pub questions: Vec<String>,
  pub messages: Vec<(Severity, String)>,
  pub closed: bool,
}

impl ScriptedChannel {
  pub fn new<I, S>(answers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      answers: answers.into_iter().map(Into::into).collect(),
      ..Self::default()
    }
  }

  pub fn remaining_answers(&self) -> usize {
    self.answers.len()
  }

  pub fn has_message(&self, severity: Severity, needle: &str) -> bool {
    self
      .messages
      .iter()
      .any(|(s, m)| *s == severity && m.contains(needle))
  }
}

impl Channel for ScriptedChannel {
  fn ask(&mut self, question: &str) -> Result<String, ClapiError> {
    self.questions.push(question.to_string());
    if self.closed {
      return Err(ClapiError::ChannelClosed);
    }
    self.answers.pop_front().ok_or(ClapiError::ChannelClosed)
  }

  fn show(&mut self, severity: Severity, message: &str) {
    self.messages.push((severity, message.to_string()));
  }

  fn close(&mut self) {
    self.closed = true;
  }
}
