// src/conflict.rs
use std::path::PathBuf;

use log::{debug, info};

use crate::args::{check_value, ArgValue, ParsedArgs};
use crate::channel::{is_yes, Channel};
use crate::error::ClapiError;
use crate::generate::FileIntent;
use crate::schema::ArgDetail;
use crate::utils::Workspace;

/// What the caller should do after conflicts are settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// Write the contents to this path.
  Write(PathBuf),
  /// Regenerate with these arguments (the user picked a new name).
  Retry(ParsedArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConflictState {
  DuplicateExists,
  DifferentExtensionExists,
  OfferRename,
  AskNewName,
}

pub struct ConflictResolver<'a, C: Channel + ?Sized> {
  channel: &'a mut C,
  workspace: &'a Workspace,
}

impl<'a, C: Channel + ?Sized> ConflictResolver<'a, C> {
  pub fn new(channel: &'a mut C, workspace: &'a Workspace) -> Self {
    Self { channel, workspace }
  }

  /// Settles a write of `intent`. `rename_arg` is the argument replaced when
  /// the user chooses a new name; a new name must satisfy `rename_detail`.
  ///
  /// Fatal outcomes close the channel and are returned for the caller to report.
  pub fn resolve(
    &mut self,
    intent: &FileIntent,
    args: &ParsedArgs,
    rename_arg: &str,
    rename_detail: Option<&ArgDetail>,
  ) -> Result<Resolution, ClapiError> {
    let target = intent.path();
    let sibling = intent.sibling_path();

    let mut state = if self.workspace.exists(&target) {
      ConflictState::DuplicateExists
    } else if intent.check_sibling && self.workspace.exists(&sibling) {
      ConflictState::DifferentExtensionExists
    } else {
      return Ok(Resolution::Write(target));
    };

    loop {
      debug!("Conflict state: {:?}", state);
      state = match state {
        ConflictState::DuplicateExists => {
          let answer = self.channel.ask(&format!(
            "The file {} already exists. Would you like to overwrite it? [Y/N] ",
            target.display()
          ))?;
          if is_yes(&answer) {
            return Ok(Resolution::Write(target));
          }
          ConflictState::OfferRename
        }
        ConflictState::DifferentExtensionExists => {
          let answer = self.channel.ask(&format!(
            "The file {} already exists with a different extension. Would you like to overwrite it? [Y/N] ",
            sibling.display()
          ))?;
          if !is_yes(&answer) {
            ConflictState::OfferRename
          } else {
            if let Err(e) = self.workspace.rename(&sibling, &target) {
              self.channel.close();
              return Err(e);
            }
            info!("Renamed {} to {}", sibling.display(), target.display());
            return Ok(Resolution::Write(target));
          }
        }
        ConflictState::OfferRename => {
          let answer = self
            .channel
            .ask("Would you like to rename the file you are currently generating? [Y/N] ")?;
          if is_yes(&answer) {
            ConflictState::AskNewName
          } else {
            self.channel.close();
            return Err(ClapiError::NamingConflict);
          }
        }
        ConflictState::AskNewName => {
          let answer = self.channel.ask("Please enter a new file name: ")?;
          let answer = answer.trim();
          if answer == intent.stem {
            self.channel.error(&ClapiError::DuplicateNameRejected.to_string());
          } else if answer.is_empty() {
            self.channel.error("Please enter a valid string.");
          } else {
            match rename_detail.map(|d| check_value(d, answer)).transpose() {
              Ok(value) => {
                let mut renamed = args.clone();
                renamed.insert(
                  rename_arg,
                  value.unwrap_or_else(|| ArgValue::Str(answer.to_string())),
                );
                return Ok(Resolution::Retry(renamed));
              }
              Err(e) => self.channel.error(&e.to_string()),
            }
          }
          ConflictState::AskNewName
        }
      };
    }
  }
}
