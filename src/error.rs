// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClapiError {
  #[error("IO Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("InvalidCommand: Missing keyword 'clapi:'")]
  InvalidKeyword,

  #[error("InvalidModifierName: Ensure the command modifier is correct. Received: '{provided}'. Expected '{expected}'.")]
  InvalidModifierName { provided: String, expected: String },

  #[error("MaxArgumentExceeded: Max args for the {command} command is {max}")]
  MaxArgumentExceeded { command: String, max: usize },

  #[error("MinArgumentsRequired: Min args for the {command} command is {min}")]
  MinArgumentExceeded { command: String, min: usize },

  #[error("IllegalCommandArguments: Received {}. Expected {}.", .received.join(", "), .available.join(", "))]
  IllegalCommandArguments {
    received: Vec<String>,
    available: Vec<String>,
  },

  #[error("MissingRequiredArguments: Received {}. Expected {}. You are missing {}", .received.join(", "), .required.join(", "), .missing.join(", "))]
  MissingRequiredArguments {
    received: Vec<String>,
    required: Vec<String>,
    missing: Vec<String>,
  },

  #[error("InvalidArgumentValue: '{value}' is not a valid {expected} for argument '{name}'")]
  InvalidArgumentValue {
    name: String,
    value: String,
    expected: String,
  },

  #[error("CommandsPathError: Commands path {0} does not exists.")]
  InvalidCommandPath(PathBuf),

  #[error("InvalidValidatorsPathError: Validators path {0} does not exists.")]
  InvalidValidatorsPath(PathBuf),

  #[error("No validator found for {command} command, excluding from Commands selection.")]
  NoValidatorFound { command: String },

  #[error("Validator '{validator}' is inconsistent: {reason}")]
  InvalidValidator { validator: String, reason: String },

  #[error("Could not read command manifest '{path}': {source}")]
  ManifestRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not parse command manifest '{path}': {source}")]
  ManifestParse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Could not read config file '{path}': {source}")]
  ConfigRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Could not parse config file '{path}': {source}")]
  ConfigParse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Command '{0}' not found.")]
  CommandNotFound(String),

  #[error("No commands available.")]
  NoCommands,

  #[error("File operation failed on '{path}': {source}")]
  FileOperationFailed {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Closing due to naming conflict.")]
  NamingConflict,

  #[error("Cannot be the same name.")]
  DuplicateNameRejected,

  #[error("Input channel closed before an answer was received.")]
  ChannelClosed,

  #[error("User interaction failed: {0}")]
  DialoguerError(#[from] dialoguer::Error),
}
