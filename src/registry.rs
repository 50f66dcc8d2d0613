// src/registry.rs
use std::fs;
use std::path::{Path, PathBuf};

use heck::ToPascalCase;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::ClapiError;
use crate::generate::GeneratorKind;
use crate::schema::Validator;

pub const DEFAULT_EXTENSION: &str = ".yaml";
const VALIDATOR_SUFFIX: &str = "Validator";

const BUILTIN_COMMANDS: &[(&str, &str)] = &[
  ("Route.yaml", include_str!("../commands/Route.yaml")),
  ("Server.yaml", include_str!("../commands/Server.yaml")),
];
const BUILTIN_VALIDATORS: &[(&str, &str)] = &[(
  "RouteValidator.yaml",
  include_str!("../validators/RouteValidator.yaml"),
)];

/// A command file: which generator to run, optionally with its validator inline.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CommandManifest {
  pub generator: GeneratorKind,
  #[serde(default)]
  pub validator: Option<Validator>,
}

/// A user-selectable generator paired with its argument schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
  /// Discovered name (the command file name without extension).
  pub name: String,
  pub generator: GeneratorKind,
  pub validator: Validator,
}

impl Command {
  /// Matches either the discovered name or the validator name, ignoring case.
  pub fn matches(&self, name: &str) -> bool {
    self.validator.name.eq_ignore_ascii_case(name) || self.name.eq_ignore_ascii_case(name)
  }
}

/// Result of a discovery pass. Commands that could not be loaded are dropped
/// and reported in `warnings`.
#[derive(Debug, Default)]
pub struct Discovery {
  pub commands: Vec<Command>,
  pub warnings: Vec<ClapiError>,
}

impl Discovery {
  pub fn log_warnings(&self) {
    for warning in &self.warnings {
      warn!("{}", warning);
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct ValidatorSearch<'a> {
  pub command_name: &'a str,
  pub validator_dir: Option<&'a Path>,
  pub ext: Option<&'a str>,
}

/// File name a command's validator is expected under, e.g. `RouteValidator.yaml`.
pub fn validator_file_name(command_name: &str, ext: &str) -> String {
  format!("{}{}{}", command_name, VALIDATOR_SUFFIX, ext)
}

pub fn find_command<'a>(commands: &'a [Command], name: &str) -> Option<&'a Command> {
  commands.iter().find(|c| c.matches(name))
}

fn parse_manifest(content: &str, path: &Path) -> Result<CommandManifest, ClapiError> {
  serde_yaml::from_str(content).map_err(|source| ClapiError::ManifestParse {
    path: path.to_path_buf(),
    source,
  })
}

fn parse_validator(content: &str, path: &Path) -> Result<Validator, ClapiError> {
  serde_yaml::from_str(content).map_err(|source| ClapiError::ManifestParse {
    path: path.to_path_buf(),
    source,
  })
}

fn read_file(path: &Path) -> Result<String, ClapiError> {
  fs::read_to_string(path).map_err(|source| ClapiError::ManifestRead {
    path: path.to_path_buf(),
    source,
  })
}

/// Looks for `{commandName}Validator{ext}` in the validator directory, also
/// trying the PascalCase form of the command name.
/// Defaults: `validators/` in the working directory and `.yaml`.
pub fn search_for_validator_by_convention(
  options: &ValidatorSearch<'_>,
) -> Result<Option<Validator>, ClapiError> {
  let validator_dir = options
    .validator_dir
    .map(Path::to_path_buf)
    .unwrap_or_else(|| PathBuf::from("validators"));
  let ext = options.ext.unwrap_or(DEFAULT_EXTENSION);

  let mut candidates = vec![options.command_name.to_string()];
  let pascal = options.command_name.to_pascal_case();
  if pascal != options.command_name {
    candidates.push(pascal);
  }

  for candidate in candidates {
    let path = validator_dir.join(validator_file_name(&candidate, ext));
    if path.is_file() {
      debug!("Found validator for '{}' at {}", options.command_name, path.display());
      let content = read_file(&path)?;
      return parse_validator(&content, &path).map(Some);
    }
    debug!("No validator at {}", path.display());
  }
  Ok(None)
}

fn finish_command(
  name: String,
  generator: GeneratorKind,
  validator: Option<Validator>,
  warnings: &mut Vec<ClapiError>,
) -> Option<Command> {
  let Some(validator) = validator else {
    warnings.push(ClapiError::NoValidatorFound { command: name });
    return None;
  };
  if let Err(e) = validator.check_consistency() {
    warnings.push(e);
    return None;
  }
  Some(Command {
    name,
    generator,
    validator,
  })
}

/// Discovers command files in `dir` with extension `ext`.
/// Each command takes its inline validator, or one found by naming convention
/// in `validator_dir` (default: `validators/` next to `dir`).
pub fn load_commands(
  dir: &Path,
  ext: &str,
  validator_dir: Option<&Path>,
) -> Result<Discovery, ClapiError> {
  if !dir.is_dir() {
    return Err(ClapiError::InvalidCommandPath(dir.to_path_buf()));
  }
  let default_validator_dir = dir
    .parent()
    .unwrap_or_else(|| Path::new("."))
    .join("validators");
  let validator_dir = validator_dir.unwrap_or(&default_validator_dir);

  let mut discovery = Discovery::default();
  let walker = WalkDir::new(dir)
    .min_depth(1)
    .max_depth(1)
    .sort_by_file_name();

  for entry_result in walker {
    let entry = match entry_result {
      Ok(e) => e,
      Err(e) => {
        warn!("Failed to read entry in commands directory: {}", e);
        continue;
      }
    };
    if !entry.file_type().is_file() {
      continue;
    }
    let file_name = entry.file_name().to_string_lossy().to_string();
    // Declaration files sit next to command files and are never commands.
    if file_name.contains(".d.") {
      continue;
    }
    let Some(name) = file_name.strip_suffix(ext).filter(|n| !n.is_empty()) else {
      debug!("Skipping {}: extension is not {}", file_name, ext);
      continue;
    };

    let manifest = match read_file(entry.path()).and_then(|c| parse_manifest(&c, entry.path())) {
      Ok(m) => m,
      Err(e) => {
        discovery.warnings.push(e);
        continue;
      }
    };

    let validator = match manifest.validator {
      Some(v) => Some(v),
      None => {
        let search = ValidatorSearch {
          command_name: name,
          validator_dir: Some(validator_dir),
          ext: Some(ext),
        };
        match search_for_validator_by_convention(&search) {
          Ok(v) => v,
          Err(e) => {
            discovery.warnings.push(e);
            continue;
          }
        }
      }
    };

    if let Some(command) =
      finish_command(name.to_string(), manifest.generator, validator, &mut discovery.warnings)
    {
      debug!("Loaded command '{}' ({})", command.name, command.validator.name);
      discovery.commands.push(command);
    }
  }

  Ok(discovery)
}

/// Second pass: replaces each command's validator with
/// `{CommandName}Validator{ext}` from `validator_dir`. Commands without one
/// are removed and reported.
pub fn load_command_validators(
  validator_dir: &Path,
  commands: &mut Vec<Command>,
  ext: &str,
) -> Result<Vec<ClapiError>, ClapiError> {
  if !validator_dir.is_dir() {
    return Err(ClapiError::InvalidValidatorsPath(validator_dir.to_path_buf()));
  }

  let mut warnings = Vec::new();
  let mut kept = Vec::with_capacity(commands.len());
  for mut command in commands.drain(..) {
    let search = ValidatorSearch {
      command_name: &command.name,
      validator_dir: Some(validator_dir),
      ext: Some(ext),
    };
    match search_for_validator_by_convention(&search) {
      Ok(Some(validator)) => match validator.check_consistency() {
        Ok(()) => {
          command.validator = validator;
          kept.push(command);
        }
        Err(e) => warnings.push(e),
      },
      Ok(None) => warnings.push(ClapiError::NoValidatorFound {
        command: command.name.clone(),
      }),
      Err(e) => warnings.push(e),
    }
  }
  *commands = kept;
  Ok(warnings)
}

/// The commands shipped with the binary.
pub fn builtin_commands() -> Result<Discovery, ClapiError> {
  let mut discovery = Discovery::default();
  for (file_name, content) in BUILTIN_COMMANDS {
    let path = Path::new("commands").join(file_name);
    let manifest = parse_manifest(content, &path)?;
    let name = file_name.trim_end_matches(DEFAULT_EXTENSION).to_string();

    let validator = match manifest.validator {
      Some(v) => Some(v),
      None => {
        let expected = validator_file_name(&name, DEFAULT_EXTENSION);
        BUILTIN_VALIDATORS
          .iter()
          .find(|(f, _)| *f == expected)
          .map(|(f, c)| parse_validator(c, &Path::new("validators").join(f)))
          .transpose()?
      }
    };

    if let Some(command) = finish_command(name, manifest.generator, validator, &mut discovery.warnings) {
      discovery.commands.push(command);
    }
  }
  Ok(discovery)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  const VALIDATOR: &str = "name: widget\navailable: [name]\nrequired: [name]\nminArgs: 1\nmaxArgs: 1\n";

  fn layout() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let commands = dir.path().join("commands");
    let validators = dir.path().join("validators");
    fs::create_dir_all(&commands).unwrap();
    fs::create_dir_all(&validators).unwrap();
    (dir, commands, validators)
  }

  #[test]
  fn builtins_load_route_and_server() {
    let discovery = builtin_commands().unwrap();
    assert!(discovery.warnings.is_empty());
    let names: Vec<_> = discovery.commands.iter().map(|c| c.validator.name.as_str()).collect();
    assert_eq!(names, vec!["route", "http-server"]);
    assert!(find_command(&discovery.commands, "route").is_some());
    assert!(find_command(&discovery.commands, "Server").is_some());
    assert!(find_command(&discovery.commands, "http-server").is_some());
    assert!(find_command(&discovery.commands, "client").is_none());
  }

  #[test]
  fn missing_commands_dir_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = load_commands(&dir.path().join("nope"), ".yaml", None).unwrap_err();
    assert!(matches!(err, ClapiError::InvalidCommandPath(_)));
  }

  #[test]
  fn resolves_inline_and_conventional_validators_and_drops_the_rest() {
    let (_dir, commands, validators) = layout();
    fs::write(commands.join("Widget.yaml"), "generator: route\n").unwrap();
    fs::write(validators.join("WidgetValidator.yaml"), VALIDATOR).unwrap();
    fs::write(
      commands.join("Inline.yaml"),
      format!("generator: http-server\nvalidator:\n  {}", VALIDATOR.replace('\n', "\n  ").replace("widget", "inline")),
    )
    .unwrap();
    fs::write(commands.join("Orphan.yaml"), "generator: route\n").unwrap();
    fs::write(commands.join("types.d.yaml"), "generator: route\n").unwrap();
    fs::write(commands.join("README.md"), "ignored").unwrap();

    let discovery = load_commands(&commands, ".yaml", None).unwrap();
    let names: Vec<_> = discovery.commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Inline", "Widget"]);
    assert_eq!(discovery.commands[0].validator.name, "inline");
    assert_eq!(discovery.commands[0].generator, GeneratorKind::HttpServer);
    assert_eq!(discovery.warnings.len(), 1);
    assert!(matches!(
      &discovery.warnings[0],
      ClapiError::NoValidatorFound { command } if command == "Orphan"
    ));
  }

  #[test]
  fn convention_accepts_pascal_case_validator_names() {
    let (_dir, _commands, validators) = layout();
    fs::write(validators.join("WidgetValidator.yaml"), VALIDATOR).unwrap();
    let found = search_for_validator_by_convention(&ValidatorSearch {
      command_name: "widget",
      validator_dir: Some(&validators),
      ext: None,
    })
    .unwrap();
    assert_eq!(found.unwrap().name, "widget");
  }

  #[test]
  fn inconsistent_validator_is_excluded_with_a_warning() {
    let (_dir, commands, validators) = layout();
    fs::write(commands.join("Bad.yaml"), "generator: route\n").unwrap();
    fs::write(
      validators.join("BadValidator.yaml"),
      "name: bad\navailable: [name]\nrequired: [port]\nminArgs: 0\nmaxArgs: 1\n",
    )
    .unwrap();
    let discovery = load_commands(&commands, ".yaml", Some(&validators)).unwrap();
    assert!(discovery.commands.is_empty());
    assert!(matches!(discovery.warnings[0], ClapiError::InvalidValidator { .. }));
  }

  #[test]
  fn second_pass_replaces_or_removes() {
    let (_dir, _commands, validators) = layout();
    fs::write(validators.join("RouteValidator.yaml"), VALIDATOR).unwrap();
    let mut commands = builtin_commands().unwrap().commands;

    let warnings = load_command_validators(&validators, &mut commands, ".yaml").unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].name, "Route");
    assert_eq!(commands[0].validator.name, "widget");
    assert!(matches!(
      &warnings[0],
      ClapiError::NoValidatorFound { command } if command == "Server"
    ));
  }

  #[test]
  fn second_pass_requires_existing_directory() {
    let dir = TempDir::new().unwrap();
    let mut commands = Vec::new();
    let err = load_command_validators(&dir.path().join("missing"), &mut commands, ".yaml").unwrap_err();
    assert!(matches!(err, ClapiError::InvalidValidatorsPath(_)));
  }
}
