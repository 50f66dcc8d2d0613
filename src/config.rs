// src/config.rs
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::args::{ArgValue, ParsedArgs};
use crate::error::ClapiError;
use crate::utils::Workspace;

pub const CONFIG_FILE: &str = "clapi.config.json";

pub const INCLUDE_TYPES_ARG: &str = "includeTypes";
pub const LANG_ARG: &str = "lang";
pub const PATH_ARG: &str = "path";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
  Ts,
  #[default]
  Js,
}

impl Lang {
  pub fn as_str(&self) -> &'static str {
    match self {
      Lang::Ts => "ts",
      Lang::Js => "js",
    }
  }

  pub fn opposite(&self) -> Lang {
    match self {
      Lang::Ts => Lang::Js,
      Lang::Js => Lang::Ts,
    }
  }

  pub fn parse(value: &str) -> Option<Lang> {
    match value {
      "ts" => Some(Lang::Ts),
      "js" => Some(Lang::Js),
      _ => None,
    }
  }
}

impl fmt::Display for Lang {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Contents of `clapi.config.json`. Unknown keys are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClapiConfig {
  pub lang: Lang,
  #[serde(default)]
  pub include_types: Option<bool>,
  #[serde(default)]
  pub route_dir: Option<PathBuf>,
  #[serde(default)]
  pub server_dir: Option<PathBuf>,
}

impl ClapiConfig {
  pub fn from_json(content: &str, path: &Path) -> Result<Self, ClapiError> {
    serde_json::from_str(content).map_err(|source| ClapiError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Reads the workspace config file, if there is one.
pub fn load_config(workspace: &Workspace) -> Result<Option<ClapiConfig>, ClapiError> {
  let path = Path::new(CONFIG_FILE);
  if !workspace.exists(path) {
    debug!("No {} found in {}", CONFIG_FILE, workspace.root().display());
    return Ok(None);
  }
  let content = workspace
    .read_to_string(path)
    .map_err(|source| ClapiError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
  let config = ClapiConfig::from_json(&content, path)?;
  debug!("Loaded config: {:?}", config);
  Ok(Some(config))
}

/// Fills `includeTypes` and `lang` from the config. Values the user supplied win.
pub fn apply_config(args: &mut ParsedArgs, config: Option<&ClapiConfig>) {
  let Some(config) = config else {
    return;
  };
  args.insert_default(
    INCLUDE_TYPES_ARG,
    ArgValue::Bool(config.include_types.unwrap_or(false)),
  );
  args.insert_default(LANG_ARG, ArgValue::Str(config.lang.as_str().to_string()));
}

/// Language settings resolved from merged arguments, falling back to tool defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClapiMeta {
  pub include_types: bool,
  pub lang: Lang,
}

impl ClapiMeta {
  pub fn from_args(args: &ParsedArgs) -> Self {
    let include_types = match args.get(INCLUDE_TYPES_ARG) {
      Some(ArgValue::Bool(b)) => *b,
      Some(ArgValue::Str(s)) => s == "true",
      _ => false,
    };
    let lang = args
      .get_str(LANG_ARG)
      .and_then(Lang::parse)
      .unwrap_or_default();
    Self {
      include_types,
      lang,
    }
  }

  /// Typed output is always TypeScript; otherwise the configured language.
  pub fn extension(&self) -> Lang {
    if self.include_types {
      Lang::Ts
    } else {
      self.lang
    }
  }
}

/// `path` argument, then the config directory, then the built-in default.
pub fn resolve_output_dir(
  args: &ParsedArgs,
  configured: Option<&Path>,
  default_dir: &str,
) -> PathBuf {
  if let Some(path) = args.get_str(PATH_ARG).filter(|p| !p.trim().is_empty()) {
    return PathBuf::from(path);
  }
  configured
    .map(Path::to_path_buf)
    .unwrap_or_else(|| PathBuf::from(default_dir))
}
