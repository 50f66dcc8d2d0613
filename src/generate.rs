// src/generate.rs
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::args::ParsedArgs;
use crate::config::{resolve_output_dir, ClapiConfig, ClapiMeta, Lang};
use crate::error::ClapiError;
use crate::utils::substitute_placeholders;

const ROUTE_TEMPLATE: &str = include_str!("../templates/route.js.tmpl");
const TS_ROUTE_TEMPLATE: &str = include_str!("../templates/route.ts.tmpl");
const SERVER_TEMPLATE: &str = include_str!("../templates/server.js.tmpl");
const TS_SERVER_TEMPLATE: &str = include_str!("../templates/server.ts.tmpl");

const ERROR_HANDLER_IMPORT: &str = "import { httpErrorHandler } from './httpErrorHandling';\n";
const ERROR_HANDLER_USE: &str = "\n// Handle HTTP errors\napp.use(httpErrorHandler);\n";

pub const NAME_ARG: &str = "name";
pub const DEFAULT_PORT_ARG: &str = "defaultPort";
pub const ERROR_HANDLING_ARG: &str = "includeErrorHandling";

const DEFAULT_SERVER_NAME: &str = "server";

/// The built-in generators a command manifest can point at.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorKind {
  Route,
  HttpServer,
}

impl fmt::Display for GeneratorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GeneratorKind::Route => f.pad("route"),
      GeneratorKind::HttpServer => f.pad("http-server"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParams {
  pub name: String,
  pub include_types: bool,
  pub default_port: Option<i64>,
  pub include_error_handling: bool,
}

/// Produces the boilerplate text for a generator.
pub fn render_template(kind: GeneratorKind, params: &TemplateParams) -> String {
  let template = match (kind, params.include_types) {
    (GeneratorKind::Route, false) => ROUTE_TEMPLATE,
    (GeneratorKind::Route, true) => TS_ROUTE_TEMPLATE,
    (GeneratorKind::HttpServer, false) => SERVER_TEMPLATE,
    (GeneratorKind::HttpServer, true) => TS_SERVER_TEMPLATE,
  };

  let mut substitutions: HashMap<&str, String> = HashMap::new();
  substitutions.insert("name", params.name.clone());
  if kind == GeneratorKind::HttpServer {
    let port = params
      .default_port
      .map(|p| p.to_string())
      .unwrap_or_else(|| "undefined".to_string());
    substitutions.insert("defaultPort", port);
    let (import, usage) = if params.include_error_handling {
      (ERROR_HANDLER_IMPORT, ERROR_HANDLER_USE)
    } else {
      ("", "")
    };
    substitutions.insert("errorHandlerImport", import.to_string());
    substitutions.insert("errorHandlerUse", usage.to_string());
  }

  substitute_placeholders(template, &substitutions)
}

/// A generated file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIntent {
  pub dir: PathBuf,
  pub stem: String,
  pub ext: Lang,
  pub contents: String,
  /// Also treat `stem.<other ext>` as a conflict.
  pub check_sibling: bool,
}

impl FileIntent {
  pub fn path(&self) -> PathBuf {
    self.dir.join(format!("{}.{}", self.stem, self.ext))
  }

  pub fn sibling_path(&self) -> PathBuf {
    self.dir.join(format!("{}.{}", self.stem, self.ext.opposite()))
  }
}

impl GeneratorKind {
  pub fn default_dir(&self) -> &'static str {
    match self {
      GeneratorKind::Route => "src/routes",
      GeneratorKind::HttpServer => "src/servers",
    }
  }

  pub fn configured_dir<'a>(&self, config: Option<&'a ClapiConfig>) -> Option<&'a Path> {
    let config = config?;
    match self {
      GeneratorKind::Route => config.route_dir.as_deref(),
      GeneratorKind::HttpServer => config.server_dir.as_deref(),
    }
  }

  /// The name argument this generator renames on a conflict.
  pub fn rename_arg(&self) -> &'static str {
    NAME_ARG
  }

  pub fn file_stem(&self, args: &ParsedArgs) -> Result<String, ClapiError> {
    match self {
      GeneratorKind::Route => args
        .get_str(NAME_ARG)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| missing(args, NAME_ARG)),
      GeneratorKind::HttpServer => Ok(
        args
          .get_str(NAME_ARG)
          .filter(|n| !n.is_empty())
          .unwrap_or(DEFAULT_SERVER_NAME)
          .to_string(),
      ),
    }
  }

  /// Resolves the target file and renders its contents from merged arguments.
  pub fn plan(&self, args: &ParsedArgs, config: Option<&ClapiConfig>) -> Result<FileIntent, ClapiError> {
    let meta = ClapiMeta::from_args(args);
    let stem = self.file_stem(args)?;
    let dir = resolve_output_dir(args, self.configured_dir(config), self.default_dir());

    let default_port = match self {
      GeneratorKind::HttpServer => Some(
        args
          .get_number(DEFAULT_PORT_ARG)
          .ok_or_else(|| missing(args, DEFAULT_PORT_ARG))?,
      ),
      GeneratorKind::Route => None,
    };

    let params = TemplateParams {
      name: stem.clone(),
      include_types: meta.include_types,
      default_port,
      include_error_handling: args.get_bool(ERROR_HANDLING_ARG).unwrap_or(false),
    };
    debug!("Rendering {} template with {:?}", self, params);

    Ok(FileIntent {
      dir,
      stem,
      ext: meta.extension(),
      contents: render_template(*self, &params),
      check_sibling: *self == GeneratorKind::Route,
    })
  }
}

fn missing(args: &ParsedArgs, name: &str) -> ClapiError {
  ClapiError::MissingRequiredArguments {
    received: args.keys(),
    required: vec![name.to_string()],
    missing: vec![name.to_string()],
  }
}
