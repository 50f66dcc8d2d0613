//! End-to-end generation scenarios against a temporary workspace.
//!
//! Each test drives the dispatcher with a scripted channel, so the full flow
//! (parse, validate, config merge, conflict resolution, write) runs exactly as
//! it does from the terminal.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use clapi::args::Invocation;
use clapi::channel::{ScriptedChannel, Severity};
use clapi::config::CONFIG_FILE;
use clapi::dispatch::CommandDispatcher;
use clapi::error::ClapiError;
use clapi::registry::{builtin_commands, Command};
use clapi::utils::Workspace;

// =============================================================================
// Fixtures
// =============================================================================

struct TestWorkspace {
  dir: TempDir,
  workspace: Workspace,
  commands: Vec<Command>,
}

impl TestWorkspace {
  fn new() -> Self {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workspace = Workspace::new(dir.path());
    let commands = builtin_commands().expect("built-in commands").commands;
    Self {
      dir,
      workspace,
      commands,
    }
  }

  fn with_config(self, json: &str) -> Self {
    fs::write(self.dir.path().join(CONFIG_FILE), json).expect("write config");
    self
  }

  fn with_file(self, relative: &str, contents: &str) -> Self {
    let path = self.dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
    self
  }

  fn read(&self, relative: &str) -> String {
    fs::read_to_string(self.dir.path().join(relative)).expect("generated file")
  }

  fn exists(&self, relative: &str) -> bool {
    self.dir.path().join(relative).exists()
  }

  fn run(
    &self,
    command: &str,
    tokens: &[&str],
    channel: &mut ScriptedChannel,
  ) -> Result<PathBuf, ClapiError> {
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    CommandDispatcher::new(&self.workspace).run_named(
      &self.commands,
      Some(command),
      &tokens,
      &Invocation::default(),
      channel,
    )
  }
}

fn silent() -> ScriptedChannel {
  ScriptedChannel::new(Vec::<String>::new())
}

// =============================================================================
// Route generation
// =============================================================================

#[test]
fn route_without_config_writes_untyped_js() {
  let ws = TestWorkspace::new();
  let mut channel = silent();

  let path = ws.run("route", &["name=widgets"], &mut channel).unwrap();

  assert_eq!(path, Path::new("src/routes/widgets.js"));
  let contents = ws.read("src/routes/widgets.js");
  assert!(!contents.contains("{name}"));
  assert!(contents.contains("export const widgets = (router) =>"));
  assert!(!contents.contains("import"));
  assert!(channel.closed);
}

#[test]
fn route_with_include_types_writes_ts() {
  let ws = TestWorkspace::new();
  let mut channel = silent();

  ws.run("route", &["name=widgets", "includeTypes=true"], &mut channel)
    .unwrap();

  assert!(!ws.exists("src/routes/widgets.js"));
  let contents = ws.read("src/routes/widgets.ts");
  assert!(contents.contains("import { type NextFunction, type Request, type Response, type Router } from 'express';"));
}

#[test]
fn config_fills_include_types_and_user_can_override_it() {
  let ws = TestWorkspace::new().with_config(r#"{"lang":"js","includeTypes":true}"#);

  ws.run("route", &["name=orders"], &mut silent()).unwrap();
  assert!(ws.read("src/routes/orders.ts").contains("type Router"));

  ws.run("route", &["name=invoices", "includeTypes=false"], &mut silent())
    .unwrap();
  assert!(!ws.exists("src/routes/invoices.ts"));
  assert!(!ws.read("src/routes/invoices.js").contains("type Router"));
}

#[test]
fn output_directory_precedence() {
  let ws = TestWorkspace::new().with_config(r#"{"lang":"js","routeDir":"api/routes"}"#);

  let configured = ws.run("route", &["name=a"], &mut silent()).unwrap();
  assert_eq!(configured, Path::new("api/routes/a.js"));

  let explicit = ws.run("route", &["name=b", "path=lib"], &mut silent()).unwrap();
  assert_eq!(explicit, Path::new("lib/b.js"));
  assert!(ws.exists("lib/b.js"));
}

#[test]
fn config_without_lang_is_fatal() {
  let ws = TestWorkspace::new().with_config(r#"{"includeTypes":true}"#);
  let err = ws.run("route", &["name=a"], &mut silent()).unwrap_err();
  assert!(matches!(err, ClapiError::ConfigParse { .. }));
}

// =============================================================================
// Conflict resolution
// =============================================================================

#[test]
fn overwrite_replaces_existing_file() {
  let ws = TestWorkspace::new().with_file("src/routes/widgets.js", "old");
  let mut channel = ScriptedChannel::new(["Y"]);

  let path = ws.run("route", &["name=widgets"], &mut channel).unwrap();

  assert_eq!(path, Path::new("src/routes/widgets.js"));
  assert!(ws.read("src/routes/widgets.js").contains("export const widgets"));
  assert!(!ws.exists("src/routes/newName.js"));
}

#[test]
fn rename_leaves_original_untouched() {
  let ws = TestWorkspace::new().with_file("src/routes/widgets.js", "old");
  let mut channel = ScriptedChannel::new(["N", "Y", "newName"]);

  let path = ws.run("route", &["name=widgets"], &mut channel).unwrap();

  assert_eq!(path, Path::new("src/routes/newName.js"));
  assert_eq!(ws.read("src/routes/widgets.js"), "old");
  assert!(ws.read("src/routes/newName.js").contains("export const newName"));
}

#[test]
fn different_extension_is_moved_then_overwritten() {
  let ws = TestWorkspace::new().with_file("src/routes/widgets.js", "old");
  let mut channel = ScriptedChannel::new(["Y"]);

  let path = ws
    .run("route", &["name=widgets", "includeTypes=true"], &mut channel)
    .unwrap();

  assert_eq!(path, Path::new("src/routes/widgets.ts"));
  assert!(!ws.exists("src/routes/widgets.js"));
  assert!(ws.read("src/routes/widgets.ts").contains("type Router"));
}

#[test]
fn refusing_both_overwrite_and_rename_aborts() {
  let ws = TestWorkspace::new().with_file("src/routes/widgets.js", "old");
  let mut channel = ScriptedChannel::new(["n", "n"]);

  let err = ws.run("route", &["name=widgets"], &mut channel).unwrap_err();

  assert!(matches!(err, ClapiError::NamingConflict));
  assert!(channel.closed);
  assert!(!channel.has_message(Severity::Error, "Closing due to naming conflict"));
  assert_eq!(ws.read("src/routes/widgets.js"), "old");
}

#[cfg(feature = "regex")]
#[test]
fn renamed_file_name_must_match_name_pattern() {
  let ws = TestWorkspace::new().with_file("src/routes/widgets.js", "old");
  let mut channel = ScriptedChannel::new(["n", "y", "my route", "../../outside", "orders"]);

  let path = ws.run("route", &["name=widgets"], &mut channel).unwrap();

  assert_eq!(path, Path::new("src/routes/orders.js"));
  assert!(channel.has_message(Severity::Error, "'my route' is not a valid"));
  assert!(channel.has_message(Severity::Error, "'../../outside' is not a valid"));
  assert!(!ws.exists("src/routes/my route.js"));
  assert!(!ws.exists("outside.js"));
}

// =============================================================================
// Server generation
// =============================================================================

#[test]
fn server_uses_default_name_and_port() {
  let ws = TestWorkspace::new();

  let path = ws
    .run("http-server", &["defaultPort=4001", "includeErrorHandling=true"], &mut silent())
    .unwrap();

  assert_eq!(path, Path::new("src/servers/server.js"));
  let contents = ws.read("src/servers/server.js");
  assert!(contents.contains("process.env.APP_PORT ?? 4001"));
  assert!(contents.contains("app.use(httpErrorHandler);"));
}

#[test]
fn server_rename_targets_new_file() {
  let ws = TestWorkspace::new().with_file("src/servers/server.js", "old");
  let mut channel = ScriptedChannel::new(["n", "y", "api"]);

  let path = ws.run("http-server", &["defaultPort=80"], &mut channel).unwrap();

  assert_eq!(path, Path::new("src/servers/api.js"));
  assert_eq!(ws.read("src/servers/server.js"), "old");
}

// =============================================================================
// Validation failures
// =============================================================================

#[test]
fn validation_failures_write_nothing() {
  let ws = TestWorkspace::new();

  let err = ws.run("route", &["path=lib"], &mut silent()).unwrap_err();
  assert!(matches!(err, ClapiError::MissingRequiredArguments { .. }));

  let err = ws.run("route", &["name=a", "port=1"], &mut silent()).unwrap_err();
  assert!(matches!(err, ClapiError::IllegalCommandArguments { .. }));

  let err = ws.run("http-server", &["defaultPort=abc"], &mut silent()).unwrap_err();
  assert!(matches!(err, ClapiError::InvalidArgumentValue { .. }));

  assert!(!ws.exists("src"));
  assert!(!ws.exists("lib"));
}

#[cfg(feature = "regex")]
#[test]
fn flag_name_must_match_name_pattern() {
  let ws = TestWorkspace::new();

  for bad in ["name=../../escaped", "name=my route"] {
    let err = ws.run("route", &[bad], &mut silent()).unwrap_err();
    assert!(
      matches!(err, ClapiError::InvalidArgumentValue { ref name, .. } if name == "name"),
      "{bad}: {err:?}"
    );
  }
  let err = ws
    .run("http-server", &["defaultPort=80", "name=../srv"], &mut silent())
    .unwrap_err();
  assert!(matches!(err, ClapiError::InvalidArgumentValue { .. }));

  assert!(!ws.exists("src"));
  assert!(!ws.exists("escaped.js"));
}
