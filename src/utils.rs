use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::error::ClapiError;

/// Filesystem access rooted at the directory the tool operates in.
/// Relative paths are resolved against the root; absolute paths are used as-is.
#[derive(Debug, Clone)]
pub struct Workspace {
  root: PathBuf,
}

impl Workspace {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn current() -> Result<Self, ClapiError> {
    Ok(Self::new(env::current_dir()?))
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  pub fn exists(&self, path: &Path) -> bool {
    self.resolve(path).exists()
  }

  /// Creates the directory (and any missing parents) when absent.
  pub fn ensure_dir(&self, path: &Path) -> Result<(), ClapiError> {
    let full = self.resolve(path);
    if full.is_dir() {
      return Ok(());
    }
    trace!("Creating directory: {}", full.display());
    fs::create_dir_all(&full).map_err(|source| ClapiError::FileOperationFailed {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn write(&self, path: &Path, contents: &str) -> Result<(), ClapiError> {
    let full = self.resolve(path);
    debug!("Writing {} bytes to {}", contents.len(), full.display());
    fs::write(&full, contents).map_err(|source| ClapiError::FileOperationFailed {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn rename(&self, from: &Path, to: &Path) -> Result<(), ClapiError> {
    debug!("Renaming {} -> {}", from.display(), to.display());
    fs::rename(self.resolve(from), self.resolve(to)).map_err(|source| {
      ClapiError::FileOperationFailed {
        path: from.to_path_buf(),
        source,
      }
    })
  }

  pub fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
    fs::read_to_string(self.resolve(path))
  }
}

/// Replaces every `{key}` occurrence with its value.
pub fn substitute_placeholders(content: &str, substitutions: &HashMap<&str, String>) -> String {
  let mut current_content = content.to_string();
  for (key, value) in substitutions {
    let placeholder = format!("{{{}}}", key);
    current_content = current_content.replace(&placeholder, value);
  }
  current_content
}
