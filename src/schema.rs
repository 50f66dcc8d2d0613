// src/schema.rs
use serde::{Deserialize, Serialize};

use crate::error::ClapiError;

/// How a raw `key=value` string is coerced once it is parsed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TreatedAs {
  #[default]
  String,
  Boolean,
  Number,
  Array,
}

impl TreatedAs {
  pub fn as_str(&self) -> &'static str {
    match self {
      TreatedAs::String => "string",
      TreatedAs::Boolean => "boolean",
      TreatedAs::Number => "number",
      TreatedAs::Array => "array",
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct ArgDetail {
  pub name: String,
  pub description: String,
  #[serde(default)]
  pub treated_as: TreatedAs,
  /// Optional regex an interactive answer must match.
  #[serde(default)]
  pub pattern: Option<String>,
}

/// Declarative argument schema for a single command.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
  /// Canonical command identifier, matched against the invocation modifier.
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  /// Accepted argument names, in prompting order.
  pub available: Vec<String>,
  #[serde(default)]
  pub required: Vec<String>,
  pub min_args: usize,
  pub max_args: usize,
  #[serde(default)]
  pub arg_details: Vec<ArgDetail>,
}

impl Validator {
  pub fn detail(&self, name: &str) -> Option<&ArgDetail> {
    self.arg_details.iter().find(|d| d.name == name)
  }

  pub fn is_required(&self, name: &str) -> bool {
    self.required.iter().any(|r| r == name)
  }

  pub fn is_available(&self, name: &str) -> bool {
    self.available.iter().any(|a| a == name)
  }

  /// Every required name and every detailed name must be declared in `available`.
  pub fn check_consistency(&self) -> Result<(), ClapiError> {
    let invalid = |reason: String| ClapiError::InvalidValidator {
      validator: self.name.clone(),
      reason,
    };

    if self.name.trim().is_empty() {
      return Err(invalid("name must not be empty".to_string()));
    }
    if self.min_args > self.max_args {
      return Err(invalid(format!(
        "minArgs ({}) is greater than maxArgs ({})",
        self.min_args, self.max_args
      )));
    }
    if let Some(req) = self.required.iter().find(|r| !self.is_available(r)) {
      return Err(invalid(format!(
        "required argument '{}' is not listed in available",
        req
      )));
    }
    if let Some(detail) = self.arg_details.iter().find(|d| !self.is_available(&d.name)) {
      return Err(invalid(format!(
        "argDetails entry '{}' is not listed in available",
        detail.name
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ROUTE_YAML: &str = r#"
name: route
available: [name, path, includeTypes]
required: [name]
minArgs: 1
maxArgs: 3
argDetails:
  - name: name
    description: Export function name and file name.
  - name: includeTypes
    description: Include types.
    treatedAs: boolean
"#;

  #[test]
  fn deserializes_camel_case_schema() {
    let validator: Validator = serde_yaml::from_str(ROUTE_YAML).unwrap();
    assert_eq!(validator.name, "route");
    assert_eq!(validator.available, vec!["name", "path", "includeTypes"]);
    assert_eq!(validator.max_args, 3);
    assert_eq!(validator.detail("name").unwrap().treated_as, TreatedAs::String);
    assert_eq!(
      validator.detail("includeTypes").unwrap().treated_as,
      TreatedAs::Boolean
    );
    assert!(validator.detail("path").is_none());
    assert!(validator.check_consistency().is_ok());
  }

  #[test]
  fn required_outside_available_is_rejected() {
    let mut validator: Validator = serde_yaml::from_str(ROUTE_YAML).unwrap();
    validator.required.push("port".to_string());
    let err = validator.check_consistency().unwrap_err();
    assert!(matches!(err, ClapiError::InvalidValidator { .. }));
    assert!(err.to_string().contains("'port'"));
  }

  #[test]
  fn detail_outside_available_is_rejected() {
    let mut validator: Validator = serde_yaml::from_str(ROUTE_YAML).unwrap();
    validator.arg_details.push(ArgDetail {
      name: "lang".to_string(),
      description: String::new(),
      treated_as: TreatedAs::String,
      pattern: None,
    });
    assert!(validator.check_consistency().is_err());
  }

  #[test]
  fn unknown_fields_fail_to_parse() {
    let yaml = format!("{}\nextra: 1\n", ROUTE_YAML);
    assert!(serde_yaml::from_str::<Validator>(&yaml).is_err());
  }
}
