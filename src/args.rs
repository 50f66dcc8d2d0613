// src/args.rs
use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace};
#[cfg(feature = "regex")]
use log::warn;
#[cfg(feature = "regex")]
use regex::Regex;

use crate::error::ClapiError;
use crate::schema::{ArgDetail, TreatedAs, Validator};

pub const KEYWORD_PREFIX: &str = "clapi";

/// A single argument value after `treatedAs` coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
  Str(String),
  Bool(bool),
  Number(i64),
  List(Vec<String>),
}

impl ArgValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      ArgValue::Str(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      ArgValue::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<i64> {
    match self {
      ArgValue::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[String]> {
    match self {
      ArgValue::List(items) => Some(items),
      _ => None,
    }
  }
}

impl fmt::Display for ArgValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArgValue::Str(s) => f.write_str(s),
      ArgValue::Bool(b) => write!(f, "{}", b),
      ArgValue::Number(n) => write!(f, "{}", n),
      ArgValue::List(items) => f.write_str(&items.join(",")),
    }
  }
}

/// Argument name to typed value, built once per command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
  values: BTreeMap<String, ArgValue>,
}

impl ParsedArgs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &str) -> Option<&ArgValue> {
    self.values.get(key)
  }

  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.get(key).and_then(ArgValue::as_str)
  }

  pub fn get_bool(&self, key: &str) -> Option<bool> {
    self.get(key).and_then(ArgValue::as_bool)
  }

  pub fn get_number(&self, key: &str) -> Option<i64> {
    self.get(key).and_then(ArgValue::as_number)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.values.contains_key(key)
  }

  pub fn insert(&mut self, key: impl Into<String>, value: ArgValue) -> Option<ArgValue> {
    self.values.insert(key.into(), value)
  }

  /// Inserts only when the key is not already present.
  pub fn insert_default(&mut self, key: &str, value: ArgValue) {
    self
      .values
      .entry(key.to_string())
      .or_insert(value);
  }

  pub fn keys(&self) -> Vec<String> {
    self.values.keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &ArgValue)> {
    self.values.iter()
  }
}

/// The task-runner keyword (`clapi:{command}`) the process was started with.
///
/// The modifier check only runs when a keyword is present, so the tool can be
/// driven directly as well as through a task-runner script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
  keyword: Option<String>,
}

impl Invocation {
  pub fn new(keyword: Option<String>) -> Self {
    Self { keyword }
  }

  /// An invocation bound to a command, as the interactive flow produces it.
  pub fn for_command(validator_name: &str) -> Self {
    Self::new(Some(format!("{}:{}", KEYWORD_PREFIX, validator_name)))
  }

  pub fn keyword(&self) -> Option<&str> {
    self.keyword.as_deref()
  }

  /// Returns the modifier after `clapi:`, or `None` when no keyword was supplied.
  pub fn modifier(&self) -> Result<Option<String>, ClapiError> {
    let Some(keyword) = self.keyword.as_deref() else {
      return Ok(None);
    };
    if !keyword.starts_with(KEYWORD_PREFIX) {
      return Err(ClapiError::InvalidKeyword);
    }
    let modifier = keyword
      .split(&format!("{}:", KEYWORD_PREFIX))
      .collect::<String>()
      .trim()
      .to_string();
    Ok(Some(modifier))
  }

  pub fn check_modifier(&self, expected: &str) -> Result<(), ClapiError> {
    match self.modifier()? {
      Some(provided) if provided != expected => Err(ClapiError::InvalidModifierName {
        provided,
        expected: expected.to_string(),
      }),
      _ => Ok(()),
    }
  }
}

/// Splits a raw `key=value` token. A token without `=` yields an empty value.
pub fn split_token(token: &str) -> (&str, &str) {
  token.split_once('=').unwrap_or((token, ""))
}

/// Coerces a raw value per `treatedAs`.
pub fn coerce_value(name: &str, raw: &str, treated_as: TreatedAs) -> Result<ArgValue, ClapiError> {
  let value = match treated_as {
    TreatedAs::String => ArgValue::Str(raw.to_string()),
    TreatedAs::Boolean => ArgValue::Bool(raw == "true"),
    TreatedAs::Array => ArgValue::List(raw.split(',').map(str::to_string).collect()),
    TreatedAs::Number => {
      let number = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ClapiError::InvalidArgumentValue {
          name: name.to_string(),
          value: raw.to_string(),
          expected: treated_as.as_str().to_string(),
        })?;
      ArgValue::Number(number)
    }
  };
  Ok(value)
}

/// Checks a raw value against the argument's declared `pattern`, if any.
/// An unparsable pattern is logged and skipped.
#[cfg(feature = "regex")]
pub fn check_pattern(detail: &ArgDetail, raw: &str) -> Result<(), ClapiError> {
  let Some(pattern) = &detail.pattern else {
    return Ok(());
  };
  match Regex::new(pattern) {
    Ok(regex) if !regex.is_match(raw) => Err(ClapiError::InvalidArgumentValue {
      name: detail.name.clone(),
      value: raw.to_string(),
      expected: format!("match for /{}/", pattern),
    }),
    Ok(_) => Ok(()),
    Err(e) => {
      warn!(
        "Invalid pattern for argument '{}': {} - Skipping validation.",
        detail.name, e
      );
      Ok(())
    }
  }
}

#[cfg(not(feature = "regex"))]
pub fn check_pattern(_detail: &ArgDetail, _raw: &str) -> Result<(), ClapiError> {
  Ok(())
}

/// Coerces a raw value per the argument's detail and checks its pattern.
pub fn check_value(detail: &ArgDetail, raw: &str) -> Result<ArgValue, ClapiError> {
  let value = coerce_value(&detail.name, raw, detail.treated_as)?;
  check_pattern(detail, raw)?;
  Ok(value)
}

/// Turns raw `key=value` tokens into typed arguments. Keys without an
/// `argDetails` entry are kept as plain strings.
pub fn parse<S: AsRef<str>>(tokens: &[S], validator: &Validator) -> Result<ParsedArgs, ClapiError> {
  let mut args = ParsedArgs::new();
  for token in tokens {
    let (key, raw) = split_token(token.as_ref());
    let value = match validator.detail(key) {
      Some(detail) => check_value(detail, raw)?,
      None => ArgValue::Str(raw.to_string()),
    };
    trace!("Parsed argument {} = {:?}", key, value);
    args.insert(key, value);
  }
  Ok(args)
}

/// Runs the argument checks in order and returns the first violation.
pub fn validate(
  args: &ParsedArgs,
  validator: &Validator,
  invocation: &Invocation,
) -> Result<(), ClapiError> {
  let keys = args.keys();
  debug!(
    "Validating {} argument(s) for '{}': {:?}",
    keys.len(),
    validator.name,
    keys
  );

  if keys.len() > validator.max_args {
    return Err(ClapiError::MaxArgumentExceeded {
      command: validator.name.clone(),
      max: validator.max_args,
    });
  }
  if keys.len() < validator.min_args {
    return Err(ClapiError::MinArgumentExceeded {
      command: validator.name.clone(),
      min: validator.min_args,
    });
  }

  invocation.check_modifier(&validator.name)?;

  if keys.iter().any(|k| !validator.is_available(k)) {
    return Err(ClapiError::IllegalCommandArguments {
      received: keys,
      available: validator.available.clone(),
    });
  }

  let missing: Vec<String> = validator
    .required
    .iter()
    .filter(|req| !args.contains(req))
    .cloned()
    .collect();
  if !missing.is_empty() {
    return Err(ClapiError::MissingRequiredArguments {
      received: keys,
      required: validator.required.clone(),
      missing,
    });
  }

  Ok(())
}

pub fn parse_and_validate<S: AsRef<str>>(
  tokens: &[S],
  validator: &Validator,
  invocation: &Invocation,
) -> Result<ParsedArgs, ClapiError> {
  let args = parse(tokens, validator)?;
  validate(&args, validator, invocation)?;
  Ok(args)
}
