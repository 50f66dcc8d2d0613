// src/list.rs
use std::io::{self, Write};

use crate::error::ClapiError;
use crate::registry::Command;

pub fn run_list(commands: &[Command]) -> Result<(), ClapiError> {
  let stdout = io::stdout();
  write_list(&mut stdout.lock(), commands)?;
  Ok(())
}

pub fn write_list<W: Write>(out: &mut W, commands: &[Command]) -> io::Result<()> {
  writeln!(out, "Available Clapi Commands:")?;
  writeln!(out, "{:<15} | {:<12} | {}", "Name", "Generator", "Description")?;
  writeln!(out, "{:-<15}-+-{:-<12}-+-{:-<50}", "", "", "")?;

  for command in commands {
    let validator = &command.validator;
    writeln!(
      out,
      "{:<15} | {:<12} | {}",
      validator.name,
      command.generator,
      validator.description.as_deref().unwrap_or("")
    )?;
    for arg in &validator.available {
      let marker = if validator.is_required(arg) { "*" } else { " " };
      let detail = validator.detail(arg);
      writeln!(
        out,
        "  {}{:<20} {:<8} {}",
        marker,
        arg,
        detail.map_or("string", |d| d.treated_as.as_str()),
        detail.map_or("", |d| d.description.as_str())
      )?;
    }
  }
  Ok(())
}
