//! Usage text rendering.
//!
//! The parser never prints anything; hosts call [`render`] when
//! [`ParseOutcome::HelpRequested`](crate::ParseOutcome::HelpRequested) comes
//! back, or after reporting a [`ParseError`](crate::ParseError).

use std::path::Path;

use crate::schema::{FlagSpec, OptionSpec, PositionalSpec, Schema};

const FALLBACK_PROGRAM: &str = "program";

/// Program name for the usage line, taken from `argv[0]`.
///
/// Only the file name component is kept (`/usr/bin/tool` -> `tool`).
pub fn program_name<S: AsRef<str>>(argv: &[S]) -> &str {
    let raw = argv.first().map_or("", |s| s.as_ref());
    let name = Path::new(raw)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(raw);
    if name.trim().is_empty() {
        FALLBACK_PROGRAM
    } else {
        name
    }
}

fn format_positional_left(spec: &PositionalSpec) -> String {
    if spec.is_required() {
        format!("<{}>", spec.name)
    } else {
        format!("[{}]", spec.name)
    }
}

fn format_names(name: &str, shortcut: Option<char>) -> String {
    match shortcut {
        Some(c) => format!("-{c}, --{name}"),
        None => format!("    --{name}"),
    }
}

fn format_flag_left(spec: &FlagSpec) -> String {
    format_names(&spec.name, spec.shortcut)
}

fn format_option_left(spec: &OptionSpec) -> String {
    format!(
        "{} <{}>",
        format_names(&spec.name, spec.shortcut),
        spec.name.to_ascii_uppercase()
    )
}

fn format_help(description: Option<&str>, default: Option<&str>) -> String {
    let mut out = description.map(str::trim).unwrap_or_default().to_string();
    if let Some(default) = default {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&format!("[default: {default}]"));
    }
    out
}

fn push_section(out: &mut String, title: &str, rows: Vec<(String, String)>) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

/// Render the usage line, description, arguments and options of `schema`.
pub fn render(schema: &Schema, program: &str) -> String {
    let mut out = format!("Usage: {program}");
    if !schema.flags().is_empty() || !schema.options().is_empty() {
        out.push_str(" [OPTIONS]");
    }
    for spec in schema.positionals() {
        out.push(' ');
        out.push_str(&format_positional_left(spec));
    }
    out.push('\n');

    if let Some(description) = schema
        .config()
        .help_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        out.push('\n');
        out.push_str(description);
        out.push('\n');
    }

    let positionals = schema
        .positionals()
        .iter()
        .map(|p| {
            (
                format_positional_left(p),
                format_help(p.description.as_deref(), p.default.as_deref()),
            )
        })
        .collect();
    push_section(&mut out, "Arguments", positionals);

    let options = schema
        .flags()
        .iter()
        .map(|f| (format_flag_left(f), format_help(f.description.as_deref(), None)))
        .chain(schema.options().iter().map(|o| {
            (
                format_option_left(o),
                format_help(o.description.as_deref(), o.default.as_deref()),
            )
        }))
        .collect();
    push_section(&mut out, "Options", options);

    out
}

impl Schema {
    /// Render help text for this schema. See [`render`].
    pub fn help(&self, program: &str) -> String {
        render(self, program)
    }
}
