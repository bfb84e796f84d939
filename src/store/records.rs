// src/store/records.rs

//! Parsers for the line-based files kept in job directories.
//!
//! Each file kind has its own parse function returning a typed value or a
//! `ConfigError` naming the file. Nothing is silently defaulted.
//!
//! A single trailing newline terminates the last entry; it does not start an
//! empty one.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::{GridjobError, Result};

/// Display name of a job: one non-empty line without path separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobName(String);

impl JobName {
    pub fn new(name: impl Into<String>) -> std::result::Result<Self, String> {
        let name = name.into();
        if name.is_empty() {
            return Err("job name must not be empty".to_string());
        }
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            return Err(format!("job name '{name}' must not contain path separators"));
        }
        if name.contains('\n') {
            return Err("job name must be a single line".to_string());
        }
        Ok(JobName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable part of a job directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: JobName,
    /// Artifact paths, in the order the job lists them.
    pub inputs: Vec<PathBuf>,
    /// argv of the job command; never empty.
    pub command: Vec<String>,
}

/// Split a record into entries. One trailing newline terminates the last
/// entry; only an empty file has no entries.
fn entries(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n').collect()
}

/// Parse a file holding exactly one non-empty line (`name`, `grid`, `jid`).
pub fn parse_single_line(path: &Path, text: &str) -> Result<String> {
    match entries(text).as_slice() {
        [line] if !line.trim().is_empty() => Ok(line.to_string()),
        [] | [_] => Err(GridjobError::config(path, "expected one non-empty line")),
        more => Err(GridjobError::config(
            path,
            format!("expected one line, found {}", more.len()),
        )),
    }
}

pub fn parse_name(path: &Path, text: &str) -> Result<JobName> {
    let line = parse_single_line(path, text)?;
    JobName::new(line).map_err(|reason| GridjobError::config(path, reason))
}

/// Parse an ordered list of artifact paths (`inputs`, `refs`).
///
/// Blank entries are rejected: an empty path would silently resolve to the
/// store root.
pub fn parse_artifact_list(path: &Path, text: &str) -> Result<Vec<PathBuf>> {
    entries(text)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            if line.trim().is_empty() {
                Err(GridjobError::config(
                    path,
                    format!("blank artifact path on line {}", idx + 1),
                ))
            } else {
                Ok(PathBuf::from(line))
            }
        })
        .collect()
}

/// Parse the argv of a job. Blank tokens are kept verbatim.
pub fn parse_command(path: &Path, text: &str) -> Result<Vec<String>> {
    let argv: Vec<String> = entries(text).into_iter().map(str::to_string).collect();
    match argv.first() {
        None => Err(GridjobError::config(path, "command must contain at least one token")),
        Some(program) if program.is_empty() => {
            Err(GridjobError::config(path, "command program must not be blank"))
        }
        Some(_) => Ok(argv),
    }
}

/// Render entries one per line, each newline-terminated.
pub fn render_lines<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for item in items {
        out.push_str(item.as_ref());
        out.push('\n');
    }
    out
}

/// Render paths one per line. Paths must be valid UTF-8 and newline-free.
pub fn render_paths(path: &Path, items: &[PathBuf]) -> Result<String> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        match item.to_str() {
            Some(s) if !s.is_empty() && !s.contains('\n') => lines.push(s),
            _ => {
                return Err(GridjobError::config(
                    path,
                    format!("artifact path {:?} cannot be stored", item),
                ));
            }
        }
    }
    Ok(render_lines(lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> &'static Path {
        Path::new("jobs/a/definition/x")
    }

    #[test]
    fn trailing_newline_does_not_add_entry() {
        let inputs = parse_artifact_list(p(), "data/raw\njobs/b\n").unwrap();
        assert_eq!(inputs, vec![PathBuf::from("data/raw"), PathBuf::from("jobs/b")]);
        assert!(parse_artifact_list(p(), "").unwrap().is_empty());
        assert!(parse_artifact_list(p(), "\n").is_err());
    }

    #[test]
    fn lone_newline_is_one_blank_entry() {
        match parse_artifact_list(p(), "\n") {
            Err(GridjobError::ConfigError { reason, .. }) => assert!(reason.contains("line 1")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
        assert!(parse_command(p(), "\n").is_err());
        assert!(parse_single_line(p(), "\n").is_err());
        assert_eq!(parse_command(p(), "echo\n\n").unwrap(), vec!["echo", ""]);
    }

    #[test]
    fn blank_artifact_entry_is_an_error() {
        let err = parse_artifact_list(p(), "a\n\nb\n").unwrap_err();
        match err {
            GridjobError::ConfigError { reason, .. } => assert!(reason.contains("line 2")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn name_must_be_single_line_without_separators() {
        assert_eq!(parse_name(p(), "train\n").unwrap().as_str(), "train");
        assert!(parse_name(p(), "").is_err());
        assert!(parse_name(p(), "a\nb\n").is_err());
        assert!(parse_name(p(), "bin/train\n").is_err());
    }

    #[test]
    fn command_keeps_blank_tokens_but_needs_a_program() {
        let argv = parse_command(p(), "echo\n\nx\n").unwrap();
        assert_eq!(argv, vec!["echo", "", "x"]);
        assert!(parse_command(p(), "").is_err());
        assert!(parse_command(p(), "\nx\n").is_err());
    }

    #[test]
    fn single_line_rejects_extra_lines() {
        assert_eq!(parse_single_line(p(), "g1\n").unwrap(), "g1");
        assert_eq!(parse_single_line(p(), "g1").unwrap(), "g1");
        assert!(parse_single_line(p(), "g1\ng2\n").is_err());
        assert!(parse_single_line(p(), "  \n").is_err());
    }

    #[test]
    fn render_is_parse_compatible() {
        let text = render_lines(["python", "train.py"]);
        assert_eq!(text, "python\ntrain.py\n");
        assert_eq!(parse_command(p(), &text).unwrap(), vec!["python", "train.py"]);
        assert!(render_paths(p(), &[PathBuf::from("a\nb")]).is_err());
    }
}
