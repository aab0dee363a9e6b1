use crate::error::{PatchError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, PathBuf};

static BEGIN_PATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\*\*\*\s*begin\s+patch$").unwrap());
static END_PATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\*\*\*\s*end\s+patch$").unwrap());
static END_OF_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\*\*\*\s*end\s+of\s+file$").unwrap());
static FILE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\*\*\*\s*(add|delete|update)\s+file\s*:\s*(.+)$").unwrap()
});
static MOVE_TO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\*\*\*\s*move\s+to\s*:\s*(.+)$").unwrap());
static NO_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\\?\s*no\s+newline\s+at\s+end\s+of\s+file$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileHeader {
    Add,
    Delete,
    Update,
}

pub fn is_begin_patch(line: &str) -> bool {
    BEGIN_PATCH.is_match(line.trim())
}

pub fn is_end_patch(line: &str) -> bool {
    END_PATCH.is_match(line.trim())
}

pub fn is_end_of_file(line: &str) -> bool {
    END_OF_FILE.is_match(line.trim())
}

pub fn is_no_newline_marker(line: &str) -> bool {
    NO_NEWLINE.is_match(line.trim())
}

/// `*** Add File: p`, `*** Delete File: p`, `*** Update File: p`.
pub fn parse_file_header(line: &str) -> Option<(FileHeader, &str)> {
    let caps = FILE_HEADER.captures(line.trim())?;
    let kind = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "add" => FileHeader::Add,
        "delete" => FileHeader::Delete,
        _ => FileHeader::Update,
    };
    Some((kind, caps.get(2)?.as_str()))
}

pub fn parse_move_to(line: &str) -> Option<&str> {
    MOVE_TO
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Turns a header's raw path into a relative path that stays inside the tree.
pub fn validate_path(raw: &str, line: usize) -> Result<PathBuf> {
    let cleaned = raw.trim().trim_matches('"').trim_matches('\'').trim();
    if cleaned.is_empty() {
        return Err(PatchError::malformed(line, "missing path"));
    }
    let path = PathBuf::from(cleaned);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(PatchError::malformed(
            line,
            format!("path '{cleaned}' must be relative and must not contain '..'"),
        ));
    }
    Ok(path)
}
