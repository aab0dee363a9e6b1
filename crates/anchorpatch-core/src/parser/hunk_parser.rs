use super::header_parser::{is_end_of_file, is_no_newline_marker};
use crate::types::{Hunk, HunkLine};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

pub const HUNK_HEADER_PREFIX: &str = "@@";

/// Unified-diff style ranges (`-12,5 +12,7 @@ def f():`), keeping only the
/// trailing section name.
static UNIFIED_RANGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\d+(?:,\d+)?\s+\+\d+(?:,\d+)?\s*@@\s*(.*)$").unwrap());

#[derive(Debug, PartialEq)]
pub enum BodyLine {
    /// `@@` with the optional scope text that follows it.
    Header(Option<String>),
    Line(HunkLine),
    EndOfFile,
    NoNewline,
}

/// Classifies one line of an update body, `None` when it is not body syntax.
pub fn classify_body_line(raw: &str) -> Option<BodyLine> {
    if let Some(rest) = raw.strip_prefix(HUNK_HEADER_PREFIX) {
        return Some(BodyLine::Header(parse_scope(rest)));
    }
    if raw.starts_with("***") && is_end_of_file(raw) {
        return Some(BodyLine::EndOfFile);
    }
    if raw.starts_with('\\') && is_no_newline_marker(raw) {
        return Some(BodyLine::NoNewline);
    }

    let line = if let Some(rest) = raw.strip_prefix('+') {
        HunkLine::Add(rest.to_string())
    } else if let Some(rest) = raw.strip_prefix('-') {
        HunkLine::Remove(rest.to_string())
    } else if let Some(rest) = raw.strip_prefix(' ') {
        HunkLine::Context(rest.to_string())
    } else if raw.is_empty() {
        HunkLine::Context(String::new())
    } else {
        return None;
    };
    Some(BodyLine::Line(line))
}

fn parse_scope(rest: &str) -> Option<String> {
    let text = rest.trim();
    let text = match UNIFIED_RANGES.captures(text) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim(),
        None => text.trim_end_matches(HUNK_HEADER_PREFIX).trim(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Collects the hunks of one update as body lines arrive.
#[derive(Debug, Default)]
pub struct HunkBuilder {
    hunks: Vec<Hunk>,
    current: Hunk,
}

impl HunkBuilder {
    pub fn push(&mut self, body: BodyLine) {
        match body {
            BodyLine::Header(scope) => {
                if !self.current.lines.is_empty() {
                    self.close();
                }
                if let Some(scope) = scope {
                    self.current.scope.push(scope);
                }
            }
            BodyLine::Line(line) => self.current.lines.push(line),
            BodyLine::EndOfFile => {
                self.current.at_eof = true;
                self.close();
            }
            BodyLine::NoNewline => debug!("ignoring no-newline marker inside an update"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty() && self.current.lines.is_empty() && self.current.scope.is_empty()
    }

    fn close(&mut self) {
        let hunk = std::mem::take(&mut self.current);
        if hunk.has_changes() {
            self.hunks.push(hunk);
        } else if !hunk.lines.is_empty() || !hunk.scope.is_empty() {
            debug!("dropping hunk without changes (scope {:?})", hunk.scope);
        }
    }

    pub fn finish(mut self) -> Vec<Hunk> {
        self.close();
        self.hunks
    }
}
