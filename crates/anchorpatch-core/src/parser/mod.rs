//! Patch text to [`Operation`]s.
//!
//! ```text
//! *** Begin Patch
//! *** Add File: <path>
//! +<line>...
//! *** Delete File: <path>
//! *** Update File: <path>
//! *** Move to: <path>            (optional)
//! @@ <scope, e.g. class Car:>    (optional text)
//!  <context>
//! -<removed>
//! +<added>
//! *** End of File                (optional)
//! *** End Patch
//! ```
//!
//! Anything outside the Begin/End markers is ignored.

pub mod header_parser;
pub mod hunk_parser;

use crate::error::{PatchError, Result};
use crate::types::{Hunk, Operation};
use header_parser::{
    is_begin_patch, is_end_patch, is_no_newline_marker, parse_file_header, parse_move_to,
    validate_path, FileHeader,
};
use hunk_parser::{classify_body_line, HunkBuilder};
use log::debug;
use std::path::PathBuf;

pub fn parse(content: &str) -> Result<Vec<Operation>> {
    let lines: Vec<&str> = content.lines().collect();

    let begin = lines
        .iter()
        .position(|l| is_begin_patch(l))
        .ok_or_else(|| PatchError::malformed(1, "missing '*** Begin Patch'"))?;
    let end = lines
        .iter()
        .rposition(|l| is_end_patch(l))
        .filter(|&end| end > begin)
        .ok_or_else(|| PatchError::malformed(lines.len().max(1), "missing '*** End Patch'"))?;

    let mut operations = Vec::new();
    let mut state = ParserState::Idle;

    for (idx, &raw) in lines.iter().enumerate().take(end).skip(begin + 1) {
        let line_no = idx + 1;

        if let Some((kind, raw_path)) = header_if_allowed(&state, raw) {
            operations.extend(std::mem::take(&mut state).finish()?);
            let path = validate_path(raw_path, line_no)?;
            state = match kind {
                FileHeader::Add => ParserState::InAdd(PendingAdd::new(path)),
                FileHeader::Delete => {
                    operations.push(Operation::Delete { path });
                    ParserState::Idle
                }
                FileHeader::Update => ParserState::InUpdate(PendingUpdate::new(path, line_no)),
            };
            continue;
        }

        match &mut state {
            ParserState::Idle => {
                if !raw.trim().is_empty() {
                    return Err(PatchError::malformed(
                        line_no,
                        format!("expected a file header, found '{}'", raw.trim()),
                    ));
                }
            }
            ParserState::InAdd(add) => add.push(raw, line_no)?,
            ParserState::InUpdate(update) => update.push(raw, line_no)?,
        }
    }

    operations.extend(state.finish()?);
    debug!("parsed {} operation(s)", operations.len());
    Ok(operations)
}

/// Inside an update body only an unindented line can be a header, so context
/// lines that merely contain header text stay context.
fn header_if_allowed<'a>(state: &ParserState, raw: &'a str) -> Option<(FileHeader, &'a str)> {
    match state {
        ParserState::InUpdate(_) if !raw.starts_with("***") => None,
        _ => parse_file_header(raw),
    }
}

#[derive(Default)]
enum ParserState {
    #[default]
    Idle,
    InAdd(PendingAdd),
    InUpdate(PendingUpdate),
}

impl ParserState {
    fn finish(self) -> Result<Vec<Operation>> {
        match self {
            ParserState::Idle => Ok(Vec::new()),
            ParserState::InAdd(add) => Ok(vec![add.finish()]),
            ParserState::InUpdate(update) => update.finish(),
        }
    }
}

struct PendingAdd {
    path: PathBuf,
    lines: Vec<String>,
    blank_run: usize,
    no_newline: bool,
}

impl PendingAdd {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lines: Vec::new(),
            blank_run: 0,
            no_newline: false,
        }
    }

    fn push(&mut self, raw: &str, line_no: usize) -> Result<()> {
        if let Some(rest) = raw.strip_prefix('+') {
            // Unprefixed blank lines only count when more content follows.
            self.lines
                .extend(std::iter::repeat(String::new()).take(self.blank_run));
            self.blank_run = 0;
            self.lines.push(rest.to_string());
        } else if raw.trim().is_empty() {
            self.blank_run += 1;
        } else if is_no_newline_marker(raw) {
            self.no_newline = true;
        } else {
            return Err(PatchError::malformed(
                line_no,
                format!("added file lines must start with '+', found '{raw}'"),
            ));
        }
        Ok(())
    }

    fn finish(self) -> Operation {
        let mut content = self.lines.join("\n");
        if !self.no_newline && !self.lines.is_empty() {
            content.push('\n');
        }
        Operation::Add {
            path: self.path,
            content,
        }
    }
}

struct PendingUpdate {
    path: PathBuf,
    header_line: usize,
    move_to: Option<PathBuf>,
    body: HunkBuilder,
}

impl PendingUpdate {
    fn new(path: PathBuf, header_line: usize) -> Self {
        Self {
            path,
            header_line,
            move_to: None,
            body: HunkBuilder::default(),
        }
    }

    fn push(&mut self, raw: &str, line_no: usize) -> Result<()> {
        if let Some(target) = parse_move_to(raw).filter(|_| raw.starts_with("***")) {
            if !self.body.is_empty() || self.move_to.is_some() {
                return Err(PatchError::malformed(
                    line_no,
                    "'*** Move to:' must directly follow its '*** Update File:' header",
                ));
            }
            self.move_to = Some(validate_path(target, line_no)?);
            return Ok(());
        }

        match classify_body_line(raw) {
            Some(body) => {
                self.body.push(body);
                Ok(())
            }
            None => Err(PatchError::malformed(
                line_no,
                format!("unexpected line in update of {}: '{raw}'", self.path.display()),
            )),
        }
    }

    fn finish(self) -> Result<Vec<Operation>> {
        let hunks = self.body.finish();
        for (i, hunk) in hunks.iter().enumerate() {
            if !has_anchor(hunk) {
                return Err(PatchError::malformed(
                    self.header_line,
                    format!(
                        "hunk #{} of {} has no context to anchor it",
                        i + 1,
                        self.path.display()
                    ),
                ));
            }
        }

        if self.move_to.as_ref() == Some(&self.path) {
            return Err(PatchError::malformed(
                self.header_line,
                format!("move source and target are both {}", self.path.display()),
            ));
        }

        match (self.move_to, hunks.is_empty()) {
            (None, true) => Err(PatchError::malformed(
                self.header_line,
                format!("update of {} contains no changes", self.path.display()),
            )),
            (Some(to), true) => Ok(vec![Operation::Move {
                from: self.path,
                to,
            }]),
            (move_to, false) => Ok(vec![Operation::Update {
                path: self.path,
                move_to,
                hunks,
            }]),
        }
    }
}

fn has_anchor(hunk: &Hunk) -> bool {
    hunk.at_eof || !hunk.scope.is_empty() || !hunk.anchor_context().is_empty()
}
