use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Add { path: PathBuf, content: String },
    Delete { path: PathBuf },
    Move { from: PathBuf, to: PathBuf },
    /// Edits `path`, and when `move_to` is set writes the result there and
    /// removes `path`. Either all of it happens or none of it.
    Update {
        path: PathBuf,
        move_to: Option<PathBuf>,
        hunks: Vec<Hunk>,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Add { .. } => OperationKind::Add,
            Operation::Delete { .. } => OperationKind::Delete,
            Operation::Move { .. } => OperationKind::Move,
            Operation::Update { .. } => OperationKind::Update,
        }
    }

    /// Paths touched by the operation, source first for moves.
    pub fn paths(&self) -> Vec<PathBuf> {
        match self {
            Operation::Add { path, .. }
            | Operation::Delete { path }
            | Operation::Update {
                path, move_to: None, ..
            } => vec![path.clone()],
            Operation::Move { from, to }
            | Operation::Update {
                path: from,
                move_to: Some(to),
                ..
            } => vec![from.clone(), to.clone()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Add,
    Delete,
    Move,
    Update,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationKind::Add => "add",
            OperationKind::Delete => "delete",
            OperationKind::Move => "move",
            OperationKind::Update => "update",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HunkLine {
    Context(String),
    Add(String),
    Remove(String),
}

impl HunkLine {
    fn is_change(&self) -> bool {
        !matches!(self, HunkLine::Context(_))
    }
}

/// One located edit inside an update.
///
/// `scope` holds the `@@ <text>` headers that name the enclosing structure
/// (a class, a function). `lines` is the body in patch order. The views below
/// split that body into the parts the matcher and disambiguator work with:
///
/// ```text
///   leading_context   ' ' lines before the first change
///   old_lines/new_lines  first change ..= last change (interior context kept)
///   trailing_context  ' ' lines after the last change
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hunk {
    pub scope: Vec<String>,
    pub lines: Vec<HunkLine>,
    pub at_eof: bool,
}

impl Hunk {
    /// Index range of `lines` covering the first through last change.
    fn changed_range(&self) -> std::ops::Range<usize> {
        let first = self.lines.iter().position(HunkLine::is_change);
        let last = self.lines.iter().rposition(HunkLine::is_change);
        match (first, last) {
            (Some(first), Some(last)) => first..last + 1,
            _ => self.lines.len()..self.lines.len(),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(HunkLine::is_change)
    }

    pub fn changed(&self) -> &[HunkLine] {
        &self.lines[self.changed_range()]
    }

    pub fn leading_context(&self) -> Vec<&str> {
        pre_image(&self.lines[..self.changed_range().start])
    }

    pub fn trailing_context(&self) -> Vec<&str> {
        pre_image(&self.lines[self.changed_range().end..])
    }

    pub fn old_lines(&self) -> Vec<&str> {
        pre_image(self.changed())
    }

    pub fn new_lines(&self) -> Vec<&str> {
        self.changed()
            .iter()
            .filter_map(|line| match line {
                HunkLine::Context(s) | HunkLine::Add(s) => Some(s.as_str()),
                HunkLine::Remove(_) => None,
            })
            .collect()
    }

    /// Every pre-image line of the hunk, in order.
    pub fn anchor_context(&self) -> Vec<&str> {
        pre_image(&self.lines)
    }
}

fn pre_image(lines: &[HunkLine]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|line| match line {
            HunkLine::Context(s) | HunkLine::Remove(s) => Some(s.as_str()),
            HunkLine::Add(_) => None,
        })
        .collect()
}

/// A window of the current file that may correspond to a hunk's anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate {
    pub start_line: usize,
    pub end_line: usize,
    pub score: f64,
    pub exact_overlap: usize,
}

impl MatchCandidate {
    pub fn len(&self) -> usize {
        self.end_line - self.start_line
    }

    pub fn is_empty(&self) -> bool {
        self.start_line == self.end_line
    }
}
