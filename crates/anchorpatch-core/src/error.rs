use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("malformed patch at line {line}: {reason}")]
    MalformedPatch { line: usize, reason: String },

    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("path already exists: {}", .0.display())]
    PathExists(PathBuf),

    #[error("hunk #{hunk} did not match: {preview}")]
    NoMatch { hunk: usize, preview: String },

    #[error(
        "hunk #{hunk} is ambiguous, it matches at lines {}; add context that names the enclosing block",
        format_lines(.candidates)
    )]
    AmbiguousMatch { hunk: usize, candidates: Vec<usize> },

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PatchError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        PatchError::MalformedPatch {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::Io {
            path: path.into(),
            source,
        }
    }

    /// Tags hunk-level errors with the 1-based hunk number within their update.
    pub(crate) fn for_hunk(self, index: usize) -> Self {
        match self {
            PatchError::NoMatch { preview, .. } => PatchError::NoMatch {
                hunk: index + 1,
                preview,
            },
            PatchError::AmbiguousMatch { candidates, .. } => PatchError::AmbiguousMatch {
                hunk: index + 1,
                candidates,
            },
            other => other,
        }
    }
}

fn format_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = PatchError> = std::result::Result<T, E>;
