pub mod config;
pub mod disambiguator;
pub mod error;
pub mod file_state;
pub mod matcher;
pub mod normalize;
pub mod operations;
pub mod parser;
pub mod report;
pub mod types;

pub use config::MatchConfig;
pub use error::{PatchError, Result};
pub use operations::{DiskFs, Executor, FileSystem, MemoryFs, Overlay};
pub use parser::parse;
pub use report::{OperationReport, Outcome, Report};
pub use types::{Hunk, HunkLine, MatchCandidate, Operation, OperationKind};

/// Parses `text` and applies every operation to `fs`.
///
/// Only a malformed patch is an `Err`; per-operation failures are in the
/// returned [`Report`].
pub fn apply_patch<F: FileSystem>(text: &str, fs: F, config: &MatchConfig) -> Result<Report> {
    let operations = parse(text)?;
    let mut executor = Executor::new(fs, config.clone());
    Ok(executor.execute(&operations))
}
