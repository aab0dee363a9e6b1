use super::file_operations::FileSystem;
use super::patch_applicator::apply_hunks;
use crate::config::MatchConfig;
use crate::error::{PatchError, Result};
use crate::types::{Hunk, Operation};
use crate::report::{OperationReport, Outcome, Report};
use log::{debug, info, warn};
use std::path::Path;

/// Runs parsed operations against a file tree, one at a time and in order.
pub struct Executor<F> {
    fs: F,
    config: MatchConfig,
}

impl<F: FileSystem> Executor<F> {
    pub fn new(fs: F, config: MatchConfig) -> Self {
        Self { fs, config }
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    pub fn into_filesystem(self) -> F {
        self.fs
    }

    /// Applies every operation. A failing operation is recorded and the next
    /// one still runs.
    pub fn execute(&mut self, operations: &[Operation]) -> Report {
        let mut report = Report::default();
        for (i, op) in operations.iter().enumerate() {
            let outcome = match self.apply_operation(op) {
                Ok(()) => {
                    info!("[{}] {} {:?}: applied", i + 1, op.kind(), op.paths());
                    Outcome::Applied
                }
                Err(e) => {
                    warn!("[{}] {} {:?}: {}", i + 1, op.kind(), op.paths(), e);
                    Outcome::Failed(e)
                }
            };
            report.operations.push(OperationReport {
                kind: op.kind(),
                paths: op.paths(),
                outcome,
            });
        }
        report
    }

    pub fn apply_operation(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::Add { path, content } => self.add(path, content),
            Operation::Delete { path } => self.delete(path),
            Operation::Move { from, to } => self.relocate(from, to),
            Operation::Update {
                path,
                move_to,
                hunks,
            } => self.update(path, move_to.as_deref(), hunks),
        }
    }

    fn add(&mut self, path: &Path, content: &str) -> Result<()> {
        if let Some(existing) = self.fs.read_file(path)? {
            if !existing.trim().is_empty() {
                return Err(PatchError::PathExists(path.to_path_buf()));
            }
            debug!("{} exists but is empty, writing over it", path.display());
        }
        self.fs.write_file(path, content)
    }

    fn delete(&mut self, path: &Path) -> Result<()> {
        if !self.fs.remove_file(path)? {
            return Err(PatchError::PathNotFound(path.to_path_buf()));
        }
        Ok(())
    }

    fn relocate(&mut self, from: &Path, to: &Path) -> Result<()> {
        if !self.fs.exists(from)? {
            return Err(PatchError::PathNotFound(from.to_path_buf()));
        }
        if self.fs.exists(to)? {
            return Err(PatchError::PathExists(to.to_path_buf()));
        }
        self.fs.rename_file(from, to)
    }

    fn update(&mut self, path: &Path, move_to: Option<&Path>, hunks: &[Hunk]) -> Result<()> {
        let content = self
            .fs
            .read_file(path)?
            .ok_or_else(|| PatchError::PathNotFound(path.to_path_buf()))?;
        if let Some(target) = move_to {
            if self.fs.exists(target)? {
                return Err(PatchError::PathExists(target.to_path_buf()));
            }
        }

        let updated = apply_hunks(&content, hunks, &self.config)?;
        let destination = move_to.unwrap_or(path);
        debug!(
            "{}: {} hunk(s) resolved, writing {} bytes to {}",
            path.display(),
            hunks.len(),
            updated.len(),
            destination.display()
        );
        self.fs.write_file(destination, &updated)?;
        if move_to.is_some() {
            self.fs.remove_file(path)?;
        }
        Ok(())
    }
}
