use crate::error::PatchError;
use crate::types::OperationKind;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Outcome {
    Applied,
    Failed(PatchError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Result of one operation, in the order the patch declared it.
#[derive(Debug)]
pub struct OperationReport {
    pub kind: OperationKind,
    pub paths: Vec<PathBuf>,
    pub outcome: Outcome,
}

impl OperationReport {
    pub fn describe_paths(&self) -> String {
        self.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[derive(Debug, Default)]
pub struct Report {
    pub operations: Vec<OperationReport>,
}

impl Report {
    pub fn all_applied(&self) -> bool {
        self.operations.iter().all(|op| op.outcome.is_applied())
    }

    pub fn applied_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.outcome.is_applied())
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.operations.len() - self.applied_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&OperationReport, &PatchError)> {
        self.operations.iter().filter_map(|op| match &op.outcome {
            Outcome::Failed(err) => Some((op, err)),
            Outcome::Applied => None,
        })
    }
}
