pub mod executor;
pub mod file_operations;
pub mod patch_applicator;

pub use executor::Executor;
pub use file_operations::{DiskFs, FileSystem, MemoryFs, Overlay};
pub use patch_applicator::{apply_hunks, locate_hunk, OffsetTracker};
