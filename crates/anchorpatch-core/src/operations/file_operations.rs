use crate::error::{PatchError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Content access the executor needs from its environment.
pub trait FileSystem {
    /// `Ok(None)` when the file does not exist.
    fn read_file(&self, path: &Path) -> Result<Option<String>>;

    /// Writes the whole file, creating missing parent directories.
    fn write_file(&mut self, path: &Path, content: &str) -> Result<()>;

    /// `Ok(false)` when there was nothing to remove.
    fn remove_file(&mut self, path: &Path) -> Result<bool>;

    fn rename_file(&mut self, from: &Path, to: &Path) -> Result<()> {
        let content = self
            .read_file(from)?
            .ok_or_else(|| PatchError::PathNotFound(from.to_path_buf()))?;
        self.write_file(to, &content)?;
        self.remove_file(from)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.read_file(path)?.is_some())
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &mut F {
    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        (**self).read_file(path)
    }

    fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        (**self).write_file(path, content)
    }

    fn remove_file(&mut self, path: &Path) -> Result<bool> {
        (**self).remove_file(path)
    }

    fn rename_file(&mut self, from: &Path, to: &Path) -> Result<()> {
        (**self).rename_file(from, to)
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        (**self).exists(path)
    }
}

/// The real file tree below `root`. Patch paths are relative to it and may not
/// leave it.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        ensure_relative(path)?;
        Ok(self.root.join(path))
    }
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PatchError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Rejects absolute paths and `..` components.
pub fn ensure_relative(path: &Path) -> Result<()> {
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || path.as_os_str().is_empty() {
        return Err(PatchError::io(
            path,
            std::io::Error::new(
                ErrorKind::PermissionDenied,
                "path must be relative and stay inside the root",
            ),
        ));
    }
    Ok(())
}

impl FileSystem for DiskFs {
    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        let full = self.resolve(path)?;
        match fs::read_to_string(&full) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PatchError::io(full, e)),
        }
    }

    fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        ensure_directory_exists(&full)?;
        fs::write(&full, content).map_err(|e| PatchError::io(full, e))
    }

    fn remove_file(&mut self, path: &Path) -> Result<bool> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PatchError::io(full, e)),
        }
    }

    fn rename_file(&mut self, from: &Path, to: &Path) -> Result<()> {
        let src = self.resolve(from)?;
        let dst = self.resolve(to)?;
        ensure_directory_exists(&dst)?;
        fs::rename(&src, &dst).map_err(|e| PatchError::io(src, e))
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.resolve(path)?.is_file())
    }
}

/// A file tree held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}

impl FileSystem for MemoryFs {
    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        self.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> Result<bool> {
        Ok(self.files.remove(path).is_some())
    }
}

/// Reads through to `inner` but keeps every mutation in memory, so a patch can
/// be rehearsed with its cumulative effects and the tree left untouched.
#[derive(Debug)]
pub struct Overlay<F> {
    inner: F,
    changes: BTreeMap<PathBuf, Option<String>>,
}

impl<F: FileSystem> Overlay<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            changes: BTreeMap::new(),
        }
    }

    /// Paths that would be written (`Some`) or removed (`None`).
    pub fn changes(&self) -> &BTreeMap<PathBuf, Option<String>> {
        &self.changes
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: FileSystem> FileSystem for Overlay<F> {
    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        match self.changes.get(path) {
            Some(change) => Ok(change.clone()),
            None => self.inner.read_file(path),
        }
    }

    fn write_file(&mut self, path: &Path, content: &str) -> Result<()> {
        self.changes
            .insert(path.to_path_buf(), Some(content.to_string()));
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> Result<bool> {
        let existed = self.exists(path)?;
        self.changes.insert(path.to_path_buf(), None);
        Ok(existed)
    }
}
