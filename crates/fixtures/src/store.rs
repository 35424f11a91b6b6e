//! Fixture directory access
//!
//! All paths are relative to the store root. Discovery is fresh on every
//! call; nothing is cached between runs.

use crate::error::{FixtureError, FixtureResult};
use crate::naming::Fixture;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A directory of fixture inputs and their artifacts
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    /// Open a store rooted at `root`. The directory is not touched until an
    /// operation needs it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file in the store
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// List fixture inputs with extension `ext` in directory-scan order.
    ///
    /// Scan order is lexicographic by filename so runs are reproducible
    /// across platforms. Subdirectories are ignored.
    pub fn discover(&self, ext: &str) -> FixtureResult<Vec<Fixture>> {
        if !ext.starts_with('.') {
            return Err(FixtureError::InvalidExtension(ext.to_string()));
        }
        let entries =
            fs::read_dir(&self.root).map_err(|e| FixtureError::directory(&self.root, e))?;

        let mut fixtures = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FixtureError::directory(&self.root, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| FixtureError::io(entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(fixture) = Fixture::parse(file_name, ext) {
                fixtures.push(fixture);
            }
        }
        fixtures.sort_by(|a, b| a.file_name().cmp(b.file_name()));
        Ok(fixtures)
    }

    /// Read a file, returning `None` if it does not exist
    pub fn read(&self, name: &str) -> FixtureResult<Option<String>> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FixtureError::io(path, e)),
        }
    }

    /// Read a file that must exist
    pub fn read_required(&self, name: &str) -> FixtureResult<String> {
        self.read(name)?
            .ok_or_else(|| FixtureError::NotFound(self.path(name)))
    }

    /// Write a file, replacing any previous content
    pub fn write(&self, name: &str, data: &str) -> FixtureResult<()> {
        let path = self.path(name);
        fs::write(&path, data).map_err(|e| FixtureError::io(path, e))
    }

    /// Remove a file. Removing a missing file is not an error.
    pub fn delete(&self, name: &str) -> FixtureResult<()> {
        let path = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FixtureError::io(path, e)),
        }
    }

    /// Whether a file exists
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }
}
