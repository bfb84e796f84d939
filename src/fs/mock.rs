// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, bail, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory filesystem for unit tests.
///
/// Paths are used verbatim as keys, so tests should stick to one spelling
/// per entry (the job store normalizes paths before touching the filesystem).
/// Every mutation is appended to a journal so tests can assert that an
/// operation left the tree untouched.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    mutations: Arc<Mutex<Vec<String>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut entries, parent);
        }
        entries.insert(path.to_path_buf(), MockEntry::File(content.into()));
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dirs(&mut entries, path.as_ref());
    }

    /// Number of mutating calls made through the [`FileSystem`] trait.
    pub fn mutation_count(&self) -> usize {
        self.mutations.lock().unwrap().len()
    }

    /// Mutating calls made through the [`FileSystem`] trait, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.mutations.lock().unwrap().clone()
    }

    fn ensure_dirs(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }

    fn record(&self, op: &str, path: &Path) {
        self.mutations
            .lock()
            .unwrap()
            .push(format!("{op} {}", path.display()));
    }

    fn parent_is_dir(entries: &BTreeMap<PathBuf, MockEntry>, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                matches!(entries.get(parent), Some(MockEntry::Dir))
            }
            _ => true,
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.record("write", path);
        let mut entries = self.entries.lock().unwrap();
        if !Self::parent_is_dir(&entries, path) {
            bail!("Parent directory missing: {:?}", path);
        }
        if let Some(MockEntry::Dir) = entries.get(path) {
            bail!("Is a directory: {:?}", path);
        }
        entries.insert(path.to_path_buf(), MockEntry::File(contents.to_vec()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::Dir))
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.record("create_dir", path);
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(path) {
            bail!("Already exists: {:?}", path);
        }
        if !Self::parent_is_dir(&entries, path) {
            bail!("Parent directory missing: {:?}", path);
        }
        entries.insert(path.to_path_buf(), MockEntry::Dir);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.record("create_dir_all", path);
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dirs(&mut entries, path);
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.record("remove_dir", path);
        let mut entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::Dir) => {}
            Some(MockEntry::File(_)) => bail!("Not a directory: {:?}", path),
            None => bail!("Not found: {:?}", path),
        }
        let has_children = entries
            .keys()
            .any(|p| p.parent() == Some(path));
        if has_children {
            bail!("Directory not empty: {:?}", path);
        }
        entries.remove(path);
        Ok(())
    }
}
