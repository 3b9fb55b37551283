use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for note storage
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Full-text access to the notes that own tasks.
///
/// Paths are the task locations as recorded by the scanner, relative to the
/// vault root.
pub trait TaskStore {
    /// `Ok(None)` when the note does not exist.
    fn read_text(&self, path: &Path) -> Result<Option<String>, StoreError>;
    fn write_text(&self, path: &Path, text: &str) -> Result<(), StoreError>;
}

impl<T: TaskStore + ?Sized> TaskStore for &T {
    fn read_text(&self, path: &Path) -> Result<Option<String>, StoreError> {
        (**self).read_text(path)
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        (**self).write_text(path, text)
    }
}

/// Notes on disk under a vault root
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl TaskStore for FsStore {
    fn read_text(&self, path: &Path) -> Result<Option<String>, StoreError> {
        let full = self.resolve(path);
        match fs::read_to_string(&full) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read {
                path: full,
                source: e,
            }),
        }
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        let full = self.resolve(path);
        atomic_write(&full, text.as_bytes()).map_err(|e| StoreError::Write {
            path: full,
            source: e,
        })
    }
}

/// Write via a temp file in the same directory, then rename over the target
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// In-memory notes, for tests and embedders. Counts writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(path.into(), text.into());
        self
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Replace a note without counting it as a write (an external edit)
    pub fn set_external(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), text.into());
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl TaskStore for MemoryStore {
    fn read_text(&self, path: &Path) -> Result<Option<String>, StoreError> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<(), StoreError> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), text.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
