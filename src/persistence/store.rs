//! Save slot storage

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Document, PersistError};

/// Text storage for named save slots
pub trait SaveStore {
    fn write(&mut self, slot: &str, text: &str) -> Result<(), PersistError>;
    fn read(&self, slot: &str) -> Result<String, PersistError>;
}

/// Slots stored as `<dir>/<slot>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl SaveStore for FileStore {
    fn write(&mut self, slot: &str, text: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;

        // Write to a temp file first so a crash never leaves a torn save
        let path = self.path_for(slot);
        let tmp = self.dir.join(format!("{slot}.json.tmp"));
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &path)?;

        log::info!("Saved slot '{slot}' to {}", path.display());
        Ok(())
    }

    fn read(&self, slot: &str) -> Result<String, PersistError> {
        Ok(fs::read_to_string(self.path_for(slot))?)
    }
}

/// In-memory slots (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }
}

impl SaveStore for MemoryStore {
    fn write(&mut self, slot: &str, text: &str) -> Result<(), PersistError> {
        self.slots.insert(slot.to_string(), text.to_string());
        Ok(())
    }

    fn read(&self, slot: &str) -> Result<String, PersistError> {
        self.slots.get(slot).cloned().ok_or_else(|| {
            PersistError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no save in slot '{slot}'"),
            ))
        })
    }
}

/// Serialize `doc` into `slot`
pub fn write_document(
    store: &mut dyn SaveStore,
    slot: &str,
    doc: &Document,
) -> Result<(), PersistError> {
    let text = serde_json::to_string_pretty(doc)?;
    store.write(slot, &text)
}

/// Read and parse `slot`
pub fn read_document(store: &dyn SaveStore, slot: &str) -> Result<Document, PersistError> {
    let text = store.read(slot)?;
    Ok(serde_json::from_str(&text)?)
}
