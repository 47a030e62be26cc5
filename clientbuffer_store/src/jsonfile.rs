use super::*;
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Replace the contents of `path` with whatever `write` produces.
///
/// The new contents go to a temporary file in the same directory, which is
/// renamed over `path` only once completely written. If anything fails the
/// existing file is untouched.
fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// A JSON file-backed store
///
/// The whole map is held in memory and the file is replaced after every
/// mutation. If writing fails the in-memory change is rolled back and the
/// previous file is left in place, so the caller's view never runs ahead of
/// what is on disk.
pub struct JsonFileStore {
    filename: PathBuf,

    state: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `filename`. A missing file starts an empty store;
    /// a file that exists but can't be parsed is an error.
    pub fn open(filename: impl Into<PathBuf>) -> Result<Self> {
        let filename = filename.into();

        let state = match File::open(&filename) {
            Ok(file) => serde_json::from_reader(file)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Couldn't open store file {}, starting from empty",
                    filename.display()
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            filename,
            state: RwLock::new(state),
        })
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    fn save(&self, state: &BTreeMap<String, String>) -> Result<()> {
        replace_file(&self.filename, |writer| {
            Ok(serde_json::to_writer_pretty(writer, state)?)
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.state.write();
        let previous = state.insert(key.to_string(), value.to_string());

        if let Err(e) = self.save(&state) {
            match previous {
                Some(old) => state.insert(key.to_string(), old),
                None => state.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut state = self.state.write();
        let Some(previous) = state.remove(key) else {
            return Ok(false);
        };

        if let Err(e) = self.save(&state) {
            state.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.state.read().keys().cloned().collect())
    }
}
