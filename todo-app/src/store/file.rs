use super::{Storage, StoreError, StoreFormat, codec};
use crate::todo::Todo;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Records kept in a file on local disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    format: StoreFormat,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>, format: StoreFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Storage for FileStorage {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    fn load_all(&self) -> Result<Vec<Todo>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("Store file does not exist yet, starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        codec::decode(self.format, &bytes).map_err(|source| StoreError::Corrupt {
            location: self.path().display().to_string(),
            source,
        })
    }

    /// Writes to a sibling temporary file and renames it over the store so
    /// readers never observe a partially written file.
    #[tracing::instrument(skip(self, todos), fields(path = %self.path.display(), count = todos.len()))]
    fn save_all(&self, todos: &[Todo]) -> Result<(), StoreError> {
        let bytes = codec::encode(self.format, todos)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.temp_path();
        let written =
            fs::write(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }
}
