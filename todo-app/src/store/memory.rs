use super::{Storage, StoreError, StoreFormat, codec};
use crate::todo::Todo;
use std::sync::Mutex;

/// Records kept in an in-memory buffer, encoded exactly as a file would be.
///
/// A buffer of `None` behaves like a backing file that does not exist yet.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    format: StoreFormat,
    buffer: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new(format: StoreFormat) -> Self {
        Self {
            format,
            buffer: Mutex::new(None),
        }
    }

    /// Starts from raw file contents, valid or not.
    pub fn with_contents(format: StoreFormat, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            buffer: Mutex::new(Some(contents.into())),
        }
    }

    /// Returns a copy of the current contents.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        // A panic while holding the lock cannot leave the buffer half written.
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn load_all(&self) -> Result<Vec<Todo>, StoreError> {
        match self.lock().as_deref() {
            None => Ok(Vec::new()),
            Some(bytes) => codec::decode(self.format, bytes).map_err(|source| {
                StoreError::Corrupt {
                    location: "memory".to_string(),
                    source,
                }
            }),
        }
    }

    fn save_all(&self, todos: &[Todo]) -> Result<(), StoreError> {
        let bytes = codec::encode(self.format, todos)?;
        *self.lock() = Some(bytes);
        Ok(())
    }
}
