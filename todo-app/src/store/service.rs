use super::{Storage, StoreError, records};
use crate::todo::Todo;
use crate::trace::TraceId;
use std::sync::{Mutex, MutexGuard};

/// Runs each operation as a full load → mutate → save cycle against a [`Storage`].
///
/// Cycles started through the same service are serialized, so two requests
/// handled by one server process cannot overwrite each other's changes.
/// Separate processes sharing a backing file are not coordinated.
pub struct TodoService {
    storage: Box<dyn Storage>,
    cycle: Mutex<()>,
}

impl TodoService {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            cycle: Mutex::new(()),
        }
    }

    fn begin(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Retrieves all todo items in stored order.
    #[tracing::instrument(skip(self, trace_id), fields(trace_id = %trace_id))]
    pub fn list(&self, trace_id: &TraceId) -> Result<Vec<Todo>, StoreError> {
        let _cycle = self.begin();
        let todos = self.storage.load_all()?;
        tracing::info!(count = todos.len(), "Listed todo items");
        Ok(todos)
    }

    /// Creates a new todo item and persists it.
    ///
    /// # Returns
    ///
    /// The created item, carrying its newly assigned ID.
    #[tracing::instrument(skip(self, trace_id), fields(trace_id = %trace_id))]
    pub fn add(
        &self,
        trace_id: &TraceId,
        description: String,
        status: &str,
    ) -> Result<Todo, StoreError> {
        let _cycle = self.begin();
        let todos = self.storage.load_all()?;
        let (todos, created) = records::add(todos, description, status)?;
        self.storage.save_all(&todos)?;
        tracing::info!(id = created.id(), "Added new todo item");
        Ok(created)
    }

    /// Edits the supplied fields of a todo item by its ID.
    ///
    /// # Returns
    ///
    /// The item as stored after the edit.
    #[tracing::instrument(skip(self, trace_id), fields(trace_id = %trace_id))]
    pub fn update(
        &self,
        trace_id: &TraceId,
        id: u32,
        description: Option<&str>,
        status: Option<&str>,
    ) -> Result<Todo, StoreError> {
        let _cycle = self.begin();
        let todos = self.storage.load_all()?;
        let todos = records::update(todos, id, description, status)?;
        self.storage.save_all(&todos)?;
        tracing::info!(id, "Updated todo item");
        todos
            .into_iter()
            .find(|todo| todo.id() == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Deletes a todo item by its ID.
    #[tracing::instrument(skip(self, trace_id), fields(trace_id = %trace_id))]
    pub fn delete(&self, trace_id: &TraceId, id: u32) -> Result<(), StoreError> {
        let _cycle = self.begin();
        let todos = self.storage.load_all()?;
        let todos = records::delete(todos, id)?;
        self.storage.save_all(&todos)?;
        tracing::info!(id, "Deleted todo item");
        Ok(())
    }
}
