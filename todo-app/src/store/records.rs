//! In-memory operations on a loaded record list.
//!
//! Nothing here touches storage; [`super::TodoService`] wraps these with a
//! load before and a save after.

use super::StoreError;
use crate::todo::{Status, Todo};

/// Returns one more than the highest ID present, or 1 for an empty list.
///
/// Only the current contents are considered, so deleting the record with the
/// highest ID frees that ID for the next add. Lower IDs are never handed out
/// again while a higher one exists. Fails once `u32::MAX` is taken.
pub fn next_id(todos: &[Todo]) -> Result<u32, StoreError> {
    match todos.iter().map(Todo::id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted),
    }
}

/// Appends a new record with a fresh ID.
pub fn add(
    mut todos: Vec<Todo>,
    description: String,
    status: &str,
) -> Result<(Vec<Todo>, Todo), StoreError> {
    let status = Status::parse(status)?;
    let todo = Todo::new(next_id(&todos)?, description, status);
    todos.push(todo.clone());
    Ok((todos, todo))
}

/// Changes the fields that were supplied on the record with `id`.
///
/// Empty strings count as "not supplied". The status is validated before
/// anything is changed, so a bad status leaves the record as it was.
pub fn update(
    mut todos: Vec<Todo>,
    id: u32,
    description: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<Todo>, StoreError> {
    let status = status
        .filter(|s| !s.is_empty())
        .map(Status::parse)
        .transpose()?;

    let todo = todos
        .iter_mut()
        .find(|todo| todo.id() == id)
        .ok_or(StoreError::NotFound(id))?;

    if let Some(description) = description.filter(|d| !d.is_empty()) {
        todo.set_description(description.to_string());
    }
    if let Some(status) = status {
        todo.set_status(status);
    }
    Ok(todos)
}

/// Removes the record with `id`, keeping the others in order.
pub fn delete(mut todos: Vec<Todo>, id: u32) -> Result<Vec<Todo>, StoreError> {
    let index = todos
        .iter()
        .position(|todo| todo.id() == id)
        .ok_or(StoreError::NotFound(id))?;
    todos.remove(index);
    Ok(todos)
}
