pub mod cli;
pub mod config;
pub mod store;
pub mod todo;
pub mod trace;
pub mod web;

pub use store::{StoreError, TodoService};
pub use todo::{Status, Todo};
