use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single todo entry.
#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
pub struct Todo {
    id: u32,
    description: String,
    status: Status,
}

impl Todo {
    pub fn new(id: u32, description: String, status: Status) -> Self {
        Self {
            id,
            description,
            status,
        }
    }

    /// Returns the ID of the todo item.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the description of the todo item.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status of the todo item.
    pub fn status(&self) -> Status {
        self.status
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.description, self.status)
    }
}

/// Lifecycle state of a todo item.
#[derive(Debug, Default, Eq, PartialEq, Serialize, Deserialize, Clone, Copy, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    #[default]
    NotStarted,
    Started,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::NotStarted, Status::Started, Status::Completed];

    /// The label written to the backing file and printed to users.
    pub fn label(&self) -> &'static str {
        match self {
            Status::NotStarted => "not started",
            Status::Started => "started",
            Status::Completed => "completed",
        }
    }

    /// Every canonical label, comma separated, for error messages.
    pub fn labels() -> String {
        Status::ALL.map(|status| status.label()).join(", ")
    }

    /// Parses a user supplied status.
    ///
    /// Case, surrounding whitespace and `-`/`_` word separators are ignored,
    /// and the older `complete` label is accepted for [`Status::Completed`].
    pub fn parse(input: &str) -> Result<Self, StoreError> {
        let normalized = input.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "not started" => Ok(Status::NotStarted),
            "started" => Ok(Status::Started),
            "completed" | "complete" => Ok(Status::Completed),
            _ => Err(StoreError::InvalidStatus(input.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse(s)
    }
}

impl TryFrom<String> for Status {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Status::parse(&value)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.label().to_string()
    }
}
