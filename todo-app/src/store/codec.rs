//! Serialization of the record list for both backing file layouts.

use super::StoreFormat;
use crate::todo::{Status, Todo};
use std::collections::HashSet;

const FIELD_SEPARATOR: &str = ", ";

/// Why the contents of a backing file could not be turned into records.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("line {line}: {reason}")]
    Line { line: usize, reason: String },
    #[error("ID {0} appears more than once")]
    DuplicateId(u32),
    #[error("ID 0 is not a valid record ID")]
    ZeroId,
}

/// Renders the records in the given layout.
pub fn encode(format: StoreFormat, todos: &[Todo]) -> Result<Vec<u8>, std::io::Error> {
    match format {
        StoreFormat::Json => {
            let mut json = serde_json::to_vec_pretty(todos)?;
            json.push(b'\n');
            Ok(json)
        }
        StoreFormat::Text => Ok(encode_text(todos).into_bytes()),
    }
}

/// Parses records from the given layout and checks that their IDs are usable.
pub fn decode(format: StoreFormat, bytes: &[u8]) -> Result<Vec<Todo>, DecodeError> {
    let todos = match format {
        StoreFormat::Json => decode_json(bytes)?,
        StoreFormat::Text => decode_text(std::str::from_utf8(bytes)?)?,
    };
    check_ids(&todos)?;
    Ok(todos)
}

fn decode_json(bytes: &[u8]) -> Result<Vec<Todo>, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(bytes)?)
}

fn check_ids(todos: &[Todo]) -> Result<(), DecodeError> {
    let mut seen = HashSet::with_capacity(todos.len());
    for todo in todos {
        if todo.id() == 0 {
            return Err(DecodeError::ZeroId);
        }
        if !seen.insert(todo.id()) {
            return Err(DecodeError::DuplicateId(todo.id()));
        }
    }
    Ok(())
}

fn encode_text(todos: &[Todo]) -> String {
    todos
        .iter()
        .map(|todo| {
            format!(
                "{}{sep}{}{sep}{}\n",
                todo.id(),
                escape(todo.description()),
                todo.status(),
                sep = FIELD_SEPARATOR
            )
        })
        .collect()
}

fn decode_text(text: &str) -> Result<Vec<Todo>, DecodeError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_line(line).map_err(|reason| DecodeError::Line {
                line: index + 1,
                reason,
            })
        })
        .collect()
}

// The ID is split off at the first separator and the status at the last one,
// so descriptions are free to contain ", " themselves.
fn parse_line(line: &str) -> Result<Todo, String> {
    let (id, rest) = line
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| "expected `id, description, status`".to_string())?;
    let (description, status) = rest
        .rsplit_once(FIELD_SEPARATOR)
        .ok_or_else(|| "missing status field".to_string())?;

    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid ID '{}': {}", id.trim(), e))?;
    let status = Status::parse(status).map_err(|e| e.to_string())?;

    Ok(Todo::new(id, unescape(description), status))
}

fn escape(description: &str) -> String {
    let mut escaped = String::with_capacity(description.len());
    for c in description.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape(field: &str) -> String {
    let mut unescaped = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}
