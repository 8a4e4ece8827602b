//! Task identifier generation
//!
//! Every task carries an opaque 32-character lowercase hex identifier drawn
//! from a random UUIDv4. Identifiers are minted per creation call; the store
//! checks them against existing tasks before committing.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of a task identifier in characters
pub const TASK_ID_LEN: usize = 32;

/// Opaque task identifier (32 lowercase hex digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Mint a fresh random identifier
    pub fn generate() -> Self {
        TaskId(new_task_id())
    }

    /// Parse and validate an identifier supplied by a caller or read from storage
    pub fn parse(s: &str) -> Result<Self> {
        let well_formed = s.len() == TASK_ID_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(Error::InvalidInput(format!(
                "task identifier must be {} lowercase hex digits, got {:?}",
                TASK_ID_LEN, s
            )));
        }
        Ok(TaskId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Generate a new task identifier string from a UUIDv4
pub fn new_task_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TaskId::parse(s)
    }
}

impl TryFrom<String> for TaskId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        TaskId::parse(&s)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
