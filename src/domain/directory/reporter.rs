//! Reporter value objects.

use serde::{Deserialize, Serialize};

/// A student identified by their enrollment code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub code: String,
    pub dni: String,
    pub name: String,
}

/// A staff member identified by their national id number (DNI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub dni: String,
    pub name: String,
}

/// The person filing a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reporter {
    Student(Student),
    Staff(Staff),
}

impl Reporter {
    /// Display name used in greetings.
    pub fn name(&self) -> &str {
        match self {
            Reporter::Student(s) => &s.name,
            Reporter::Staff(s) => &s.name,
        }
    }

    /// First word of the name, for friendlier messages.
    pub fn first_name(&self) -> &str {
        self.name().split_whitespace().next().unwrap_or_else(|| self.name())
    }

    /// The reference stored on a submission.
    pub fn to_ref(&self) -> ReporterRef {
        match self {
            Reporter::Student(s) => ReporterRef::Student {
                code: s.code.clone(),
            },
            Reporter::Staff(s) => ReporterRef::Staff { dni: s.dni.clone() },
        }
    }
}

/// Reference to a reporter as persisted with a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReporterRef {
    Student { code: String },
    Staff { dni: String },
}

impl ReporterRef {
    /// Kind label (`"student"` / `"staff"`).
    pub fn kind(&self) -> &'static str {
        match self {
            ReporterRef::Student { .. } => "student",
            ReporterRef::Staff { .. } => "staff",
        }
    }

    /// The identifying number.
    pub fn key(&self) -> &str {
        match self {
            ReporterRef::Student { code } => code,
            ReporterRef::Staff { dni } => dni,
        }
    }
}
