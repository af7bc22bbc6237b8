//! Organizational sections and the lookup used to label materials

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainResult, required};

/// Label shown for a material without a (live) section
pub const NO_SECTION: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSection {
    pub name: String,
    pub description: String,
}

impl NewSection {
    pub fn new(name: &str, description: &str) -> DomainResult<Self> {
        Ok(Self {
            name: required("Section name", name)?,
            description: description.trim().to_string(),
        })
    }
}

/// Resolves weak `section_id` references against a snapshot of sections
#[derive(Debug, Clone, Default)]
pub struct SectionLookup {
    names: HashMap<i64, String>,
}

impl SectionLookup {
    pub fn new(sections: &[Section]) -> Self {
        Self {
            names: sections.iter().map(|s| (s.id, s.name.clone())).collect(),
        }
    }

    /// Section name, or [`NO_SECTION`] for a missing or dangling reference
    pub fn label(&self, section_id: Option<i64>) -> &str {
        section_id
            .and_then(|id| self.names.get(&id))
            .map(String::as_str)
            .unwrap_or(NO_SECTION)
    }
}
