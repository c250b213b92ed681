//! Listing output
//!
//! Human-readable and JSON renderings of the implementor list.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::generator::Implementor;

// ==================== Implementor Summary ====================

/// Name and description of one implementor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementorSummary {
    pub name: String,
    pub description: String,
}

impl ImplementorSummary {
    pub fn of(implementor: &dyn Implementor) -> Self {
        Self {
            name: implementor.name().to_string(),
            description: implementor.description().to_string(),
        }
    }
}

impl fmt::Display for ImplementorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.description)
    }
}

// ==================== Rendering ====================

/// One `name - description` line per implementor
pub fn render_list(summaries: &[ImplementorSummary]) -> String {
    summaries.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Output as JSON
pub fn to_json(summaries: &[ImplementorSummary]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summaries)
}
