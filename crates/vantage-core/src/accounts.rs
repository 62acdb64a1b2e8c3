use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::Platform;

/// Whether a tracked account is the client's own channel or a competitor.
///
/// Baselines and outlier detection run over competitor posts only; gap
/// analysis compares the own channel against the competitor outlier set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Own,
    Competitor,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relationship::Own => write!(f, "own"),
            Relationship::Competitor => write!(f, "competitor"),
        }
    }
}

impl Relationship {
    /// Parse a stored relationship string. Unrecognized values are treated
    /// as competitor, the safe side for detection (never pollutes the own
    /// channel's gap baseline).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "own" => Relationship::Own,
            _ => Relationship::Competitor,
        }
    }
}

/// A tracked social account within an account set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_set: String,
    pub handle: String,
    pub platform: Platform,
    pub relationship: Relationship,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Generate a URL-safe slug from the account handle.
    #[must_use]
    pub fn slug(&self) -> String {
        self.handle
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}
