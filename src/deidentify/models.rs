//! PHI detection data models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// PHI category targeted in clinical narrative
///
/// Categories are closed: adding one means adding a variant here and a parse alias in
/// [`PhiCategory::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhiCategory {
    /// Patient, client and clinician names
    Name,
    /// Birth, assessment and loss dates
    Date,
    /// Telephone numbers
    Phone,
    /// Claim, file and medical record numbers
    IdNumber,
}

impl PhiCategory {
    /// Label used inside placeholders (`[NAME_x1y2z3w4]`)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Date => "DATE",
            Self::Phone => "PHONE",
            Self::IdNumber => "ID_NUMBER",
        }
    }

    /// Parse a category label, accepting a few common aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NAME" | "PERSON" => Some(Self::Name),
            "DATE" => Some(Self::Date),
            "PHONE" | "TELEPHONE" => Some(Self::Phone),
            "ID_NUMBER" | "ID" | "IDENTIFIER" => Some(Self::IdNumber),
            _ => None,
        }
    }
}

impl fmt::Display for PhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate PHI span found in the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiMatch {
    /// Category of the rule that produced the match
    pub category: PhiCategory,
    /// Global rule priority (lower wins)
    pub priority: usize,
    /// Byte offset of the first matched byte
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
    /// Matched text
    pub value: String,
}

impl PhiMatch {
    /// Whether two spans share at least one byte
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Result of one deidentify call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeidentifyOutcome {
    /// Deidentified text
    pub text: String,
    /// Placeholders issued by this call, in text order
    pub placeholders: Vec<String>,
    /// Substitutions per category
    pub by_category: BTreeMap<PhiCategory, usize>,
}

impl DeidentifyOutcome {
    /// Total number of substitutions made
    pub fn substitutions(&self) -> usize {
        self.placeholders.len()
    }

    /// Check if anything was substituted
    pub fn has_substitutions(&self) -> bool {
        !self.placeholders.is_empty()
    }
}
