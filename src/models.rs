//! Core data structures and types for equity merging.
//!
//! Defines seasons, canal banks, parsed filename tokens and
//! processing statistics used throughout the library.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Reporting season encoded in each input filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Dry,
    Wet,
    Transition,
}

impl Season {
    /// Parse a season token case-insensitively
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "dry" => Some(Season::Dry),
            "wet" => Some(Season::Wet),
            "transition" => Some(Season::Transition),
            _ => None,
        }
    }

    /// Title-cased label written to the Season column
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Dry => "Dry",
            Season::Wet => "Wet",
            Season::Transition => "Transition",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canal bank decoded from a block code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bank {
    Left,
    Right,
}

impl Bank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bank::Left => "Left",
            Bank::Right => "Right",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season, month and year parsed from an input filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameToken {
    pub season: Season,
    /// Zero-padded month number, "01" through "12"
    pub month: String,
    pub year: i32,
    /// Three-letter English month abbreviation
    pub month_name: String,
}

impl FilenameToken {
    /// Month as an integer (1-12)
    pub fn month_number(&self) -> i32 {
        self.month.parse().unwrap_or_default()
    }
}

impl fmt::Display for FilenameToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.season, self.month_name, self.year, self.month
        )
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub total_records: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
