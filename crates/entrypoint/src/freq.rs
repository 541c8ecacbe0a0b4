//! Friendly names for frequency strings
//!
//! Only the base offset is inspected, so `7D` is still daily.

use std::fmt;

use crate::errors::{EntrypointError, Result};

const WEEKDAY_ANCHORS: [&str; 7] = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreqName {
    Daily,
    Weekly,
}

impl FreqName {
    pub fn as_str(self) -> &'static str {
        match self {
            FreqName::Daily => "daily",
            FreqName::Weekly => "weekly",
        }
    }

    /// File receiving the per-series wMAPE table.
    pub fn wmape_file_name(self) -> String {
        format!("{}-wmapes.csv", self.as_str())
    }
}

impl fmt::Display for FreqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a frequency string such as `D`, `3D`, `W` or `W-SUN` to its name.
pub fn freq_name(freq: &str) -> Result<FreqName> {
    let unsupported = || EntrypointError::UnsupportedFrequency(freq.to_string());

    let base = freq.trim().trim_start_matches(|c: char| c.is_ascii_digit());
    let (head, anchor) = match base.split_once('-') {
        Some((head, anchor)) => (head, Some(anchor)),
        None => (base, None),
    };

    match (head, anchor) {
        ("D", None) => Ok(FreqName::Daily),
        ("W", None) => Ok(FreqName::Weekly),
        ("W", Some(day)) if WEEKDAY_ANCHORS.contains(&day) => Ok(FreqName::Weekly),
        _ => Err(unsupported()),
    }
}
