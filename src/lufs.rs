//! Loudness target values accepted by the normalization backend.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quietest target the loudness control allows.
pub const MIN_TARGET_LUFS: f64 = -30.0;

/// Loudest target the loudness control allows.
pub const MAX_TARGET_LUFS: f64 = -6.0;

/// Target used when the user has not picked one for a file.
pub const DEFAULT_TARGET_LUFS: f64 = -23.0;

/// Quick presets: streaming platforms, podcasts, broadcast (EBU R128).
pub const PRESETS: [LufsPreset; 3] = [
    LufsPreset {
        name: "streaming",
        lufs: -14.0,
    },
    LufsPreset {
        name: "podcast",
        lufs: -16.0,
    },
    LufsPreset {
        name: "broadcast",
        lufs: -23.0,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LufsPreset {
    pub name: &'static str,
    pub lufs: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum LufsError {
    #[error("Target loudness {0} LUFS is outside the allowed range (-30 to -6)")]
    OutOfRange(f64),

    #[error("'{0}' is not a valid loudness value")]
    NotANumber(String),
}

/// A target loudness that is known to be inside the allowed range.
///
/// Every normalize request takes one of these, so an out-of-range value can
/// never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LufsTarget(f64);

impl LufsTarget {
    pub fn new(value: f64) -> Result<Self, LufsError> {
        if !value.is_finite() || !(MIN_TARGET_LUFS..=MAX_TARGET_LUFS).contains(&value) {
            return Err(LufsError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Looks up a preset by name ("streaming") or by magnitude ("14", "-14").
    pub fn preset(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        PRESETS
            .iter()
            .find(|p| {
                p.name.eq_ignore_ascii_case(trimmed)
                    || trimmed
                        .trim_start_matches('-')
                        .parse::<f64>()
                        .map(|v| -v == p.lufs)
                        .unwrap_or(false)
            })
            .map(|p| Self(p.lufs))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for LufsTarget {
    fn default() -> Self {
        Self(DEFAULT_TARGET_LUFS)
    }
}

impl fmt::Display for LufsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LufsTarget {
    type Err = LufsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .trim_end_matches("LUFS")
            .trim()
            .parse::<f64>()
            .map_err(|_| LufsError::NotANumber(s.to_string()))?;
        Self::new(value)
    }
}
