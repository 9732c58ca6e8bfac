//! Run options. Defaults reproduce the plain `gis-simplifier <files>` behaviour.

use crate::error::{Error, Result};

/// Tolerance tuned on BAG exports. It is a distance in the units of the data's
/// CRS, so data in other coordinate systems usually needs its own value.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

pub const DEFAULT_SUFFIX: &str = "_simplified";

/// What to do when the derived output path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Ask through the prompt; only "Y" replaces.
    #[default]
    Ask,
    Overwrite,
    /// Pick the next free numbered name without asking.
    Rename,
    Fail,
}

impl ConflictPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ask" => Some(Self::Ask),
            "overwrite" => Some(Self::Overwrite),
            "rename" => Some(Self::Rename),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// Whether one failing file aborts the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    #[default]
    FailFast,
    KeepGoing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub tolerance: f64,
    pub suffix: String,
    pub conflict: ConflictPolicy,
    pub batch: BatchMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            suffix: DEFAULT_SUFFIX.to_string(),
            conflict: ConflictPolicy::default(),
            batch: BatchMode::default(),
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<()> {
        validate_tolerance(self.tolerance)
    }
}

pub(crate) fn validate_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTolerance(tolerance))
    }
}
