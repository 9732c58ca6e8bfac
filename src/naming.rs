//! Output file naming and conflict resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ConflictPolicy;
use crate::error::{Error, Result};
use crate::prompt::{overwrite_question, Prompt};

/// Where the writer should put a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    /// Truncate an existing file. When false the writer requires a fresh file.
    pub replace: bool,
}

/// Inserts `suffix` between the file stem and its extension.
pub fn simplified_path(input: &Path, suffix: &str) -> PathBuf {
    with_stem_suffix(input, suffix)
}

/// `{stem}_{index}{ext}` next to `candidate`.
pub fn numbered_path(candidate: &Path, index: u32) -> PathBuf {
    with_stem_suffix(candidate, &format!("_{}", index))
}

fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// First `numbered_path(candidate, i)` for i = 1, 2, ... that does not exist.
pub fn first_free_numbered(candidate: &Path) -> PathBuf {
    let mut index = 1;
    loop {
        let path = numbered_path(candidate, index);
        if !path.exists() {
            return path;
        }
        index += 1;
    }
}

pub fn resolve_output(
    candidate: PathBuf,
    policy: ConflictPolicy,
    prompt: &mut dyn Prompt,
) -> Result<OutputTarget> {
    if !candidate.exists() {
        return Ok(OutputTarget { path: candidate, replace: false });
    }

    let replace = match policy {
        ConflictPolicy::Overwrite => true,
        ConflictPolicy::Rename => false,
        ConflictPolicy::Fail => return Err(Error::OutputExists { path: candidate }),
        ConflictPolicy::Ask => {
            let answer = prompt
                .ask(&overwrite_question(&candidate))
                .map_err(Error::Prompt)?;
            answer.eq_ignore_ascii_case("y")
        }
    };

    if replace {
        info!(path = %candidate.display(), "replacing existing output");
        return Ok(OutputTarget { path: candidate, replace: true });
    }

    let path = first_free_numbered(&candidate);
    debug!(from = %candidate.display(), to = %path.display(), "output renamed");
    Ok(OutputTarget { path, replace: false })
}
