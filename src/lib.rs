//! Coverage-preserving simplification of GeoJSON files.
//!
//! Each input is loaded into a [`GeometryTable`], its polygons are simplified
//! as one coverage, and the result is written next to the input as
//! `{stem}_simplified{ext}`.

use std::path::{Path, PathBuf};

use tracing::{error, info};

pub mod config;
mod edges;
pub mod error;
pub mod naming;
mod ordinates;
pub mod prompt;
mod segment_index;
pub mod simplifier;
pub mod table;

pub use config::{BatchMode, ConflictPolicy, Options, DEFAULT_SUFFIX, DEFAULT_TOLERANCE};
pub use error::{Error, Result};
pub use naming::OutputTarget;
pub use prompt::{Prompt, Scripted, Terminal};
pub use simplifier::{simplify_coverage, SimplifyReport};
pub use table::{GeometryTable, InputFormat, Record};

/// Outcome of one successfully processed file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub features: usize,
    pub simplify: SimplifyReport,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<FileReport>,
    /// Only filled in `BatchMode::KeepGoing`.
    pub failed: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Paths from the command line, or a single prompted path when there are none.
pub fn resolve_inputs(args: Vec<String>, prompt: &mut dyn Prompt) -> Result<Vec<PathBuf>> {
    if !args.is_empty() {
        return Ok(args.into_iter().map(PathBuf::from).collect());
    }
    let answer = prompt.ask(prompt::PATH_QUESTION).map_err(Error::Prompt)?;
    Ok(vec![PathBuf::from(answer)])
}

/// Load, simplify, name and write a single file.
pub fn process_file(path: &Path, options: &Options, prompt: &mut dyn Prompt) -> Result<FileReport> {
    let mut table = GeometryTable::load(path)?;
    let simplify = table.simplify(options.tolerance)?;

    let candidate = naming::simplified_path(path, &options.suffix);
    let target = naming::resolve_output(candidate, options.conflict, prompt)?;
    table.write(&target)?;

    info!(
        input = %path.display(),
        output = %target.path.display(),
        vertices_before = simplify.vertices_before,
        vertices_after = simplify.vertices_after,
        "simplified"
    );
    Ok(FileReport {
        input: path.to_path_buf(),
        output: target.path,
        features: table.len(),
        simplify,
    })
}

/// Processes `files` in order. In `BatchMode::FailFast` the first error is
/// returned and outputs already written stay on disk.
pub fn process_files(files: &[PathBuf], options: &Options, prompt: &mut dyn Prompt) -> Result<BatchReport> {
    options.validate()?;
    let mut report = BatchReport::default();

    for (index, file) in files.iter().enumerate() {
        info!("Processing file {}/{}: {}", index + 1, files.len(), file.display());
        match process_file(file, options, prompt) {
            Ok(done) => report.processed.push(done),
            Err(e) if options.batch == BatchMode::KeepGoing => {
                error!(path = %file.display(), "{}", e);
                report.failed.push((file.clone(), e));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}
