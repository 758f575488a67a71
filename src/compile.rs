//! Rule-list discovery and batch compilation via the external converter.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::{Error, Result};

/// Extension of rule-list documents.
pub const RULE_EXT: &str = "yaml";

/// Extension of compiled rule-set artifacts.
pub const COMPILED_EXT: &str = "mrs";

/// Recursively find rule-list documents under `rules_dir`.
///
/// Everything under `output_dir` is pruned so compiled artifacts are never
/// picked up again. Results are sorted for stable batch order.
pub fn discover(rules_dir: &Path, output_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(rules_dir)
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(output_dir))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().map_or(false, |ext| ext == RULE_EXT))
        .collect();
    files.sort();
    files
}

/// Compute the mirrored output path for a rule-list document.
///
/// The path relative to `rules_dir` is reproduced under `output_dir` with
/// the extension swapped to the compiled-artifact extension.
pub fn output_path(input: &Path, rules_dir: &Path, output_dir: &Path) -> PathBuf {
    let relative = input.strip_prefix(rules_dir).unwrap_or(input);
    output_dir.join(relative).with_extension(COMPILED_EXT)
}

/// Outcome tally for a batch compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    /// Number of documents processed.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// True when every discovered document converted.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Batch compiler driving the external converter once per document.
pub struct BatchCompiler {
    tool: PathBuf,
    rules_dir: PathBuf,
    output_dir: PathBuf,
}

impl BatchCompiler {
    /// Create a compiler using the converter binary at `tool`.
    pub fn new(
        tool: impl AsRef<Path>,
        rules_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            tool: tool.as_ref().to_path_buf(),
            rules_dir: rules_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Convert a single rule-list document to the compiled format.
    ///
    /// Returns the output path on success. The converter runs without a
    /// timeout; a hung tool hangs the batch.
    pub fn compile_file(&self, input: &Path) -> Result<PathBuf> {
        let output = output_path(input, &self.rules_dir, &self.output_dir);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let result = Command::new(&self.tool)
            .arg("convert-ruleset")
            .arg("domain")
            .arg("yaml")
            .arg(input)
            .arg(&output)
            .output()
            .map_err(|e| Error::Conversion {
                input: input.to_path_buf(),
                detail: e.to_string(),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(Error::Conversion {
                input: input.to_path_buf(),
                detail: stderr,
            });
        }

        Ok(output)
    }

    /// Convert every discovered document, isolating per-file failures.
    ///
    /// A failing conversion is logged with the tool's diagnostic output and
    /// counted; the batch continues. Fails outright only when discovery
    /// finds nothing at all.
    pub fn run(&self) -> Result<BatchReport> {
        let files = discover(&self.rules_dir, &self.output_dir);
        if files.is_empty() {
            return Err(Error::NoRuleFiles(self.rules_dir.clone()));
        }

        log::info!("Found {} rule-list documents", files.len());
        let mut report = BatchReport::default();

        for input in &files {
            match self.compile_file(input) {
                Ok(output) => {
                    log::info!("{} -> {}", input.display(), output.display());
                    report.succeeded += 1;
                }
                Err(e) => {
                    log::error!("{}", e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
