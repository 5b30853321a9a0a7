//! Convert a directory of transcripts, one output file per document.
//!
//! Each document is converted on its own: a transcript that fails to parse (or to be
//! written) is reported in the [`BatchReport`] and the batch moves on. Output goes to a
//! temporary file in the output directory and is only renamed into place once the
//! encoder has been closed, so a failed document never leaves a partial file behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use crate::Result;
use crate::convert::write_document;
use crate::document::{Document, document_name};
use crate::opts::Opts;

/// Suffix appended to the document name for output files.
pub const OUTPUT_SUFFIX: &str = "_Parsed";

/// What happened to one document.
#[derive(Debug)]
pub enum Outcome {
    Converted {
        document: String,
        output: PathBuf,
        records: u64,
    },
    Failed {
        document: String,
        error: crate::Error,
    },
}

impl Outcome {
    pub fn document(&self) -> &str {
        match self {
            Outcome::Converted { document, .. } | Outcome::Failed { document, .. } => document,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, Outcome::Converted { .. })
    }
}

/// One outcome per input document, in the order the documents were processed.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn converted(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_converted())
    }

    pub fn failed(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_converted())
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// List the transcript files in `input_dir`, sorted by file name.
///
/// Entries that are not regular files are logged and skipped.
pub fn discover(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input dir: {}", input_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        } else {
            warn!(path = %path.display(), "skipping entry that is not a file");
        }
    }
    files.sort();
    Ok(files)
}

/// Where the output for `document` goes in `output_dir`.
pub fn output_path(output_dir: &Path, document: &str, opts: &Opts) -> PathBuf {
    output_dir.join(format!(
        "{document}{OUTPUT_SUFFIX}.{}",
        opts.output_type.extension()
    ))
}

/// Convert every transcript in `input_dir` into `output_dir`.
///
/// Only failures to read the input directory or create the output directory are
/// returned as errors. Per-document failures land in the report.
pub fn convert_dir(input_dir: &Path, output_dir: &Path, opts: &Opts) -> Result<BatchReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let files = discover(input_dir)?;
    if files.is_empty() {
        warn!(input_dir = %input_dir.display(), "no documents found");
        return Ok(BatchReport::default());
    }

    let mut report = BatchReport::default();
    for path in &files {
        let document = document_name(path);
        let outcome = match convert_file(path, output_dir, opts) {
            Ok((output, records)) => {
                info!(%document, output = %output.display(), records, "created output file");
                Outcome::Converted {
                    document,
                    output,
                    records,
                }
            }
            Err(err) => {
                error!(%document, error = %err, "failed to convert document");
                Outcome::Failed {
                    document,
                    error: err,
                }
            }
        };
        report.outcomes.push(outcome);
    }

    Ok(report)
}

/// Convert one transcript file into `output_dir`. Returns the output path and record count.
pub fn convert_file(path: &Path, output_dir: &Path, opts: &Opts) -> Result<(PathBuf, u64)> {
    // Parse before touching the output directory: malformed input produces no file.
    let doc = Document::from_path(path)?;
    let dest = output_path(output_dir, &document_name(path), opts);

    let mut tmp = NamedTempFile::new_in(output_dir)?;
    let records = write_document(&doc, tmp.as_file_mut(), opts)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&dest)?;

    Ok((dest, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output_type::OutputType;

    #[test]
    fn output_path_follows_format() {
        let dir = Path::new("/out");
        assert_eq!(
            output_path(dir, "adv700ju023", &Opts::default()),
            PathBuf::from("/out/adv700ju023_Parsed.txt")
        );
        let json_lines = Opts {
            output_type: OutputType::JsonLines,
            ..Opts::default()
        };
        assert_eq!(
            output_path(dir, "adv700ju023", &json_lines),
            PathBuf::from("/out/adv700ju023_Parsed.jsonl")
        );
    }

    #[test]
    fn discover_lists_files_sorted_and_skips_dirs() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.xml"), "<A/>")?;
        fs::write(dir.path().join("a.xml"), "<A/>")?;
        fs::create_dir(dir.path().join("nested"))?;

        let files = discover(dir.path())?;
        let names: Vec<_> = files.iter().map(|p| document_name(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn empty_input_dir_yields_empty_report() -> anyhow::Result<()> {
        let input = tempfile::tempdir()?;
        let output = tempfile::tempdir()?;
        let report = convert_dir(input.path(), output.path(), &Opts::default())?;
        assert!(report.is_empty());
        Ok(())
    }

    #[test]
    fn missing_input_dir_is_an_error() -> anyhow::Result<()> {
        let output = tempfile::tempdir()?;
        let missing = output.path().join("does-not-exist");
        let err = convert_dir(&missing, output.path(), &Opts::default()).unwrap_err();
        assert!(err.to_string().contains("failed to read input dir"));
        Ok(())
    }

    #[test]
    fn failed_document_leaves_no_output_or_temp_file() -> anyhow::Result<()> {
        let input = tempfile::tempdir()?;
        let output = tempfile::tempdir()?;
        fs::write(input.path().join("svc999mx104.xml"), "<MICASE><BODY><U>cut")?;

        let report = convert_dir(input.path(), output.path(), &Opts::default())?;
        assert_eq!(report.failed().count(), 1);
        assert_eq!(fs::read_dir(output.path())?.count(), 0);
        Ok(())
    }
}
