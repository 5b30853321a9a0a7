/// The supported output formats for emitted utterance records.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of output formats
///   across the CLI and library code.
/// - Each variant maps to a concrete `RecordEncoder` implementation.
///
/// Integration notes:
/// - With the `cli` feature, `ValueEnum` lets this enum be used directly as a `clap` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// The `# key = value` annotated block format, one block per utterance.
    #[default]
    Annotated,

    /// One JSON object per record, one record per line.
    JsonLines,
}

impl OutputType {
    /// File extension used for per-document output files.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Annotated => "txt",
            OutputType::JsonLines => "jsonl",
        }
    }
}
