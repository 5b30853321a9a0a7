use crate::output_type::OutputType;

/// Options that control how a transcript is flattened.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that
/// other frontends (tests, batch jobs) can construct options programmatically.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    /// The desired output format for emitted records.
    pub output_type: OutputType,

    /// How trailing text after nested utterances is deferred back to the enclosing speaker.
    pub tail_policy: TailPolicy,
}

/// Which nested utterances may defer their trailing text to the enclosing speaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TailPolicy {
    /// Only one deferred tail may be in flight per call chain.
    ///
    /// Tails of utterances nested inside an already nested utterance are not emitted.
    /// This matches the reference corpus output.
    #[default]
    Outermost,

    /// Every nesting level defers the tails of its own nested utterances.
    EveryLevel,
}
