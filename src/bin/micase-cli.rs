use anyhow::{Context, Result};
use clap::Parser;

use std::io;
use std::path::PathBuf;

use micase::batch::{Outcome, convert_dir};
use micase::document::{Document, document_name};
use micase::logging;
use micase::opts::{Opts, TailPolicy};
use micase::output_type::OutputType;

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();
    let opts = params.opts();

    if params.input.is_file() {
        let doc = Document::from_path(&params.input).with_context(|| {
            format!("failed to parse {}", document_name(&params.input))
        })?;
        let stdout = io::stdout();
        micase::convert::write_document(&doc, stdout.lock(), &opts)?;
        return Ok(());
    }

    let report = convert_dir(&params.input, &params.output_dir, &opts)?;
    if report.is_empty() {
        println!("No documents found in {}", params.input.display());
        return Ok(());
    }

    for outcome in &report.outcomes {
        match outcome {
            Outcome::Converted { output, .. } => {
                println!("Created text file: {}", output.display());
            }
            Outcome::Failed { document, error } => {
                eprintln!("Parse error in file {document}: {error}");
            }
        }
    }

    println!(
        "Converted {} of {} documents",
        report.converted().count(),
        report.outcomes.len()
    );
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "micase")]
#[command(about = "Flatten MICASE XML transcripts into annotated utterance records")]
struct Params {
    /// A transcript file (written to stdout) or a directory of transcripts.
    #[arg(short = 'i', long = "input", default_value = "XMLs")]
    pub input: PathBuf,

    /// Directory for per-document output files (created if missing).
    #[arg(short = 'd', long = "output-dir", default_value = "XML_Data")]
    pub output_dir: PathBuf,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Annotated
    )]
    pub output_type: OutputType,

    /// Which nested utterances may hand their trailing text back to the enclosing speaker.
    #[arg(long = "tail-policy", value_enum, default_value_t = TailPolicy::Outermost)]
    pub tail_policy: TailPolicy,
}

impl Params {
    fn opts(&self) -> Opts {
        Opts {
            output_type: self.output_type,
            tail_policy: self.tail_policy,
        }
    }
}
