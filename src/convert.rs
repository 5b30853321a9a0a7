//! High-level API for flattening one transcript.
//!
//! This module wires parsing, the utterance walk, and an output encoder together while
//! keeping each of those testable in their own modules. The encoder is always closed,
//! whether or not the walk succeeded.

use std::io::{BufWriter, Write};

use tracing::info;

use crate::Result;
use crate::annotated_encoder::AnnotatedEncoder;
use crate::document::Document;
use crate::json_lines_encoder::JsonLinesEncoder;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::record_encoder::RecordEncoder;
use crate::walker::Walker;

/// Parse `xml` and write its records to `w`. Returns the number of records written.
///
/// Nothing is written when the document fails to parse.
pub fn convert<W: Write>(xml: &str, fallback_id: &str, w: W, opts: &Opts) -> Result<u64> {
    let doc = Document::parse(xml, fallback_id)?;
    write_document(&doc, w, opts)
}

/// Write an already parsed document to `w` in the format chosen by `opts`.
pub fn write_document<W: Write>(doc: &Document, w: W, opts: &Opts) -> Result<u64> {
    // Buffer output for efficiency (especially important for stdout).
    let writer = BufWriter::new(w);

    // We keep this explicit (no trait objects) so each encoder is closed by value.
    let records = match opts.output_type {
        OutputType::Annotated => {
            let mut encoder = AnnotatedEncoder::new(writer);
            let run_res = walk_into(doc, opts, &mut encoder);
            merge_run_and_close(run_res, encoder.close())?
        }
        OutputType::JsonLines => {
            let mut encoder = JsonLinesEncoder::new(writer);
            let run_res = walk_into(doc, opts, &mut encoder);
            merge_run_and_close(run_res, encoder.close())?
        }
    };

    info!(
        original_doc = %doc.meta.original_doc,
        text_type = %doc.meta.text_type,
        records,
        "document flattened"
    );
    Ok(records)
}

/// Walk `doc` into any encoder. The caller owns closing it.
pub fn walk_into<E>(doc: &Document, opts: &Opts, encoder: &mut E) -> Result<u64>
where
    E: RecordEncoder + ?Sized,
{
    Walker::new(encoder, &doc.meta, opts.tail_policy).walk_document(doc)
}

fn merge_run_and_close<T>(run_res: Result<T>, close_res: Result<()>) -> Result<T> {
    match (run_res, close_res) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(crate::Error::msg(format!(
            "{err}; additionally failed to close output: {close_err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<MICASE ID="off300mu001">
  <HEADER><TERM TYPE="SPEECHEVENT">OFC</TERM></HEADER>
  <BODY>
    <U WHO="S1" NSS="NS">hello there<U WHO="S2" NSS="NNS" FLANG="Korean">hi</U>thanks</U>
  </BODY>
</MICASE>"#;

    #[test]
    fn convert_writes_annotated_blocks() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let records = convert(XML, "off300mu001", &mut out, &Opts::default())?;
        assert_eq!(records, 3);

        let s = String::from_utf8(out)?;
        assert_eq!(s.matches("# discipline = NA\n").count(), 3);
        assert!(s.contains(
            "# sp_status = NNS\n# l1 = Korean\n# person_id = S2\n# discipline = NA\n\
             # text_type = OFC\n# original_doc = off300mu001\n# utterance_id = 2\n\
             # sentence_id = TBD\nhi\n\n"
        ));
        assert!(s.ends_with("# utterance_id = 3\n# sentence_id = TBD\nthanks\n\n"));
        Ok(())
    }

    #[test]
    fn convert_writes_json_lines_when_asked() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let opts = Opts {
            output_type: OutputType::JsonLines,
            ..Opts::default()
        };
        convert(XML, "off300mu001", &mut out, &opts)?;

        let lines = std::str::from_utf8(&out)?
            .lines()
            .map(serde_json::from_str)
            .collect::<std::result::Result<Vec<serde_json::Value>, _>>()?;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["l1"], "Korean");
        assert_eq!(lines[2]["person_id"], "S1");
        assert_eq!(lines[2]["utterance_id"], 3);
        assert_eq!(lines[2]["text"], "thanks");
        Ok(())
    }

    #[test]
    fn convert_writes_nothing_for_malformed_input() {
        let mut out = Vec::new();
        let err = convert("<MICASE><BODY>", "bad", &mut out, &Opts::default()).unwrap_err();
        assert!(err.is_malformed());
        assert!(out.is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn convert_surfaces_write_failures() {
        let err = convert(XML, "off300mu001", FailingWriter, &Opts::default()).unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }
}
