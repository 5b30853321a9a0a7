use std::io::Write;

use crate::Result;
use crate::record::Record;
use crate::record_encoder::RecordEncoder;

/// A `RecordEncoder` that writes the annotated block format.
///
/// Each record becomes one block:
///
/// ```text
/// # sp_status = NRN
/// # l1 = EST
/// # person_id = S1
/// # discipline = NA
/// # text_type = ADV
/// # original_doc = adv700ju023
/// # utterance_id = 1
/// # sentence_id = TBD
/// so. i see that you're from Hartland Michigan
///
/// ```
///
/// Missing metadata is written as an empty value, never as an omitted line.
pub struct AnnotatedEncoder<W: Write> {
    w: W,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> AnnotatedEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> RecordEncoder for AnnotatedEncoder<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write record: encoder is already closed",
            ));
        }

        // The block is formatted up front and written with a single call so a failing
        // writer never leaves half a header behind.
        let block = format_block(record);
        self.w.write_all(block.as_bytes())?;

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

fn format_block(record: &Record) -> String {
    format!(
        "# sp_status = {}\n\
         # l1 = {}\n\
         # person_id = {}\n\
         # discipline = {}\n\
         # text_type = {}\n\
         # original_doc = {}\n\
         # utterance_id = {}\n\
         # sentence_id = {}\n\
         {}\n\n",
        record.sp_status,
        record.l1,
        record.person_id,
        record.discipline,
        record.text_type,
        record.original_doc,
        record.utterance_id,
        record.sentence_id,
        record.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DocumentMeta, Speaker};

    fn record(id: u64, person_id: &str, text: &str) -> Record {
        let speaker = Speaker {
            sp_status: "NRN".to_string(),
            l1: "EST".to_string(),
            person_id: person_id.to_string(),
        };
        let meta = DocumentMeta {
            text_type: "ADV".to_string(),
            original_doc: "adv700ju023".to_string(),
        };
        Record::new(&speaker, &meta, id, text)
    }

    #[test]
    fn annotated_close_without_records_emits_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = AnnotatedEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "");
        Ok(())
    }

    #[test]
    fn annotated_writes_exact_block() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = AnnotatedEncoder::new(&mut out);
        enc.write_record(&record(1, "S1", "so. i see that you're from Hartland Michigan"))?;
        enc.close()?;

        assert_eq!(
            std::str::from_utf8(&out)?,
            "# sp_status = NRN\n\
             # l1 = EST\n\
             # person_id = S1\n\
             # discipline = NA\n\
             # text_type = ADV\n\
             # original_doc = adv700ju023\n\
             # utterance_id = 1\n\
             # sentence_id = TBD\n\
             so. i see that you're from Hartland Michigan\n\n"
        );
        Ok(())
    }

    #[test]
    fn annotated_renders_missing_fields_as_empty_values() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = AnnotatedEncoder::new(&mut out);
        let mut rec = record(3, "", "yes");
        rec.sp_status.clear();
        enc.write_record(&rec)?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("# sp_status = \n"));
        assert!(s.contains("# person_id = \n"));
        assert_eq!(s.lines().count(), 10);
        Ok(())
    }

    #[test]
    fn annotated_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = AnnotatedEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_record(&record(1, "S1", "nope")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
