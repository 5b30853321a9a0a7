use std::io::Write;

use crate::Result;
use crate::record::Record;
use crate::record_encoder::RecordEncoder;

/// A `RecordEncoder` that writes one JSON object per line.
///
/// Each object carries the same nine fields as an annotated block, in the same order:
///
/// ```text
/// {"sp_status":"NRN","l1":"EST","person_id":"S1","discipline":"NA","text_type":"ADV","original_doc":"adv700ju023","utterance_id":1,"sentence_id":"TBD","text":"so. i see"}
/// ```
///
/// Line breaks inside utterance text are escaped, so every record stays on one line and
/// a document with no records produces an empty file.
pub struct JsonLinesEncoder<W: Write> {
    w: W,
    closed: bool,
}

impl<W: Write> JsonLinesEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.w
    }
}

impl<W: Write> RecordEncoder for JsonLinesEncoder<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write record: encoder is already closed",
            ));
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.w.write_all(&line)?;

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
