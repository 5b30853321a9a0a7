use crate::Result;
use crate::record::Record;

/// An output sink for utterance records.
///
/// `close` flushes the underlying writer and must be idempotent. Writing after `close`
/// is an error.
pub trait RecordEncoder {
    fn write_record(&mut self, record: &Record) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Collects records in memory. Handy for callers that post-process records themselves.
#[derive(Debug, Default)]
pub struct VecEncoder {
    pub records: Vec<Record>,
    closed: bool,
}

impl VecEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordEncoder for VecEncoder {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write record: encoder is already closed",
            ));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
