use tracing::trace;

use crate::Result;
use crate::record::{DocumentMeta, Record, Speaker};
use crate::record_encoder::RecordEncoder;

/// Emit one record for `text` if it has any content.
///
/// `text` is trimmed first. Empty or whitespace-only text is the only thing filtered out:
/// nothing is written and `Ok(false)` tells the caller the utterance id was not consumed.
pub fn emit<E>(
    encoder: &mut E,
    meta: &DocumentMeta,
    speaker: &Speaker,
    utterance_id: u64,
    text: &str,
) -> Result<bool>
where
    E: RecordEncoder + ?Sized,
{
    let text = text.trim();
    if text.is_empty() {
        return Ok(false);
    }

    trace!(
        utterance_id,
        person_id = %speaker.person_id,
        original_doc = %meta.original_doc,
        "emit record"
    );
    encoder.write_record(&Record::new(speaker, meta, utterance_id, text))?;
    Ok(true)
}
