use serde::Serialize;

use crate::node::{L1, Node, PERSON_ID, SP_STATUS};

/// Placeholder written for every record's `discipline` field.
pub const DISCIPLINE: &str = "NA";

/// Placeholder written for every record's `sentence_id` field.
pub const SENTENCE_ID: &str = "TBD";

/// The speaker metadata a text fragment is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Speaker {
    pub sp_status: String,
    pub l1: String,
    pub person_id: String,
}

impl Speaker {
    /// Resolve the speaker of an utterance element, applying the attribute defaults.
    pub fn from_node(node: &Node) -> Self {
        Self {
            sp_status: SP_STATUS.resolve(node).to_owned(),
            l1: L1.resolve(node).to_owned(),
            person_id: PERSON_ID.resolve(node).to_owned(),
        }
    }
}

/// Document-level fields shared by every record of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub text_type: String,
    pub original_doc: String,
}

/// One emitted utterance record.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Record {
    pub sp_status: String,
    pub l1: String,
    pub person_id: String,
    pub discipline: &'static str,
    pub text_type: String,
    pub original_doc: String,
    pub utterance_id: u64,
    pub sentence_id: &'static str,
    pub text: String,
}

impl Record {
    pub fn new(speaker: &Speaker, meta: &DocumentMeta, utterance_id: u64, text: &str) -> Self {
        Self {
            sp_status: speaker.sp_status.clone(),
            l1: speaker.l1.clone(),
            person_id: speaker.person_id.clone(),
            discipline: DISCIPLINE,
            text_type: meta.text_type.clone(),
            original_doc: meta.original_doc.clone(),
            utterance_id,
            sentence_id: SENTENCE_ID,
            text: text.to_owned(),
        }
    }
}
