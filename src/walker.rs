//! Depth-first walk of a document's utterance tree.
//!
//! The walker turns each attributable text fragment into one record, in reading order:
//! an utterance's leading text, then each child's contribution, with text trailing a
//! nested utterance attributed back to the enclosing speaker once the nested subtree
//! has been fully written.
//!
//! Utterance ids are assigned at the moment a fragment is emitted. The counter is
//! threaded through the recursion by value and returned, so nothing outlives one document.

use tracing::debug;

use crate::Result;
use crate::document::Document;
use crate::emitter::emit;
use crate::node::{Node, NodeKind};
use crate::opts::TailPolicy;
use crate::record::{DocumentMeta, Speaker};
use crate::record_encoder::RecordEncoder;

/// Text trailing a nested utterance, owed to the enclosing speaker.
#[derive(Debug, Clone, Copy)]
pub struct PendingTail<'p> {
    pub speaker: &'p Speaker,
    pub text: Option<&'p str>,
}

/// The deferral state handed to a recursive `walk` call.
#[derive(Debug, Clone, Copy)]
pub enum Pending<'p> {
    /// No deferral is outstanding in this call chain.
    None,
    /// Flush this tail once the called utterance's subtree is done.
    Flush(PendingTail<'p>),
    /// An ancestor's deferral is outstanding; this call does not own one.
    InFlight,
}

/// Walks utterance trees and feeds records to an encoder.
pub struct Walker<'a, E: RecordEncoder + ?Sized> {
    encoder: &'a mut E,
    meta: &'a DocumentMeta,
    policy: TailPolicy,
}

impl<'a, E: RecordEncoder + ?Sized> Walker<'a, E> {
    pub fn new(encoder: &'a mut E, meta: &'a DocumentMeta, policy: TailPolicy) -> Self {
        Self {
            encoder,
            meta,
            policy,
        }
    }

    /// Walk every top-level utterance of `doc` and return how many records were written.
    ///
    /// Body children that are not utterances are skipped.
    pub fn walk_document(&mut self, doc: &Document) -> Result<u64> {
        let mut next_id = 1;
        for node in doc.body.iter().filter(|n| n.is_utterance()) {
            next_id = self.walk(node, next_id, Pending::None)?;
        }
        Ok(next_id - 1)
    }

    /// Walk one utterance and everything nested in it. Returns the next free utterance id.
    pub fn walk(&mut self, node: &Node, mut next_id: u64, pending: Pending<'_>) -> Result<u64> {
        let speaker = Speaker::from_node(node);

        if let Some(text) = node.text() {
            next_id = self.emit(&speaker, next_id, text)?;
        }

        for child in &node.children {
            match child.kind {
                NodeKind::Utterance => {
                    let nested = self.defer(&pending, &speaker, child);
                    next_id = self.walk(child, next_id, nested)?;
                }
                NodeKind::Overlap if child.text().is_some() => {
                    // Overlapping speech and the text after it read as one fragment.
                    let text = child
                        .text()
                        .into_iter()
                        .chain(child.tail())
                        .collect::<Vec<_>>()
                        .join(" ");
                    next_id = self.emit(&speaker, next_id, &text)?;
                }
                NodeKind::Foreign => {}
                NodeKind::Overlap | NodeKind::Other => {
                    if let Some(tail) = child.tail() {
                        next_id = self.emit(&speaker, next_id, tail)?;
                    }
                }
            }
        }

        if let Pending::Flush(PendingTail {
            speaker: parent,
            text: Some(text),
        }) = pending
        {
            next_id = self.emit(parent, next_id, text)?;
        }

        Ok(next_id)
    }

    /// Decide what a nested utterance `child` of the current speaker receives.
    fn defer<'p>(
        &self,
        pending: &Pending<'_>,
        speaker: &'p Speaker,
        child: &'p Node,
    ) -> Pending<'p> {
        let open = match self.policy {
            TailPolicy::EveryLevel => true,
            TailPolicy::Outermost => matches!(pending, Pending::None),
        };

        if open {
            return Pending::Flush(PendingTail {
                speaker,
                text: child.tail(),
            });
        }

        if let Some(tail) = child.tail() {
            debug!(
                original_doc = %self.meta.original_doc,
                person_id = %speaker.person_id,
                tail,
                "tail of deeply nested utterance not emitted"
            );
        }
        Pending::InFlight
    }

    fn emit(&mut self, speaker: &Speaker, next_id: u64, text: &str) -> Result<u64> {
        if emit(&mut *self.encoder, self.meta, speaker, next_id, text)? {
            Ok(next_id + 1)
        } else {
            Ok(next_id)
        }
    }
}
