//! Build a [`Document`] from transcript XML.
//!
//! Tree construction is the only step that can reject a document. Once a `Document`
//! exists, walking it never fails on content, only on output.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use roxmltree::ParsingOptions;
use tracing::debug;

use crate::node::Node;
use crate::record::DocumentMeta;
use crate::{Error, Result};

/// `text_type` used when the header has no speech event term.
pub const DEFAULT_TEXT_TYPE: &str = "NA";

/// One parsed transcript: its header metadata and the element children of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub meta: DocumentMeta,
    /// Element children of every `BODY`, in document order. Not all are utterances.
    pub body: Vec<Node>,
}

impl Document {
    /// Parse transcript XML.
    ///
    /// `fallback_id` names the document in errors and stands in for `original_doc` when
    /// the root element carries no `ID` attribute.
    pub fn parse(xml: &str, fallback_id: &str) -> Result<Self> {
        let opts = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let tree = roxmltree::Document::parse_with_options(xml, opts).map_err(|source| {
            Error::Malformed {
                document: fallback_id.to_owned(),
                source,
            }
        })?;

        let root = tree.root_element();
        let original_doc = root.attribute("ID").unwrap_or(fallback_id).to_owned();

        let text_type = root
            .descendants()
            .find(|n| n.has_tag_name("TERM") && n.attribute("TYPE") == Some("SPEECHEVENT"))
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TEXT_TYPE)
            .to_owned();

        let body = root
            .descendants()
            .filter(|n| n.has_tag_name("BODY"))
            .flat_map(|b| b.children().filter(|c| c.is_element()))
            .map(build_node)
            .collect();

        Ok(Self {
            meta: DocumentMeta {
                text_type,
                original_doc,
            },
            body,
        })
    }

    /// Read and parse a transcript file. The file stem is the fallback document id.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = document_name(path);

        let xml = decode(&bytes, &name)?;
        Self::parse(&xml, &name)
    }
}

/// Decode raw transcript bytes into text.
///
/// A byte order mark wins; otherwise the `encoding` of the XML declaration is used, and
/// UTF-8 when there is none. Unknown encodings and undecodable bytes are errors.
pub fn decode(bytes: &[u8], document: &str) -> Result<String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => {
            let encoding = match declared_encoding(bytes) {
                Some(label) => Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                    Error::Encoding {
                        document: document.to_owned(),
                        encoding: label.to_owned(),
                    }
                })?,
                None => UTF_8,
            };
            (encoding, bytes)
        }
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(Error::Encoding {
            document: document.to_owned(),
            encoding: encoding.name().to_owned(),
        });
    }
    if encoding != UTF_8 {
        debug!(document, encoding = encoding.name(), "decoded transcript");
    }

    Ok(text.into_owned())
}

/// The `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    let rest = bytes.get(start..)?;
    if !rest.starts_with(b"<?xml") {
        return None;
    }
    let end = rest.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&rest[..end]).ok()?;

    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    Some(&value[..value.find(quote)?])
}

/// The name a transcript file is known by: its file stem.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Convert one XML element into a `Node`.
///
/// Text nodes before the first element child become the node's text. Text nodes after a
/// child, up to the next element, become that child's tail. Comments and processing
/// instructions are skipped, so text on either side of them is joined.
fn build_node(element: roxmltree::Node<'_, '_>) -> Node {
    let mut node = Node::new(element.tag_name().name());
    for attr in element.attributes() {
        node.attributes
            .insert(attr.name().to_owned(), attr.value().to_owned());
    }

    let mut last: Option<Node> = None;
    for child in element.children() {
        if child.is_element() {
            if let Some(prev) = last.replace(build_node(child)) {
                node.children.push(prev);
            }
        } else if child.is_text() {
            let Some(text) = child.text() else { continue };
            match last.as_mut() {
                Some(prev) => append(&mut prev.tail, text),
                None => append(&mut node.text, text),
            }
        }
    }
    if let Some(prev) = last {
        node.children.push(prev);
    }

    node
}

fn append(slot: &mut Option<String>, text: &str) {
    slot.get_or_insert_with(String::new).push_str(text);
}
