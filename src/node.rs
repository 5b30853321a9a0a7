//! The transcript element tree as the walker sees it.
//!
//! Tags are classified exactly once, when the tree is ingested, so the walker can match
//! on a closed set of kinds instead of re-inspecting tag strings.

use std::collections::BTreeMap;

/// What a transcript element means to the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A speaker turn (`U`, and any tag beginning with `U`).
    Utterance,
    /// Speech overlapping another speaker (`OVERLAP*`).
    Overlap,
    /// A span in a non-target language (`FOREIGN`). Never transcribed.
    Foreign,
    /// Pauses, events, comments on delivery and everything else.
    Other,
}

impl NodeKind {
    /// Classify a tag name.
    ///
    /// The utterance prefix is checked before the overlap prefix, matching how the
    /// corpus markup has always been read.
    pub fn classify(tag: &str) -> Self {
        if tag.starts_with('U') {
            NodeKind::Utterance
        } else if tag.starts_with("OVERLAP") {
            NodeKind::Overlap
        } else if tag == "FOREIGN" {
            NodeKind::Foreign
        } else {
            NodeKind::Other
        }
    }
}

/// One transcript element, its text runs, and its element children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Raw text before the first element child.
    pub text: Option<String>,
    /// Raw text after this element's end tag, up to the next element sibling.
    pub tail: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    /// Create an element with no attributes, text, or children.
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            kind: NodeKind::classify(&tag),
            tag,
            attributes: BTreeMap::new(),
            text: None,
            tail: None,
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Leading text, trimmed. Whitespace-only text is absent.
    pub fn text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }

    /// Trailing text, trimmed. Whitespace-only text is absent.
    pub fn tail(&self) -> Option<&str> {
        non_blank(self.tail.as_deref())
    }

    pub fn is_utterance(&self) -> bool {
        self.kind == NodeKind::Utterance
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// An optional speaker attribute and the value used when it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePolicy {
    pub attribute: &'static str,
    pub default: &'static str,
}

impl AttributePolicy {
    /// Read the attribute from `node`, falling back to the default only when it is absent.
    pub fn resolve<'a>(&self, node: &'a Node) -> &'a str {
        node.attribute(self.attribute).unwrap_or(self.default)
    }
}

pub const PERSON_ID: AttributePolicy = AttributePolicy {
    attribute: "WHO",
    default: "",
};

pub const SP_STATUS: AttributePolicy = AttributePolicy {
    attribute: "NSS",
    default: "",
};

pub const L1: AttributePolicy = AttributePolicy {
    attribute: "FLANG",
    default: "English",
};
