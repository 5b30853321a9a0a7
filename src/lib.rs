//! `micase` flattens nested, annotated MICASE transcript XML into line-oriented
//! utterance records.
//!
//! This crate provides:
//! - XML ingest into a classified element tree
//! - The utterance walk that attributes every text fragment to its speaker
//! - Pluggable output encoders (annotated blocks, JSON Lines)
//! - A batch driver that converts a directory one document at a time
//!
//! Fetching transcripts from the corpus site lives in the `micase-fetch` binary.

mod error;
pub use error::{Error, Result};

// High-level API (most consumers should start here).
pub mod batch;
pub mod convert;
pub mod opts;

// Input tree.
pub mod document;
pub mod node;

// Records and the walk that produces them.
pub mod emitter;
pub mod record;
pub mod walker;

// Output selection and encoder interfaces.
pub mod output_type;
pub mod record_encoder;

// Output encoders that serialize records into various formats.
pub mod annotated_encoder;
pub mod json_lines_encoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;
