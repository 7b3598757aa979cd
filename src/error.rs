use std::io;
use thiserror::Error;

/// The crate's single error surface.
///
/// Decode failures fall into exactly three kinds: [`MixError::Format`] when
/// the buffer is not a MIX1 package at all, [`MixError::Integrity`] when the
/// structure is recognised but a checksum or offset disagrees with the
/// buffer, and [`MixError::Parse`] for anything else, wrapping its cause.
/// [`MixError::InvalidEntry`] is the encode-side precondition failure.
#[derive(Error, Debug)]
pub enum MixError {
    #[error("not a MIX package: {0}")]
    Format(&'static str),

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("failed to parse MIX package")]
    Parse(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid entry {name:?}: {reason}")]
    InvalidEntry { name: String, reason: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
