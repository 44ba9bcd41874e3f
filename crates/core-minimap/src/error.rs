use core_text::TextError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinimapError {
    /// The document could not resolve an offset or line.
    #[error("position lookup failed: {0}")]
    PositionResolution(#[from] TextError),
    #[error("unable to allocate a {width}x{height} pixel buffer")]
    CapacityExhausted { width: usize, height: usize },
    /// The edit descriptor disagrees with the current document.
    #[error(
        "edit at offset {offset} (old {old_len}, new {new_len}) is inconsistent with a document of {text_len} characters"
    )]
    InconsistentEdit {
        offset: usize,
        old_len: usize,
        new_len: usize,
        text_len: usize,
    },
    #[error("after-change notification without a matching before-change")]
    MissingBeforeChange,
}
