/// Tagging errors
use thiserror::Error;

/// Result type alias using `TaggerError`
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Tagging error types
#[derive(Error, Debug)]
pub enum TaggerError {
    /// The path does not point at a file this codec handles
    #[error("File must be MP3 format: {0}")]
    OpenFile(String),

    /// An ID3v2 frame could not be built from its bytes
    #[error("Cannot initialize frame {frame_id}: {reason}")]
    FrameInit { frame_id: String, reason: String },

    /// A field could not be set to the requested value
    #[error("{0}")]
    TagSet(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TaggerError {
    pub(crate) fn not_settable(name: &str) -> Self {
        TaggerError::TagSet(format!("Tag {name} can't be set"))
    }
}
