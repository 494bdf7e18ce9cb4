// ID3 metadata handling module
pub mod frames;
pub mod stream;
pub mod tag;
pub mod v1;
pub mod v2;

use std::fmt;

use serde::Serialize;

pub use frames::{Frame, FrameState};
pub use stream::FrameStream;
pub use tag::{Tag, TagValue};

/// Which of the two incompatible layouts a tag lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TagLayout {
    /// Fixed 128 byte trailer
    #[serde(rename = "ID3v1")]
    Id3v1,
    /// Header-prefixed frames
    #[serde(rename = "ID3v2")]
    Id3v2,
}

impl fmt::Display for TagLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagLayout::Id3v1 => f.write_str("ID3v1"),
            TagLayout::Id3v2 => f.write_str("ID3v2"),
        }
    }
}

/// Version reported by the leading bytes of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Id3Version {
    /// No ID3v2 signature; only a trailer can be present
    V1,
    /// ID3v2 with the given major revision (`2.3`, `2.4`, ...)
    V2(u8),
}

impl Id3Version {
    /// Classify a buffer by its first bytes: `ID3` followed by the major
    /// revision, or anything else
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [b'I', b'D', b'3', revision, ..] => Id3Version::V2(*revision),
            _ => Id3Version::V1,
        }
    }

    pub fn is_v2(self) -> bool {
        matches!(self, Id3Version::V2(_))
    }

    /// Whether new text frames should be written as UTF-8 rather than UTF-16
    pub fn prefers_utf8(self) -> bool {
        matches!(self, Id3Version::V2(revision) if revision >= 4)
    }
}

impl fmt::Display for Id3Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id3Version::V1 => f.write_str("1.1"),
            Id3Version::V2(revision) => write!(f, "2.{revision}"),
        }
    }
}

/// Selects which layouts field lookups and edits apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagVersion {
    V1,
    V2,
    #[default]
    Both,
}

impl TagVersion {
    pub fn includes(self, layout: TagLayout) -> bool {
        match self {
            TagVersion::V1 => layout == TagLayout::Id3v1,
            TagVersion::V2 => layout == TagLayout::Id3v2,
            TagVersion::Both => true,
        }
    }

    /// Layouts admitted by this selector, v1 first
    pub fn layouts(self) -> &'static [TagLayout] {
        match self {
            TagVersion::V1 => &[TagLayout::Id3v1],
            TagVersion::V2 => &[TagLayout::Id3v2],
            TagVersion::Both => &[TagLayout::Id3v1, TagLayout::Id3v2],
        }
    }
}
