// ID3 frame records and their staged mutations

use std::fmt;

use crate::error::Result;
use crate::field_mapping::Field;
use crate::id3::v1::{self, V1Record};
use crate::id3::v2::V2Body;
use crate::id3::tag::V1_GENRE_NONE;
use crate::id3::{Id3Version, Tag, TagLayout, TagValue};

/// Change waiting to be folded into the stream bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameState {
    #[default]
    Unchanged,
    /// New bytes for a frame that is already in the stream
    PendingReplace(Vec<u8>),
    /// Excise the frame's bytes and drop the frame
    PendingRemove,
    /// Splice the frame's bytes in after the tag header
    PendingInsert,
}

#[derive(Debug, Clone)]
enum FrameBody {
    V1(V1Record),
    V2(V2Body),
}

/// One on-disk record: the ID3v1 trailer or a single ID3v2 frame.
///
/// `bytes` always mirrors what is currently in the stream at `offset`.
/// Edits go through the frame's tags and are turned into a [`FrameState`] by
/// [`Frame::commit`].
#[derive(Debug, Clone)]
pub struct Frame {
    bytes: Vec<u8>,
    offset: Option<usize>,
    state: FrameState,
    body: FrameBody,
}

impl Frame {
    /// Parse an ID3v2 frame found at `offset`
    pub fn parse_v2(bytes: &[u8], offset: usize) -> Result<Self> {
        let body = V2Body::parse(bytes)?;
        Ok(Frame {
            bytes: bytes.to_vec(),
            offset: Some(offset),
            state: FrameState::Unchanged,
            body: FrameBody::V2(body),
        })
    }

    /// Parse the trailer found at `offset`
    pub fn parse_v1(record: &[u8; v1::TAG_SIZE], offset: usize) -> Self {
        Self::v1_at(record, Some(offset))
    }

    /// An empty trailer for a buffer that has none. It reads as all absent
    /// and is appended to the buffer the first time a field is written.
    pub fn blank_v1() -> Self {
        let mut record = [0u8; v1::TAG_SIZE];
        record[..3].copy_from_slice(&v1::TAG_ID);
        record[v1::TAG_SIZE - 1] = V1_GENRE_NONE;
        Self::v1_at(&record, None)
    }

    fn v1_at(record: &[u8; v1::TAG_SIZE], offset: Option<usize>) -> Self {
        Frame {
            bytes: record.to_vec(),
            offset,
            state: FrameState::Unchanged,
            body: FrameBody::V1(V1Record::parse(record)),
        }
    }

    /// Create a new ID3v2 frame holding `value`, staged for insertion.
    ///
    /// Fails with a tag-set error for a URL that is not Latin-1.
    pub fn from_value(field: Field, value: &TagValue, version: Id3Version) -> Result<Self> {
        let (body, bytes) = V2Body::from_value(field, value, version)?;
        Ok(Frame {
            bytes,
            offset: None,
            state: FrameState::Unchanged,
            body: FrameBody::V2(body),
        })
    }

    /// Like [`Frame::from_value`], naming the field as text.
    ///
    /// Fails with a tag-set error for names outside the field vocabulary.
    pub fn from_name(name: &str, value: &TagValue, version: Id3Version) -> Result<Self> {
        Self::from_value(name.parse()?, value, version)
    }

    /// `TAG` for the trailer, the four character frame ID otherwise
    pub fn title(&self) -> &str {
        match &self.body {
            FrameBody::V1(_) => "TAG",
            FrameBody::V2(body) => body.id(),
        }
    }

    pub fn layout(&self) -> TagLayout {
        match self.body {
            FrameBody::V1(_) => TagLayout::Id3v1,
            FrameBody::V2(_) => TagLayout::Id3v2,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Where `bytes` start in the stream, if the frame is in it
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn is_changed(&self) -> bool {
        self.state != FrameState::Unchanged
    }

    pub fn tags(&self) -> &[Tag] {
        match &self.body {
            FrameBody::V1(record) => record.tags(),
            FrameBody::V2(body) => std::slice::from_ref(&body.tag),
        }
    }

    pub fn tags_mut(&mut self) -> &mut [Tag] {
        match &mut self.body {
            FrameBody::V1(record) => record.tags_mut(),
            FrameBody::V2(body) => std::slice::from_mut(&mut body.tag),
        }
    }

    /// Fold the tags' staged edits into this frame's state.
    ///
    /// Staged tag payloads are committed here; the stream bytes are not
    /// touched until [`FrameStream::apply_pending`](crate::id3::FrameStream::apply_pending).
    pub fn commit(&mut self) {
        match &mut self.body {
            FrameBody::V1(record) => {
                if record.tags().iter().all(|tag| tag.pending().is_none()) {
                    return;
                }
                let rebuilt = record.rebuild();
                self.state = if rebuilt == self.bytes {
                    FrameState::Unchanged
                } else {
                    FrameState::PendingReplace(rebuilt)
                };
            }
            FrameBody::V2(body) => {
                let rebuilt = body.tag.pending().map(|payload| body.encode_frame(payload));
                body.tag.commit();
                let inserting = body.tag.take_insert() || self.state == FrameState::PendingInsert;

                if body.tag.is_marked_for_removal() {
                    self.state = FrameState::PendingRemove;
                } else if inserting {
                    // Not in the stream yet, so the new bytes are simply adopted
                    if let Some(rebuilt) = rebuilt {
                        self.bytes = rebuilt;
                    }
                    self.state = FrameState::PendingInsert;
                } else if let Some(rebuilt) = rebuilt {
                    self.state = if rebuilt == self.bytes {
                        FrameState::Unchanged
                    } else {
                        FrameState::PendingReplace(rebuilt)
                    };
                }
            }
        }
    }

    pub(crate) fn take_state(&mut self) -> FrameState {
        std::mem::take(&mut self.state)
    }

    /// Record that the frame now sits at `offset` holding `bytes`
    pub(crate) fn settle(&mut self, offset: Option<usize>, bytes: Vec<u8>) {
        self.offset = offset;
        self.bytes = bytes;
    }

    pub(crate) fn set_offset(&mut self, offset: Option<usize>) {
        self.offset = offset;
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.title())?;
        for (index, tag) in self.tags().iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match tag.value() {
                Some(value) => write!(f, "{}:{}", tag.field(), value)?,
                None => write!(f, "{}:None", tag.field())?,
            }
        }
        f.write_str(")")
    }
}
