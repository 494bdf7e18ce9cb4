// Frame stream: the tag-bearing byte region of a file

use std::ops::Range;

use crate::field_mapping::FieldMappings;
use crate::id3::v1::{V1Record, TAG_SIZE};
use crate::id3::v2::{self, HEADER_LEN};
use crate::id3::{Frame, FrameState, Id3Version, Tag, TagLayout};
use crate::utils::io::find_subsequence;

/// Length of the ID3v2 tag header; new frames are spliced in right after it
pub const TAG_HEADER_LEN: usize = 10;

/// Owns the bytes of a file and the frames discovered in them.
///
/// Frames are views over the buffer kept consistent by [`apply_pending`].
/// Nothing in the buffer changes until then.
///
/// [`apply_pending`]: FrameStream::apply_pending
#[derive(Debug, Clone)]
pub struct FrameStream {
    bytes: Vec<u8>,
    frames: Option<Vec<Frame>>,
}

impl FrameStream {
    pub fn load(bytes: Vec<u8>) -> Self {
        FrameStream {
            bytes,
            frames: None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Version announced by the buffer's leading bytes
    pub fn version(&self) -> Id3Version {
        Id3Version::detect(&self.bytes)
    }

    /// Whether the last 128 bytes carry an ID3v1 signature
    pub fn has_v1_trailer(&self) -> bool {
        self.bytes.len() >= TAG_SIZE
            && V1Record::has_signature(&self.bytes[self.bytes.len() - TAG_SIZE..])
    }

    /// All frames, parsed on first access
    pub fn frames(&mut self) -> &[Frame] {
        self.frames_mut()
    }

    pub fn frames_mut(&mut self) -> &mut Vec<Frame> {
        let bytes = &self.bytes;
        self.frames.get_or_insert_with(|| parse_frames(bytes))
    }

    /// Every frame's tags, in frame order
    pub fn tags(&mut self) -> impl Iterator<Item = &Tag> + '_ {
        self.frames_mut().iter().flat_map(Frame::tags)
    }

    /// Add a frame built with [`Frame::from_value`]; it is spliced in by the
    /// next [`FrameStream::apply_pending`]
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames_mut().push(frame);
    }

    /// Turn every frame's staged tag edits into a frame state
    pub fn commit_frames(&mut self) {
        for frame in self.frames_mut().iter_mut() {
            frame.commit();
        }
    }

    /// Fold every staged change into the buffer and return it.
    ///
    /// Removed frames are excised and dropped, inserted frames are spliced in
    /// after the tag header, replaced frames are overwritten in place. Frames
    /// without a staged change are left untouched, so calling this again
    /// without further edits yields the same bytes.
    pub fn apply_pending(&mut self) -> &[u8] {
        self.commit_frames();
        let mut frames = self.frames.take().unwrap_or_default();
        let mut removed = vec![false; frames.len()];

        for index in 0..frames.len() {
            match frames[index].take_state() {
                FrameState::Unchanged => {}
                FrameState::PendingRemove => {
                    if let Some(start) = locate(&self.bytes, &frames[index]) {
                        let len = frames[index].bytes().len();
                        log::debug!("Removing {} ({len} bytes at {start})", frames[index].title());
                        self.bytes.drain(start..start + len);
                        shift_offsets(&mut frames, index, start..start + len, 0);
                    }
                    removed[index] = true;
                }
                FrameState::PendingInsert => {
                    let at = TAG_HEADER_LEN.min(self.bytes.len());
                    let frame = &frames[index];
                    log::debug!("Inserting {} ({} bytes at {at})", frame.title(), frame.bytes().len());
                    self.bytes.splice(at..at, frame.bytes().iter().copied());
                    let len = frame.bytes().len();
                    shift_offsets(&mut frames, index, at..at, len);
                    frames[index].set_offset(Some(at));
                }
                FrameState::PendingReplace(new_bytes) => {
                    self.replace(&mut frames, index, new_bytes);
                }
            }
        }

        let mut removed = removed.into_iter();
        frames.retain(|_| !removed.next().unwrap_or(false));
        self.frames = Some(frames);
        &self.bytes
    }

    fn replace(&mut self, frames: &mut [Frame], index: usize, new_bytes: Vec<u8>) {
        let frame = &frames[index];
        let old_len = frame.bytes().len();

        let Some(start) = locate(&self.bytes, frame) else {
            if frame.layout() == TagLayout::Id3v1 && frame.offset().is_none() {
                let at = self.bytes.len();
                log::debug!("Appending a new ID3v1 trailer at {at}");
                self.bytes.extend_from_slice(&new_bytes);
                frames[index].settle(Some(at), new_bytes);
            } else {
                log::warn!("{} is no longer in the stream, dropping its new bytes", frame.title());
                frames[index].settle(None, new_bytes);
            }
            return;
        };

        log::debug!(
            "Replacing {} at {start} ({old_len} -> {} bytes)",
            frame.title(),
            new_bytes.len()
        );
        self.bytes
            .splice(start..start + old_len, new_bytes.iter().copied());
        shift_offsets(frames, index, start..start + old_len, new_bytes.len());
        frames[index].settle(Some(start), new_bytes);
    }
}

/// Find the frames of every allow-listed type, then the trailer
fn parse_frames(bytes: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();

    for frame_id in FieldMappings::V2_FRAME_IDS {
        let Some(start) = find_subsequence(bytes, frame_id.as_bytes()) else {
            continue;
        };
        let Some(range) = frame_range(bytes, start) else {
            log::debug!("{frame_id} at {start} does not fit in the buffer, ignoring");
            continue;
        };
        if claimed
            .iter()
            .any(|other| other.start < range.end && range.start < other.end)
        {
            log::debug!("{frame_id} at {start} overlaps another frame, ignoring");
            continue;
        }

        match Frame::parse_v2(&bytes[range.clone()], start) {
            Ok(frame) => {
                log::debug!("Found {frame_id} at {start} ({} bytes)", range.len());
                claimed.push(range);
                frames.push(frame);
            }
            Err(e) => log::warn!("Skipping frame at {start}: {e}"),
        }
    }

    // Audio bytes are never taken for a trailer, a missing one is appended
    let offset = bytes.len().saturating_sub(TAG_SIZE);
    let trailer = match <&[u8; TAG_SIZE]>::try_from(&bytes[offset..]) {
        Ok(record) if V1Record::has_signature(record) => {
            log::debug!("Found ID3v1 trailer at {offset}");
            Frame::parse_v1(record, offset)
        }
        _ => Frame::blank_v1(),
    };
    frames.push(trailer);
    frames
}

/// Byte range of the frame whose header starts at `start`.
/// Offset 0 belongs to the tag header, never to a frame.
fn frame_range(bytes: &[u8], start: usize) -> Option<Range<usize>> {
    if start == 0 {
        return None;
    }
    let len = usize::try_from(v2::read_data_len(bytes, start)?)
        .ok()
        .filter(|&len| len > 0)?;
    let end = start.checked_add(HEADER_LEN)?.checked_add(len)?;
    (end <= bytes.len()).then_some(start..end)
}

/// Where `frame`'s bytes currently are in `bytes`.
///
/// The recorded offset is trusted when the bytes there still match; a frame
/// damaged by an overlapping edit is searched for by content instead.
fn locate(bytes: &[u8], frame: &Frame) -> Option<usize> {
    let offset = frame.offset()?;
    let needle = frame.bytes();
    if bytes.get(offset..offset + needle.len()) == Some(needle) {
        return Some(offset);
    }
    log::debug!("{} moved from {offset}, searching by content", frame.title());
    find_subsequence(bytes, needle)
}

/// Move every other frame that starts at or after the end of `edited`,
/// which now holds `new_len` bytes
fn shift_offsets(frames: &mut [Frame], skip: usize, edited: Range<usize>, new_len: usize) {
    for (index, frame) in frames.iter_mut().enumerate() {
        if index == skip {
            continue;
        }
        if let Some(offset) = frame.offset() {
            if offset >= edited.end {
                frame.set_offset(Some(offset - edited.len() + new_len));
            }
        }
    }
}
