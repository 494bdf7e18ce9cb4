// ID3v1 trailer layout

use crate::field_mapping::Field;
use crate::id3::Tag;

/// Size of the trailer record
pub const TAG_SIZE: usize = 128;

/// Signature opening the trailer record
pub const TAG_ID: [u8; 3] = *b"TAG";

/// Offset of the byte separating the comment from the track number
pub const RESERVED_OFFSET: usize = 125;

/// Field slots as `(field, offset, width)`, in record order.
/// The reserved byte sits between `Comment` and `Track`.
pub const FIELD_LAYOUT: [(Field, usize, usize); 7] = [
    (Field::Song, 3, 30),
    (Field::Artist, 33, 30),
    (Field::Album, 63, 30),
    (Field::Year, 93, 4),
    (Field::Comment, 97, 28),
    (Field::Track, 126, 1),
    (Field::Genre, 127, 1),
];

/// The tags of an ID3v1 trailer plus the one byte that belongs to no field
#[derive(Debug, Clone)]
pub struct V1Record {
    pub(crate) tags: Vec<Tag>,
    reserved: u8,
}

impl V1Record {
    /// Split a trailer into its field slots.
    ///
    /// The signature is not checked: a buffer without a trailer simply yields
    /// fields that decode to empty values.
    pub fn parse(record: &[u8; TAG_SIZE]) -> Self {
        let tags = FIELD_LAYOUT
            .iter()
            .map(|&(field, offset, width)| {
                Tag::new_v1(field, record[offset..offset + width].to_vec())
            })
            .collect();

        V1Record {
            tags,
            reserved: record[RESERVED_OFFSET],
        }
    }

    /// Whether `record` starts with the trailer signature
    pub fn has_signature(record: &[u8]) -> bool {
        record.starts_with(&TAG_ID)
    }

    /// Reassemble the 128 byte record from each field's staged or current
    /// bytes, committing the staged ones.
    pub fn rebuild(&mut self) -> Vec<u8> {
        let mut record = Vec::with_capacity(TAG_SIZE);
        record.extend_from_slice(&TAG_ID);

        for tag in &mut self.tags {
            if tag.field() == Field::Track {
                record.push(self.reserved);
            }
            record.extend_from_slice(tag.pending().unwrap_or(tag.bytes()));
            tag.commit();
        }

        debug_assert_eq!(record.len(), TAG_SIZE);
        record
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut [Tag] {
        &mut self.tags
    }
}
