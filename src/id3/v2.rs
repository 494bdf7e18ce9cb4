// ID3v2 frame layout

use crate::error::{Result, TaggerError};
use crate::field_mapping::{Field, FieldMappings};
use crate::id3::tag::{self, Tag, TagValue};
use crate::id3::Id3Version;
use crate::utils::encoding::TextEncoding;
use crate::utils::io::read_be_i32;

/// Frame header: 4 byte ID, 4 byte big-endian length, 2 flag bytes
pub const HEADER_LEN: usize = 10;

const LENGTH_OFFSET: usize = 4;
const FLAGS_OFFSET: usize = 8;

/// Header fields and the single tag of one ID3v2 frame
#[derive(Debug, Clone)]
pub struct V2Body {
    id: [u8; 4],
    flags: [u8; 2],
    pub(crate) tag: Tag,
}

impl V2Body {
    /// Parse a complete frame: header, encoding selector and payload
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let frame_id = String::from_utf8_lossy(&bytes[..bytes.len().min(4)]).into_owned();
        let init_error = |reason: String| TaggerError::FrameInit {
            frame_id: frame_id.clone(),
            reason,
        };

        if bytes.len() <= HEADER_LEN {
            return Err(init_error(format!("{} bytes is too short for a frame", bytes.len())));
        }

        let field = FieldMappings::from_id3v2(&frame_id)
            .ok_or_else(|| init_error("unsupported frame".to_string()))?;
        let selector = bytes[HEADER_LEN];
        let encoding = TextEncoding::from_byte(selector)
            .ok_or_else(|| init_error(format!("unknown text encoding selector {selector}")))?;

        let mut id = [0; 4];
        id.copy_from_slice(&bytes[..4]);
        let mut flags = [0; 2];
        flags.copy_from_slice(&bytes[FLAGS_OFFSET..HEADER_LEN]);

        Ok(V2Body {
            id,
            flags,
            tag: Tag::new_v2(field, bytes[HEADER_LEN + 1..].to_vec(), encoding),
        })
    }

    /// Build a brand new frame holding `value`, returning it with its bytes.
    ///
    /// URLs are always Latin-1, and a URL outside it is a tag-set error. Text
    /// is UTF-16 for revisions before 2.4 and UTF-8 from 2.4 on. The tag is
    /// marked for insertion.
    pub fn from_value(field: Field, value: &TagValue, version: Id3Version) -> Result<(Self, Vec<u8>)> {
        let encoding = if field == Field::Url {
            TextEncoding::Iso8859_1
        } else if version.prefers_utf8() {
            TextEncoding::Utf8
        } else {
            TextEncoding::Utf16
        };

        let mut id = [0; 4];
        id.copy_from_slice(FieldMappings::to_id3v2(field).as_bytes());

        let text = value.as_text();
        let payload = tag::encode_v2(field, &text, encoding).ok_or_else(|| tag::not_latin1(field, &text))?;
        let mut tag = Tag::new_v2(field, payload, encoding);
        tag.mark_for_insert();

        let body = V2Body {
            id,
            flags: [0; 2],
            tag,
        };
        let bytes = body.encode_frame(body.tag.bytes());
        Ok((body, bytes))
    }

    pub fn id(&self) -> &str {
        std::str::from_utf8(&self.id).unwrap_or("????")
    }

    /// Serialize header, selector and `payload` as a whole frame
    pub fn encode_frame(&self, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + 1 + payload.len());
        bytes.extend_from_slice(&self.id);
        bytes.extend_from_slice(&data_len(payload));
        bytes.extend_from_slice(&self.flags);
        bytes.push(self.tag.encoding().as_byte());
        bytes.extend_from_slice(payload);
        bytes
    }
}

/// Length field for `payload`: it counts the encoding selector too
pub fn data_len(payload: &[u8]) -> [u8; 4] {
    let len = i32::try_from(payload.len() + 1).unwrap_or(i32::MAX);
    len.to_be_bytes()
}

/// Read the length field of the frame header starting at `start`
pub fn read_data_len(bytes: &[u8], start: usize) -> Option<i32> {
    read_be_i32(bytes.get(start + LENGTH_OFFSET..)?)
}
