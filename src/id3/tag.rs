// Tag values and the byte codecs for both layouts

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::error::{Result, TaggerError};
use crate::field_mapping::{Field, ValueConverter};
use crate::genres::genre_index;
use crate::id3::TagLayout;
use crate::utils::encoding::{self, TextEncoding};

/// Language code written in front of every comment
pub const COMMENT_LANGUAGE: [u8; 3] = *b"eng";

/// ID3v1 genre byte meaning "no genre"
pub const V1_GENRE_NONE: u8 = 255;

/// Encoding ID3v1 text is written in. Reads fall back to the legacy code page.
pub const V1_TEXT_ENCODING: TextEncoding = TextEncoding::Utf8;

/// Encoding a Latin-1 frame switches to for text Latin-1 cannot hold.
/// Every ID3v2 revision accepts it.
pub const V2_WIDE_ENCODING: TextEncoding = TextEncoding::Utf16;

/// A decoded tag value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Number(u32),
}

impl TagValue {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            TagValue::Text(text) => Cow::Borrowed(text),
            TagValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Whether writing this value to `field` means clearing it
    pub(crate) fn clears(&self, field: Field) -> bool {
        match self {
            TagValue::Text(text) if field == Field::Track => {
                text.is_empty() || text.trim().parse::<u32>() == Ok(0)
            }
            TagValue::Text(text) => text.is_empty(),
            TagValue::Number(n) => *n == 0 && field == Field::Track,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.write_str(text),
            TagValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::Number(value)
    }
}

impl From<u8> for TagValue {
    fn from(value: u8) -> Self {
        TagValue::Number(value.into())
    }
}

/// A change computed from a value, ready to be staged on a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staged {
    Bytes(Vec<u8>),
    /// Payload in a different text encoding than the tag currently has
    Reencoded(Vec<u8>, TextEncoding),
    Remove,
}

/// One named field and the bytes backing it.
///
/// `bytes` is the committed payload. A new value is first staged in
/// `pending` and only moves into `bytes` when the owning frame commits.
#[derive(Debug, Clone)]
pub struct Tag {
    field: Field,
    layout: TagLayout,
    bytes: Vec<u8>,
    pending: Option<Vec<u8>>,
    encoding: TextEncoding,
    pending_encoding: Option<TextEncoding>,
    to_remove: bool,
    to_insert: bool,
}

impl Tag {
    pub(crate) fn new_v1(field: Field, bytes: Vec<u8>) -> Self {
        Self::new(field, TagLayout::Id3v1, bytes, V1_TEXT_ENCODING)
    }

    pub(crate) fn new_v2(field: Field, bytes: Vec<u8>, encoding: TextEncoding) -> Self {
        Self::new(field, TagLayout::Id3v2, bytes, encoding)
    }

    fn new(field: Field, layout: TagLayout, bytes: Vec<u8>, encoding: TextEncoding) -> Self {
        Tag {
            field,
            layout,
            bytes,
            pending: None,
            encoding,
            pending_encoding: None,
            to_remove: false,
            to_insert: false,
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn layout(&self) -> TagLayout {
        self.layout
    }

    /// Encoding of the staged payload if there is one, else of the committed one
    pub fn encoding(&self) -> TextEncoding {
        self.pending_encoding.unwrap_or(self.encoding)
    }

    /// Committed payload
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Staged payload, if a new value has not been committed yet
    pub fn pending(&self) -> Option<&[u8]> {
        self.pending.as_deref()
    }

    pub fn is_marked_for_removal(&self) -> bool {
        self.to_remove
    }

    /// Decode the current value, preferring a staged one.
    ///
    /// Empty values, a zero v1 track and unmapped genre indices read as `None`.
    pub fn value(&self) -> Option<TagValue> {
        if self.to_remove {
            return None;
        }
        let data = self.pending.as_deref().unwrap_or(&self.bytes);
        match self.layout {
            TagLayout::Id3v1 => decode_v1(self.field, data),
            TagLayout::Id3v2 => decode_v2(self.field, data, self.encoding()),
        }
    }

    /// Encode `value` for this tag without changing it.
    ///
    /// Text a Latin-1 frame cannot hold moves the frame to UTF-16, except for
    /// URLs, which must stay Latin-1 and fail with a tag-set error.
    pub fn encode(&self, value: &TagValue) -> Result<Staged> {
        match self.layout {
            TagLayout::Id3v1 => encode_v1(self.field, value, self.bytes.len()).map(Staged::Bytes),
            TagLayout::Id3v2 => {
                if value.clears(self.field) {
                    return Ok(Staged::Remove);
                }
                let text = value.as_text();
                if let Some(payload) = encode_v2(self.field, &text, self.encoding) {
                    return Ok(Staged::Bytes(payload));
                }
                if self.field == Field::Url {
                    return Err(not_latin1(self.field, &text));
                }
                log::debug!("{} does not fit {:?}, switching to {:?}", self.field, self.encoding, V2_WIDE_ENCODING);
                encode_v2(self.field, &text, V2_WIDE_ENCODING)
                    .map(|payload| Staged::Reencoded(payload, V2_WIDE_ENCODING))
                    .ok_or_else(|| not_latin1(self.field, &text))
            }
        }
    }

    pub fn stage(&mut self, staged: Staged) {
        match staged {
            Staged::Bytes(bytes) => {
                self.pending = Some(bytes);
                self.pending_encoding = None;
                self.to_remove = false;
            }
            Staged::Reencoded(bytes, encoding) => {
                self.pending = Some(bytes);
                self.pending_encoding = Some(encoding);
                self.to_remove = false;
            }
            // ID3v1 slots cannot disappear, they are zeroed instead
            Staged::Remove if self.layout == TagLayout::Id3v1 => {
                self.pending = Some(self.v1_sentinel());
            }
            Staged::Remove => {
                self.pending = None;
                self.pending_encoding = None;
                self.to_remove = true;
            }
        }
    }

    pub fn set_value(&mut self, value: impl Into<TagValue>) -> Result<()> {
        let staged = self.encode(&value.into())?;
        self.stage(staged);
        Ok(())
    }

    /// Clear the value: ID3v1 slots get their "empty" byte pattern, ID3v2
    /// tags are staged for removal together with their frame.
    pub fn clear(&mut self) {
        self.stage(Staged::Remove);
    }

    /// Move a staged payload into the committed bytes
    pub(crate) fn commit(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.bytes = pending;
        }
        if let Some(encoding) = self.pending_encoding.take() {
            self.encoding = encoding;
        }
    }

    pub(crate) fn mark_for_insert(&mut self) {
        self.to_insert = true;
    }

    /// Consume the insertion request, reporting whether there was one
    pub(crate) fn take_insert(&mut self) -> bool {
        std::mem::take(&mut self.to_insert)
    }

    fn v1_sentinel(&self) -> Vec<u8> {
        match self.field {
            Field::Genre => vec![V1_GENRE_NONE],
            _ => vec![0; self.bytes.len()],
        }
    }
}

fn decode_v1(field: Field, data: &[u8]) -> Option<TagValue> {
    match field {
        Field::Track => data
            .first()
            .filter(|&&track| track != 0)
            .map(|&track| TagValue::Number(track.into())),
        Field::Genre => data
            .first()
            .and_then(|&index| ValueConverter::genre_from_index(index.into())),
        _ => {
            let text = encoding::decode_text_lossy(data, V1_TEXT_ENCODING).replace('\0', "");
            (!text.is_empty()).then_some(TagValue::Text(text))
        }
    }
}

fn decode_v2(field: Field, data: &[u8], text_encoding: TextEncoding) -> Option<TagValue> {
    let text = if field == Field::Comment {
        let body = data.get(COMMENT_LANGUAGE.len()..).unwrap_or_default();
        // Skip the content description when it is terminated
        let text = match encoding::terminator_end(body, text_encoding) {
            Some(end) => &body[end..],
            None => body,
        };
        encoding::decode_text_lossy(text, text_encoding)
    } else {
        encoding::decode_text_lossy(data, text_encoding)
    };

    let mut values = text
        .split('\0')
        .map(|value| value.trim_start_matches('\u{FEFF}'))
        .filter(|value| !value.is_empty());
    // WXXX keeps its description in front of the URL
    let text = if field == Field::Url { values.last() } else { values.next() }?;

    match field {
        Field::Genre => ValueConverter::parse_genre(text),
        _ => Some(TagValue::Text(text.to_string())),
    }
}

fn encode_v1(field: Field, value: &TagValue, width: usize) -> Result<Vec<u8>> {
    match field {
        Field::Track => v1_track_byte(value).map(|track| vec![track]),
        Field::Genre => v1_genre_byte(value).map(|genre| vec![genre]),
        _ => Ok(fit_to_slot(&value.as_text(), width)),
    }
}

/// Payload of an ID3v2 frame holding `text`, excluding the encoding selector.
/// `None` when `text` cannot be written in `text_encoding`.
pub(crate) fn encode_v2(field: Field, text: &str, text_encoding: TextEncoding) -> Option<Vec<u8>> {
    let mut payload = Vec::new();
    if field == Field::Comment {
        payload.extend_from_slice(&COMMENT_LANGUAGE);
    }
    payload.extend(encoding::encode_text(text, text_encoding)?);
    Some(payload)
}

pub(crate) fn not_latin1(field: Field, text: &str) -> TaggerError {
    TaggerError::TagSet(format!("Tag {field} must be Latin-1 text, got {text}"))
}

fn v1_track_byte(value: &TagValue) -> Result<u8> {
    let invalid = || TaggerError::TagSet(format!("Track value for ID3v1 must be 0-255, got {value}"));
    match value {
        TagValue::Number(n) => u8::try_from(*n).map_err(|_| invalid()),
        TagValue::Text(text) if text.trim().is_empty() => Ok(0),
        TagValue::Text(text) => text.trim().parse().map_err(|_| invalid()),
    }
}

fn v1_genre_byte(value: &TagValue) -> Result<u8> {
    let invalid = || {
        TaggerError::TagSet(format!(
            "Genre value for ID3v1 must be an integer or a known genre name, got {value}"
        ))
    };
    match value {
        TagValue::Number(n) => u8::try_from(*n).map_err(|_| invalid()),
        TagValue::Text(text) if text.trim().is_empty() => Ok(V1_GENRE_NONE),
        TagValue::Text(text) => text
            .trim()
            .parse()
            .ok()
            .or_else(|| genre_index(text))
            .ok_or_else(invalid),
    }
}

/// Truncate (on a character boundary) or zero-pad `text` to exactly `width` bytes
fn fit_to_slot(text: &str, width: usize) -> Vec<u8> {
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut bytes = text.as_bytes()[..end].to_vec();
    bytes.resize(width, 0);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<TagValue> {
        Some(TagValue::Text(value.to_string()))
    }

    #[test]
    fn v1_strings_always_fill_the_slot() {
        let mut tag = Tag::new_v1(Field::Artist, vec![0; 30]);

        tag.set_value("Test").unwrap();
        let pending = tag.pending().unwrap();
        assert_eq!(pending.len(), 30);
        assert_eq!(&pending[..4], b"Test");
        assert!(pending[4..].iter().all(|&b| b == 0));

        tag.set_value("x".repeat(40)).unwrap();
        assert_eq!(tag.pending().unwrap().len(), 30);
        assert_eq!(tag.value(), text(&"x".repeat(30)));
    }

    #[test]
    fn v1_truncation_keeps_characters_whole() {
        let mut tag = Tag::new_v1(Field::Year, vec![0; 4]);
        // 'é' is two bytes and would straddle the slot end
        tag.set_value("abcé").unwrap();
        assert_eq!(tag.pending().unwrap(), b"abc\0");
        assert_eq!(tag.value(), text("abc"));
    }

    #[test]
    fn v1_strings_fall_back_to_the_legacy_code_page() {
        let mut bytes = vec![0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        bytes.resize(30, 0);
        let tag = Tag::new_v1(Field::Song, bytes);
        assert_eq!(tag.value(), text("Привет"));
    }

    #[test]
    fn v1_numeric_slots() {
        let tag = Tag::new_v1(Field::Track, vec![5]);
        assert_eq!(tag.value(), Some(TagValue::Number(5)));

        let tag = Tag::new_v1(Field::Track, vec![0]);
        assert_eq!(tag.value(), None);

        let tag = Tag::new_v1(Field::Genre, vec![0]);
        assert_eq!(tag.value(), text("Rock"));
    }

    #[test]
    fn v1_genre_sentinel_reads_as_absent() {
        let mut tag = Tag::new_v1(Field::Genre, vec![0]);
        tag.set_value(255u8).unwrap();
        assert_eq!(tag.pending(), Some(&[255][..]));
        assert_eq!(tag.value(), None);
    }

    #[test]
    fn v1_genre_by_name_or_index() {
        let mut tag = Tag::new_v1(Field::Genre, vec![255]);
        tag.set_value("Blues").unwrap();
        assert_eq!(tag.pending(), Some(&[17][..]));
        tag.set_value("79").unwrap();
        assert_eq!(tag.value(), text("Hard Rock"));

        let err = tag.set_value("Not A Genre").unwrap_err();
        assert!(matches!(err, TaggerError::TagSet(_)));
        let err = tag.set_value(300u32).unwrap_err();
        assert!(matches!(err, TaggerError::TagSet(_)));
    }

    #[test]
    fn v1_track_rejects_text() {
        let mut tag = Tag::new_v1(Field::Track, vec![0]);
        assert!(tag.set_value("five").is_err());
        assert_eq!(tag.pending(), None);
    }

    #[test]
    fn v1_clear_writes_sentinels() {
        let mut genre = Tag::new_v1(Field::Genre, vec![0]);
        genre.clear();
        assert_eq!(genre.pending(), Some(&[255][..]));
        assert!(!genre.is_marked_for_removal());

        let mut album = Tag::new_v1(Field::Album, b"Album".to_vec());
        album.clear();
        assert_eq!(album.pending(), Some(&[0; 5][..]));
        assert_eq!(album.value(), None);
    }

    #[test]
    fn v2_comment_language_prefix() {
        let mut tag = Tag::new_v2(Field::Comment, b"engHello".to_vec(), TextEncoding::Utf8);
        assert_eq!(tag.value(), text("Hello"));

        tag.set_value("Bye").unwrap();
        assert_eq!(tag.pending(), Some(&b"engBye"[..]));
        assert_eq!(tag.value(), text("Bye"));
    }

    #[test]
    fn v2_comment_description_is_skipped() {
        let tag = Tag::new_v2(Field::Comment, b"engdesc\0Text".to_vec(), TextEncoding::Iso8859_1);
        assert_eq!(tag.value(), text("Text"));

        let mut data = b"eng".to_vec();
        data.extend([0xFF, 0xFE, 0, 0]);
        data.extend(encoding::encode_text("Wide", TextEncoding::Utf16).unwrap());
        let tag = Tag::new_v2(Field::Comment, data, TextEncoding::Utf16);
        assert_eq!(tag.value(), text("Wide"));
    }

    #[test]
    fn v2_text_terminators_are_dropped() {
        let tag = Tag::new_v2(Field::Album, b"Album\0".to_vec(), TextEncoding::Iso8859_1);
        assert_eq!(tag.value(), text("Album"));

        let tag = Tag::new_v2(Field::Url, b"\0https://example.com".to_vec(), TextEncoding::Iso8859_1);
        assert_eq!(tag.value(), text("https://example.com"));
    }

    #[test]
    fn v2_genre_forms() {
        let tag = Tag::new_v2(Field::Genre, b"(17)".to_vec(), TextEncoding::Iso8859_1);
        assert_eq!(tag.value(), text("Blues"));

        let tag = Tag::new_v2(Field::Genre, b"Vaporwave".to_vec(), TextEncoding::Iso8859_1);
        assert_eq!(tag.value(), text("Vaporwave"));

        let mut tag = Tag::new_v2(Field::Genre, b"0".to_vec(), TextEncoding::Utf8);
        tag.set_value(8u32).unwrap();
        assert_eq!(tag.value(), text("Jazz"));
    }

    #[test]
    fn v2_empty_value_stages_removal() {
        let mut tag = Tag::new_v2(Field::Artist, b"Someone".to_vec(), TextEncoding::Utf8);
        tag.set_value("").unwrap();
        assert!(tag.is_marked_for_removal());
        assert_eq!(tag.pending(), None);
        assert_eq!(tag.value(), None);

        tag.set_value("Someone Else").unwrap();
        assert!(!tag.is_marked_for_removal());
        assert_eq!(tag.value(), text("Someone Else"));
    }

    #[test]
    fn v2_utf16_round_trip() {
        let mut tag = Tag::new_v2(Field::Song, Vec::new(), TextEncoding::Utf16);
        tag.set_value("Ünïcödé").unwrap();
        tag.commit();
        assert_eq!(tag.pending(), None);
        assert_eq!(&tag.bytes()[..2], [0xFF, 0xFE]);
        assert_eq!(tag.value(), text("Ünïcödé"));
    }

    #[test]
    fn v2_track_zero_clears_whatever_its_type() {
        for zero in [TagValue::from(0u32), TagValue::from("0"), TagValue::from(" 00 ")] {
            let mut tag = Tag::new_v2(Field::Track, b"3".to_vec(), TextEncoding::Iso8859_1);
            tag.set_value(zero.clone()).unwrap();
            assert!(tag.is_marked_for_removal(), "{zero:?} should clear the track");
            assert_eq!(tag.value(), None);
        }

        // Zero is only special for the track
        let mut tag = Tag::new_v2(Field::Year, b"1999".to_vec(), TextEncoding::Iso8859_1);
        tag.set_value("0").unwrap();
        assert_eq!(tag.value(), text("0"));
    }

    #[test]
    fn latin1_frame_switches_to_utf16_for_wider_text() {
        let mut tag = Tag::new_v2(Field::Song, b"Hello".to_vec(), TextEncoding::Iso8859_1);
        tag.set_value("café").unwrap();
        assert_eq!(tag.pending(), Some(&b"caf\xE9"[..]));
        assert_eq!(tag.encoding(), TextEncoding::Iso8859_1);

        tag.set_value("Привет").unwrap();
        assert_eq!(tag.encoding(), TextEncoding::Utf16);
        assert_eq!(tag.value(), text("Привет"));
        tag.commit();
        assert_eq!(tag.encoding(), TextEncoding::Utf16);
        assert_eq!(&tag.bytes()[..2], [0xFF, 0xFE]);
        assert_eq!(tag.value(), text("Привет"));
    }

    #[test]
    fn latin1_url_rejects_wider_text() {
        let mut tag = Tag::new_v2(Field::Url, b"\0https://example.com".to_vec(), TextEncoding::Iso8859_1);
        let err = tag.set_value("https://пример.рф").unwrap_err();
        assert!(matches!(err, TaggerError::TagSet(_)));
        assert_eq!(tag.pending(), None);
        assert_eq!(tag.value(), text("https://example.com"));
    }

    #[test]
    fn commit_is_a_noop_without_pending_bytes() {
        let mut tag = Tag::new_v2(Field::Band, b"Band".to_vec(), TextEncoding::Utf8);
        tag.commit();
        assert_eq!(tag.bytes(), b"Band");
        assert!(!tag.take_insert());
        tag.mark_for_insert();
        assert!(tag.take_insert());
        assert!(!tag.take_insert());
    }
}
