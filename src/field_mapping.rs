// Field vocabulary and ID3v2 frame mapping
//
// Both tag layouts expose the same small set of named fields. ID3v1 stores a
// fixed subset of them at fixed offsets; ID3v2 stores each in its own frame,
// identified by a four character code:
// - ID3v1: song, artist, album, year, comment, track, genre
// - ID3v2: TIT2, TPE1, TALB, TYER/TORY/TDRC, COMM, TRCK, TCON, TPE2, TCOM,
//   TCOP, TPUB, WXXX

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TaggerError;
use crate::genres::genre_name;
use crate::id3::TagValue;

/// Tag fields this codec can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Artist,
    Album,
    Song,
    Track,
    Comment,
    Genre,
    Year,
    Band,
    Composer,
    Copyright,
    Url,
    Publisher,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Artist,
        Field::Album,
        Field::Song,
        Field::Track,
        Field::Comment,
        Field::Genre,
        Field::Year,
        Field::Band,
        Field::Composer,
        Field::Copyright,
        Field::Url,
        Field::Publisher,
    ];

    /// Get field name (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Artist => "artist",
            Field::Album => "album",
            Field::Song => "song",
            Field::Track => "track",
            Field::Comment => "comment",
            Field::Genre => "genre",
            Field::Year => "year",
            Field::Band => "band",
            Field::Composer => "composer",
            Field::Copyright => "copyright",
            Field::Url => "url",
            Field::Publisher => "publisher",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TaggerError::not_settable(s))
    }
}

/// ID3v2 frame identifiers for each field
pub struct FieldMappings;

impl FieldMappings {
    pub const ID3V2_ARTIST: &'static str = "TPE1";
    pub const ID3V2_BAND: &'static str = "TPE2";
    pub const ID3V2_ALBUM: &'static str = "TALB";
    pub const ID3V2_SONG: &'static str = "TIT2";
    pub const ID3V2_TRACK: &'static str = "TRCK";
    pub const ID3V2_GENRE: &'static str = "TCON";
    pub const ID3V2_COMPOSER: &'static str = "TCOM";
    pub const ID3V2_COPYRIGHT: &'static str = "TCOP";
    pub const ID3V2_COMMENT: &'static str = "COMM";
    pub const ID3V2_YEAR: &'static str = "TYER";
    pub const ID3V2_ORIGINAL_YEAR: &'static str = "TORY";
    pub const ID3V2_RECORDING_TIME: &'static str = "TDRC";
    pub const ID3V2_PUBLISHER: &'static str = "TPUB";
    pub const ID3V2_URL: &'static str = "WXXX";

    /// Every frame the codec understands, in the order the stream looks for them
    pub const V2_FRAME_IDS: [&'static str; 14] = [
        Self::ID3V2_ARTIST,
        Self::ID3V2_BAND,
        Self::ID3V2_ALBUM,
        Self::ID3V2_SONG,
        Self::ID3V2_TRACK,
        Self::ID3V2_GENRE,
        Self::ID3V2_COMPOSER,
        Self::ID3V2_COPYRIGHT,
        Self::ID3V2_COMMENT,
        Self::ID3V2_YEAR,
        Self::ID3V2_ORIGINAL_YEAR,
        Self::ID3V2_RECORDING_TIME,
        Self::ID3V2_PUBLISHER,
        Self::ID3V2_URL,
    ];

    /// Frame ID written when a field is added to an ID3v2 tag.
    ///
    /// The year family always maps to `TDRC`.
    pub fn to_id3v2(field: Field) -> &'static str {
        match field {
            Field::Artist => Self::ID3V2_ARTIST,
            Field::Band => Self::ID3V2_BAND,
            Field::Album => Self::ID3V2_ALBUM,
            Field::Song => Self::ID3V2_SONG,
            Field::Track => Self::ID3V2_TRACK,
            Field::Genre => Self::ID3V2_GENRE,
            Field::Composer => Self::ID3V2_COMPOSER,
            Field::Copyright => Self::ID3V2_COPYRIGHT,
            Field::Comment => Self::ID3V2_COMMENT,
            Field::Year => Self::ID3V2_RECORDING_TIME,
            Field::Publisher => Self::ID3V2_PUBLISHER,
            Field::Url => Self::ID3V2_URL,
        }
    }

    /// Convert ID3v2 frame to field
    pub fn from_id3v2(frame_id: &str) -> Option<Field> {
        match frame_id {
            Self::ID3V2_ARTIST => Some(Field::Artist),
            Self::ID3V2_BAND => Some(Field::Band),
            Self::ID3V2_ALBUM => Some(Field::Album),
            Self::ID3V2_SONG => Some(Field::Song),
            Self::ID3V2_TRACK => Some(Field::Track),
            Self::ID3V2_GENRE => Some(Field::Genre),
            Self::ID3V2_COMPOSER => Some(Field::Composer),
            Self::ID3V2_COPYRIGHT => Some(Field::Copyright),
            Self::ID3V2_COMMENT => Some(Field::Comment),
            Self::ID3V2_YEAR | Self::ID3V2_ORIGINAL_YEAR | Self::ID3V2_RECORDING_TIME => {
                Some(Field::Year)
            }
            Self::ID3V2_PUBLISHER => Some(Field::Publisher),
            Self::ID3V2_URL => Some(Field::Url),
            _ => None,
        }
    }
}

/// Value conversions shared by the tag layouts
pub struct ValueConverter;

impl ValueConverter {
    /// Resolve a genre index to its display name
    pub fn genre_from_index(index: i64) -> Option<TagValue> {
        let index = usize::try_from(index).ok()?;
        genre_name(index).map(|name| TagValue::Text(name.to_string()))
    }

    /// Interpret the text of an ID3v2 genre frame.
    ///
    /// A bare number is a genre index. Text starting with a word character is
    /// a free-form genre name and kept as-is. Anything else, such as `(17)`,
    /// is searched for its first run of digits.
    pub fn parse_genre(text: &str) -> Option<TagValue> {
        if text.is_empty() {
            return None;
        }

        if let Ok(index) = text.trim().parse::<i64>() {
            return Self::genre_from_index(index);
        }

        let starts_with_word = text
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if starts_with_word {
            return Some(TagValue::Text(text.to_string()));
        }

        let digits: String = text
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        match digits.parse::<i64>() {
            Ok(index) => Self::genre_from_index(index),
            Err(_) => Some(TagValue::Text(text.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parsing() {
        assert_eq!("artist".parse::<Field>().unwrap(), Field::Artist);
        assert_eq!("ARTIST".parse::<Field>().unwrap(), Field::Artist);
        assert_eq!("PuBlIsHeR".parse::<Field>().unwrap(), Field::Publisher);

        let err = "lyrics".parse::<Field>().unwrap_err();
        assert!(matches!(err, TaggerError::TagSet(_)));
        assert_eq!(err.to_string(), "Tag lyrics can't be set");
    }

    #[test]
    fn test_field_mapping() {
        assert_eq!(FieldMappings::to_id3v2(Field::Song), "TIT2");
        assert_eq!(FieldMappings::to_id3v2(Field::Url), "WXXX");
        assert_eq!(FieldMappings::to_id3v2(Field::Year), "TDRC");

        assert_eq!(FieldMappings::from_id3v2("TPE2"), Some(Field::Band));
        assert_eq!(FieldMappings::from_id3v2("TYER"), Some(Field::Year));
        assert_eq!(FieldMappings::from_id3v2("TORY"), Some(Field::Year));
        assert_eq!(FieldMappings::from_id3v2("APIC"), None);

        for id in FieldMappings::V2_FRAME_IDS {
            assert!(FieldMappings::from_id3v2(id).is_some(), "{id} is unmapped");
        }
    }

    #[test]
    fn test_genre_parsing() {
        let text = |s: &str| Some(TagValue::Text(s.to_string()));

        assert_eq!(ValueConverter::parse_genre("0"), text("Rock"));
        assert_eq!(ValueConverter::parse_genre("(17)"), text("Blues"));
        assert_eq!(ValueConverter::parse_genre("(79)Hard Rock"), text("Hard Rock"));
        assert_eq!(ValueConverter::parse_genre("Synthwave"), text("Synthwave"));
        assert_eq!(ValueConverter::parse_genre("17abc"), text("17abc"));
        assert_eq!(ValueConverter::parse_genre("(RX)"), text("(RX)"));
        assert_eq!(ValueConverter::parse_genre("255"), None);
        assert_eq!(ValueConverter::parse_genre("-1"), None);
        assert_eq!(ValueConverter::parse_genre(""), None);
    }
}
