// Text encoding utilities

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1251};
use serde::Serialize;

/// 8-bit code page tried when a payload is not valid in its declared encoding
pub const LEGACY_ENCODING: &Encoding = WINDOWS_1251;

const BOM_LE: [u8; 2] = [0xFF, 0xFE];
const BOM_BE: [u8; 2] = [0xFE, 0xFF];

/// Text encoding types, numbered by their ID3v2 selector byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextEncoding {
    Iso8859_1 = 0,
    Utf16 = 1,
    Utf16BE = 2,
    Utf8 = 3,
}

impl TextEncoding {
    /// Map an ID3v2 encoding selector byte, `None` for anything unassigned
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TextEncoding::Iso8859_1),
            1 => Some(TextEncoding::Utf16),
            2 => Some(TextEncoding::Utf16BE),
            3 => Some(TextEncoding::Utf8),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Whether a string terminator takes two bytes in this encoding
    pub fn is_wide(self) -> bool {
        matches!(self, TextEncoding::Utf16 | TextEncoding::Utf16BE)
    }
}

/// Decode text with the specified encoding.
///
/// Returns `None` if `data` is malformed for `encoding`. No replacement
/// characters are ever produced.
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> Option<String> {
    let decoded = match encoding {
        // encoding_rs treats ISO-8859-1 as windows-1252; every byte is its own code point here
        TextEncoding::Iso8859_1 => return Some(data.iter().copied().map(char::from).collect()),
        TextEncoding::Utf16 => {
            if data.starts_with(&BOM_LE) {
                UTF_16LE.decode_without_bom_handling_and_without_replacement(&data[2..])
            } else if data.starts_with(&BOM_BE) {
                UTF_16BE.decode_without_bom_handling_and_without_replacement(&data[2..])
            } else {
                UTF_16LE.decode_without_bom_handling_and_without_replacement(data)
            }
        }
        TextEncoding::Utf16BE => {
            UTF_16BE.decode_without_bom_handling_and_without_replacement(data)
        }
        TextEncoding::Utf8 => UTF_8.decode_without_bom_handling_and_without_replacement(data),
    };

    decoded.map(|text| text.into_owned())
}

/// Decode with the legacy code page. Every byte maps, so this cannot fail.
pub fn decode_legacy(data: &[u8]) -> String {
    LEGACY_ENCODING.decode_without_bom_handling(data).0.into_owned()
}

/// Decode with the declared encoding, retrying with the legacy code page
pub fn decode_text_lossy(data: &[u8], encoding: TextEncoding) -> String {
    decode_text(data, encoding).unwrap_or_else(|| {
        log::debug!("Payload is not valid {:?}, retrying as {}", encoding, LEGACY_ENCODING.name());
        decode_legacy(data)
    })
}

/// Encode text with specified encoding.
///
/// Returns `None` when `text` has characters above U+00FF and `encoding` is
/// Latin-1; the Unicode encodings always succeed.
pub fn encode_text(text: &str, encoding: TextEncoding) -> Option<Vec<u8>> {
    match encoding {
        TextEncoding::Iso8859_1 => text.chars().map(|c| u8::try_from(c).ok()).collect(),
        // encoding_rs never outputs UTF-16, so the code units are laid out by hand
        TextEncoding::Utf16 => {
            let mut encoded = BOM_LE.to_vec();
            encoded.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            Some(encoded)
        }
        TextEncoding::Utf16BE => Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
    }
}

/// Find the end of the first string terminator in `data`, if any.
///
/// UTF-16 terminators are only recognised on code unit boundaries.
pub fn terminator_end(data: &[u8], encoding: TextEncoding) -> Option<usize> {
    if encoding.is_wide() {
        data.chunks_exact(2)
            .position(|unit| unit == [0, 0])
            .map(|index| index * 2 + 2)
    } else {
        data.iter().position(|&b| b == 0).map(|index| index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_bytes() {
        assert_eq!(TextEncoding::from_byte(3), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_byte(9), None);
        assert_eq!(TextEncoding::Utf16BE.as_byte(), 2);
    }

    #[test]
    fn utf16_is_written_with_a_bom() {
        let encoded = encode_text("Hi", TextEncoding::Utf16).unwrap();
        assert_eq!(encoded, [0xFF, 0xFE, b'H', 0, b'i', 0]);
        assert_eq!(decode_text(&encoded, TextEncoding::Utf16).as_deref(), Some("Hi"));
    }

    #[test]
    fn utf16_big_endian_bom_is_honoured() {
        let data = [0xFE, 0xFF, 0, b'O', 0, b'K'];
        assert_eq!(decode_text(&data, TextEncoding::Utf16).as_deref(), Some("OK"));
    }

    #[test]
    fn utf16be_has_no_bom() {
        let encoded = encode_text("A", TextEncoding::Utf16BE).unwrap();
        assert_eq!(encoded, [0, b'A']);
        assert_eq!(decode_text(&encoded, TextEncoding::Utf16BE).as_deref(), Some("A"));
    }

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        // 0x80 is a C1 control in Latin-1, not the euro sign
        assert_eq!(decode_text(&[0x80, 0xE9], TextEncoding::Iso8859_1).as_deref(), Some("\u{80}é"));
        assert_eq!(encode_text("café", TextEncoding::Iso8859_1), Some(b"caf\xE9".to_vec()));
        assert_eq!(encode_text("€", TextEncoding::Iso8859_1), None);
        assert_eq!(encode_text("Привет", TextEncoding::Iso8859_1), None);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(decode_text(&[0xFF, 0xFE, b'a'], TextEncoding::Utf16), None);
        assert_eq!(decode_text(&[0xC3], TextEncoding::Utf8), None);
    }

    #[test]
    fn legacy_fallback() {
        // "Привет" in Windows-1251
        let data = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_eq!(decode_text(&data, TextEncoding::Utf8), None);
        assert_eq!(decode_text_lossy(&data, TextEncoding::Utf8), "Привет");
    }

    #[test]
    fn terminators() {
        assert_eq!(terminator_end(b"desc\0text", TextEncoding::Utf8), Some(5));
        assert_eq!(terminator_end(b"text", TextEncoding::Iso8859_1), None);
        // The zero bytes of 'a' and 'b' straddle a unit boundary and are not a terminator
        let data = [b'a', 0, 0, b'b', 0, 0, b'c', 0];
        assert_eq!(terminator_end(&data, TextEncoding::Utf16), Some(6));
    }
}
