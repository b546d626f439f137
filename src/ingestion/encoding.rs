//! Text encodings tried when decoding delimited input.

use std::borrow::Cow;
use std::fmt;

use serde::Deserialize;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A candidate text encoding for delimited input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1")]
    Latin1,
    #[serde(rename = "iso-8859-1")]
    Iso8859_1,
    #[serde(rename = "cp1252", alias = "windows-1252")]
    Windows1252,
}

impl TextEncoding {
    /// Encodings tried when none are configured, in order.
    pub const DEFAULT_CANDIDATES: [TextEncoding; 4] = [
        Self::Utf8,
        Self::Latin1,
        Self::Iso8859_1,
        Self::Windows1252,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Iso8859_1 => "iso-8859-1",
            Self::Windows1252 => "cp1252",
        }
    }

    /// Decode `bytes` strictly; `None` when the bytes are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            Self::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body).ok().map(Cow::Borrowed)
            }
            // ISO-8859-1 maps every byte onto the code point of the same value.
            Self::Latin1 | Self::Iso8859_1 => {
                Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
            }
            Self::Windows1252 => {
                encoding_rs::WINDOWS_1252.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::TextEncoding;

    #[test]
    fn utf8_rejects_latin1_bytes() {
        let latin1 = b"Municipio;S\xE3o Paulo";
        assert!(TextEncoding::Utf8.decode(latin1).is_none());
        assert_eq!(
            TextEncoding::Latin1.decode(latin1).as_deref(),
            Some("Municipio;São Paulo")
        );
    }

    #[test]
    fn utf8_strips_bom() {
        let bytes = b"\xEF\xBB\xBFa;b";
        assert_eq!(TextEncoding::Utf8.decode(bytes).as_deref(), Some("a;b"));
    }

    #[test]
    fn windows_1252_maps_smart_quotes() {
        let bytes = b"\x93ok\x94";
        assert_eq!(
            TextEncoding::Windows1252.decode(bytes).as_deref(),
            Some("\u{201C}ok\u{201D}")
        );
    }
}
