use crate::utils::error::{KclError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrderMark {
    Utf8,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
}

impl ByteOrderMark {
    // UTF-32LE shares its prefix with UTF-16LE so the longer marks come first.
    const PROBE_ORDER: [ByteOrderMark; 5] = [
        ByteOrderMark::Utf32Le,
        ByteOrderMark::Utf32Be,
        ByteOrderMark::Utf8,
        ByteOrderMark::Utf16Le,
        ByteOrderMark::Utf16Be,
    ];

    pub fn bytes(&self) -> &'static [u8] {
        match self {
            ByteOrderMark::Utf8 => &[0xEF, 0xBB, 0xBF],
            ByteOrderMark::Utf16Be => &[0xFE, 0xFF],
            ByteOrderMark::Utf16Le => &[0xFF, 0xFE],
            ByteOrderMark::Utf32Be => &[0x00, 0x00, 0xFE, 0xFF],
            ByteOrderMark::Utf32Le => &[0xFF, 0xFE, 0x00, 0x00],
        }
    }

    pub fn size(&self) -> usize {
        self.bytes().len()
    }

    pub fn starts_with(&self, data: &[u8]) -> bool {
        data.starts_with(self.bytes())
    }

    pub fn identify(data: &[u8]) -> Option<ByteOrderMark> {
        Self::PROBE_ORDER
            .iter()
            .copied()
            .find(|bom| bom.starts_with(data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16Be,
    Utf16Le,
    Iso8859_1,
    UsAscii,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Iso8859_1 => "ISO-8859-1",
            Encoding::UsAscii => "US-ASCII",
        }
    }

    pub fn bom(&self) -> Option<ByteOrderMark> {
        match self {
            Encoding::Utf8 => Some(ByteOrderMark::Utf8),
            Encoding::Utf16Be => Some(ByteOrderMark::Utf16Be),
            Encoding::Utf16Le => Some(ByteOrderMark::Utf16Le),
            Encoding::Iso8859_1 | Encoding::UsAscii => None,
        }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Encoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Encoding::Iso8859_1 => self.encode_single_byte(text, 0xFF),
            Encoding::UsAscii => self.encode_single_byte(text, 0x7F),
        }
    }

    fn encode_single_byte(&self, text: &str, max: u32) -> Result<Vec<u8>> {
        text.chars()
            .map(|ch| {
                let code = ch as u32;
                if code <= max {
                    Ok(code as u8)
                } else {
                    Err(KclError::InvalidValueError {
                        field: self.name().to_string(),
                        value: ch.to_string(),
                        reason: "character not representable".to_string(),
                    })
                }
            })
            .collect()
    }

    /// Decodes the data. A leading BOM of this encoding is skipped.
    pub fn decode(&self, data: &[u8]) -> Result<String> {
        let data = match self.bom() {
            Some(bom) if bom.starts_with(data) => &data[bom.size()..],
            _ => data,
        };
        match self {
            Encoding::Utf8 => String::from_utf8(data.to_vec())
                .map_err(|e| KclError::parse(self.name(), e.to_string())),
            Encoding::Utf16Be => self.decode_utf16(data, u16::from_be_bytes),
            Encoding::Utf16Le => self.decode_utf16(data, u16::from_le_bytes),
            Encoding::Iso8859_1 => Ok(data.iter().map(|&b| b as char).collect()),
            Encoding::UsAscii => {
                if let Some(bad) = data.iter().find(|b| !b.is_ascii()) {
                    return Err(KclError::parse(
                        self.name(),
                        format!("byte 0x{:02X} is not ASCII", bad),
                    ));
                }
                Ok(data.iter().map(|&b| b as char).collect())
            }
        }
    }

    fn decode_utf16(&self, data: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
        if data.len() % 2 != 0 {
            return Err(KclError::parse(self.name(), "odd number of bytes"));
        }
        let units = data.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
        char::decode_utf16(units)
            .collect::<std::result::Result<String, _>>()
            .map_err(|e| KclError::parse(self.name(), e.to_string()))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = KclError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "UTF-8" | "UTF8" => Ok(Encoding::Utf8),
            "UTF-16BE" | "UTF16BE" => Ok(Encoding::Utf16Be),
            "UTF-16LE" | "UTF16LE" => Ok(Encoding::Utf16Le),
            "ISO-8859-1" | "LATIN1" => Ok(Encoding::Iso8859_1),
            "US-ASCII" | "ASCII" => Ok(Encoding::UsAscii),
            _ => Err(KclError::parse(s, "unknown encoding")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_bom() {
        assert_eq!(
            ByteOrderMark::identify(&[0xEF, 0xBB, 0xBF, b'a']),
            Some(ByteOrderMark::Utf8)
        );
        assert_eq!(
            ByteOrderMark::identify(&[0xFF, 0xFE, 0x00, 0x00, 0x41]),
            Some(ByteOrderMark::Utf32Le)
        );
        assert_eq!(
            ByteOrderMark::identify(&[0xFF, 0xFE, 0x41, 0x00]),
            Some(ByteOrderMark::Utf16Le)
        );
        assert_eq!(ByteOrderMark::identify(b"plain"), None);
        assert_eq!(ByteOrderMark::identify(&[]), None);
    }

    #[test]
    fn test_utf16_skips_bom() {
        let data = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(Encoding::Utf16Be.decode(&data).unwrap(), "Hi");
        assert_eq!(Encoding::Utf16Be.encode("Hi").unwrap(), &data[2..]);
    }

    #[test]
    fn test_single_byte_encodings() {
        assert_eq!(Encoding::Iso8859_1.encode("Grüße").unwrap().len(), 5);
        assert!(Encoding::UsAscii.encode("Grüße").is_err());
        assert!(Encoding::UsAscii.decode(&[0x41, 0xC3]).is_err());
        assert_eq!(Encoding::Iso8859_1.decode(&[0x47, 0xFC]).unwrap(), "Gü");
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("latin1".parse::<Encoding>().unwrap(), Encoding::Iso8859_1);
        assert_eq!("utf_16le".parse::<Encoding>().unwrap(), Encoding::Utf16Le);
        assert!("ebcdic".parse::<Encoding>().is_err());
    }
}
