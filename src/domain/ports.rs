use crate::utils::error::{KclError, Result};
use std::collections::{BTreeMap, HashMap};
use std::io::{ErrorKind, Read, Write};

/// Something units (bytes or chars) can be pulled from. Returns 0 at the end.
pub trait Source<U> {
    fn read_units(&mut self, buffer: &mut [U]) -> Result<usize>;
}

pub trait Sink<U> {
    fn write_units(&mut self, units: &[U]) -> Result<()>;

    fn flush_units(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<R: Read + ?Sized> Source<u8> for R {
    fn read_units(&mut self, buffer: &mut [u8]) -> Result<usize> {
        loop {
            match self.read(buffer) {
                Ok(count) => return Ok(count),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(KclError::IoError(e)),
            }
        }
    }
}

impl<W: Write + ?Sized> Sink<u8> for W {
    fn write_units(&mut self, units: &[u8]) -> Result<()> {
        self.write_all(units)?;
        Ok(())
    }

    fn flush_units(&mut self) -> Result<()> {
        self.flush()?;
        Ok(())
    }
}

/// Decodes UTF-8 from a byte reader, keeping incomplete sequences between
/// reads.
pub struct CharReader<R> {
    inner: R,
    pending: Vec<u8>,
    eof: bool,
}

impl<R: Read> CharReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            eof: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn decode_pending(&mut self, buffer: &mut [char]) -> Result<usize> {
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.valid_up_to() == 0 && e.error_len().is_some() => {
                return Err(KclError::IoError(std::io::Error::new(
                    ErrorKind::InvalidData,
                    "stream did not contain valid UTF-8",
                )));
            }
            Err(e) => e.valid_up_to(),
        };
        let text = std::str::from_utf8(&self.pending[..valid])
            .map_err(|e| KclError::IoError(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let mut count = 0;
        let mut consumed = 0;
        for (slot, ch) in buffer.iter_mut().zip(text.chars()) {
            *slot = ch;
            count += 1;
            consumed += ch.len_utf8();
        }
        self.pending.drain(..consumed);
        Ok(count)
    }
}

impl<R: Read> Source<char> for CharReader<R> {
    fn read_units(&mut self, buffer: &mut [char]) -> Result<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }
        let mut chunk = [0u8; 4096];
        loop {
            let count = self.decode_pending(buffer)?;
            if count > 0 {
                return Ok(count);
            }
            if self.eof {
                if self.pending.is_empty() {
                    return Ok(0);
                }
                return Err(KclError::IoError(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "stream ended inside a UTF-8 sequence",
                )));
            }
            let read = self.inner.read_units(&mut chunk[..])?;
            if read == 0 {
                self.eof = true;
            } else {
                self.pending.extend_from_slice(&chunk[..read]);
            }
        }
    }
}

/// Encodes chars as UTF-8 into a byte writer.
pub struct CharWriter<W> {
    inner: W,
}

impl<W: Write> CharWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink<char> for CharWriter<W> {
    fn write_units(&mut self, units: &[char]) -> Result<()> {
        let text: String = units.iter().collect();
        self.inner.write_all(text.as_bytes())?;
        Ok(())
    }

    fn flush_units(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl Sink<char> for String {
    fn write_units(&mut self, units: &[char]) -> Result<()> {
        self.extend(units.iter());
        Ok(())
    }
}

/// Key/value store the typed properties and the resolver work on.
pub trait PropertySource {
    fn get_property(&self, key: &str) -> Option<&str>;
    fn set_property(&mut self, key: &str, value: &str);
    fn remove_property(&mut self, key: &str) -> Option<String>;
    fn property_keys(&self) -> Vec<String>;
}

impl PropertySource for HashMap<String, String> {
    fn get_property(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }

    fn remove_property(&mut self, key: &str) -> Option<String> {
        self.remove(key)
    }

    fn property_keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

impl PropertySource for BTreeMap<String, String> {
    fn get_property(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn set_property(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }

    fn remove_property(&mut self, key: &str) -> Option<String> {
        self.remove(key)
    }

    fn property_keys(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Converts between the textual form stored in a [`PropertySource`] and a
/// typed value.
pub trait TypeAdapter<T> {
    fn unmarshal(&self, text: &str) -> Result<T>;
    fn marshal(&self, value: &T) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out one byte per read to split multi-byte sequences.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn test_char_reader_handles_split_sequences() {
        let text = "Grüße, 世界!";
        let mut reader = CharReader::new(Trickle(text.as_bytes()));
        let mut buffer = ['\0'; 3];
        let mut decoded = String::new();
        loop {
            let count = reader.read_units(&mut buffer[..]).unwrap();
            if count == 0 {
                break;
            }
            decoded.extend(&buffer[..count]);
        }
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_char_reader_rejects_invalid_utf8() {
        let mut reader = CharReader::new(&[0xFFu8, 0x41][..]);
        let mut buffer = ['\0'; 4];
        assert!(reader.read_units(&mut buffer[..]).is_err());
    }

    #[test]
    fn test_char_reader_rejects_truncated_sequence() {
        let mut reader = CharReader::new(&[0x41u8, 0xC3][..]);
        let mut buffer = ['\0'; 4];
        assert_eq!(reader.read_units(&mut buffer[..]).unwrap(), 1);
        assert!(reader.read_units(&mut buffer[..]).is_err());
    }

    #[test]
    fn test_char_writer_encodes_utf8() {
        let mut writer = CharWriter::new(Vec::new());
        writer.write_units(&['ü', 'a'][..]).unwrap();
        assert_eq!(writer.into_inner(), "üa".as_bytes());
    }

    #[test]
    fn test_property_source_for_maps() {
        let mut map: HashMap<String, String> = HashMap::new();
        map.set_property("a", "1");
        assert_eq!(map.get_property("a"), Some("1"));
        assert_eq!(map.remove_property("a"), Some("1".to_string()));
        assert!(map.property_keys().is_empty());
    }
}
