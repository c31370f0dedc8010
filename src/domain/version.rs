use crate::utils::error::{KclError, Result};
use crate::utils::text::cleanup;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// `major.minor[.micro][.qualifier]` version number.
///
/// Two versions are equal when their textual forms are equal, so
/// `1.1.1_beta` and `1.1.1.beta` are the same version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    micro: Option<u32>,
    qualifier: Option<String>,
}

/// Splits off the text up to the first of `delimiters`. The delimiter is
/// consumed. Returns the cleaned part.
fn next_part<'a>(input: &mut &'a str, delimiters: &[char]) -> Option<String> {
    let part = match input.find(delimiters) {
        Some(pos) => {
            let part = &input[..pos];
            *input = &input[pos + 1..];
            part
        }
        None => std::mem::take(input),
    };
    cleanup(Some(part))
}

fn parse_number(text: &str, part: Option<String>, component: &str) -> Result<u32> {
    let part = part.ok_or_else(|| KclError::parse(text, format!("missing {}", component)))?;
    part.parse::<u32>()
        .map_err(|_| KclError::parse(text, format!("invalid {} '{}'", component, part)))
}

impl Version {
    pub fn new(major: u32, minor: u32, micro: Option<u32>, qualifier: Option<&str>) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: cleanup(qualifier),
        }
    }

    /// Lenient parsing. After `major.minor` the next segment (delimited by
    /// `.` or `_`) becomes the micro number if it is numeric. Whatever
    /// follows is the qualifier.
    pub fn parse(text: &str) -> Result<Self> {
        let mut input = text.trim();
        let major = parse_number(text, next_part(&mut input, &['.']), "major")?;
        let minor = parse_number(text, next_part(&mut input, &['.']), "minor")?;

        let remainder = input;
        let segment = next_part(&mut input, &['.', '_']);
        let (micro, qualifier) = match segment.as_deref().map(str::parse::<u32>) {
            Some(Ok(micro)) => (Some(micro), cleanup(Some(input))),
            Some(Err(_)) => (None, cleanup(Some(remainder))),
            None => (None, None),
        };

        Ok(Self {
            major,
            minor,
            micro,
            qualifier,
        })
    }

    /// Strict parsing: the micro number and the qualifier must be present
    /// exactly as requested.
    pub fn parse_with(text: &str, has_micro: bool, has_qualifier: bool) -> Result<Self> {
        let mut input = text.trim();
        let major = parse_number(text, next_part(&mut input, &['.']), "major")?;
        let minor = parse_number(text, next_part(&mut input, &['.']), "minor")?;

        let micro = if has_micro {
            Some(parse_number(
                text,
                next_part(&mut input, &['.', '_']),
                "micro",
            )?)
        } else {
            None
        };

        let qualifier = cleanup(Some(input));
        match (has_qualifier, &qualifier) {
            (true, None) => return Err(KclError::parse(text, "missing qualifier")),
            (false, Some(extra)) => {
                return Err(KclError::parse(text, format!("unexpected trailing '{}'", extra)))
            }
            _ => {}
        }

        Ok(Self {
            major,
            minor,
            micro,
            qualifier,
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn micro(&self) -> Option<u32> {
        self.micro
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn to_text(&self, qualifier_delimiter: char) -> String {
        let mut text = format!("{}.{}", self.major, self.minor);
        if let Some(micro) = self.micro {
            text.push('.');
            text.push_str(&micro.to_string());
        }
        if let Some(qualifier) = &self.qualifier {
            text.push(qualifier_delimiter);
            text.push_str(qualifier);
        }
        text
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text('.'))
    }
}

impl FromStr for Version {
    type Err = KclError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = KclError;

    fn try_from(value: String) -> Result<Self> {
        Version::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| match (self.micro, other.micro) {
                (Some(a), Some(b)) => a.cmp(&b),
                // a version with a micro number sorts before one without
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.to_string().cmp(&other.to_string()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flexible_parsing() {
        let plain = Version::parse("1.2").unwrap();
        assert_eq!((plain.major(), plain.minor(), plain.micro()), (1, 2, None));
        assert_eq!(plain.qualifier(), None);

        let micro = Version::parse("1.2.3").unwrap();
        assert_eq!(micro.micro(), Some(3));
        assert_eq!(micro.qualifier(), None);

        let full = Version::parse("1.2.3_SNAPSHOT").unwrap();
        assert_eq!(full.micro(), Some(3));
        assert_eq!(full.qualifier(), Some("SNAPSHOT"));

        let named = Version::parse("1.2.beta.2").unwrap();
        assert_eq!(named.micro(), None);
        assert_eq!(named.qualifier(), Some("beta.2"));
    }

    #[test]
    fn test_flexible_parsing_failures() {
        assert!(Version::parse("1").is_err());
        assert!(Version::parse("a.b").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_strict_parsing() {
        assert!(Version::parse_with("1", true, false).is_err());
        assert!(Version::parse_with("1.1", true, false).is_err());
        assert!(Version::parse_with("1.1.1", true, true).is_err());
        assert!(Version::parse_with("1.1.qualifier", true, false).is_err());
        assert!(Version::parse_with("1q.1.1", true, false).is_err());

        let with_micro = Version::parse_with("1.1.1", true, false).unwrap();
        assert_eq!(with_micro.micro(), Some(1));

        let qualified = Version::parse_with("1.1.qualifier", false, true).unwrap();
        assert_eq!(qualified.micro(), None);
        assert_eq!(qualified.qualifier(), Some("qualifier"));
    }

    #[test]
    fn test_equality_uses_text() {
        let underscore = Version::parse_with("1.1.1_qualifier", true, true).unwrap();
        let dotted = Version::parse_with("1.1.1.qualifier", true, true).unwrap();
        assert_eq!(underscore, dotted);
        assert_eq!(underscore.to_string(), "1.1.1.qualifier");
        assert_eq!(underscore.to_text('_'), "1.1.1_qualifier");
    }

    #[test]
    fn test_ordering() {
        let mut versions: Vec<Version> = ["2.0", "1.10.0", "1.2", "1.2.5", "1.2.5.beta", "1.2.10"]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();
        versions.sort();
        let sorted: Vec<String> = versions.iter().map(Version::to_string).collect();
        assert_eq!(
            sorted,
            vec!["1.2.5", "1.2.5.beta", "1.2.10", "1.2", "1.10.0", "2.0"]
        );
    }

    #[test]
    fn test_serde_uses_text() {
        let version = Version::new(3, 1, Some(4), Some("rc1"));
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"3.1.4.rc1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);
    }
}
