use thiserror::Error;

#[derive(Error, Debug)]
pub enum KclError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Operation timed out after {millis} ms")]
    TimeoutError { millis: u128 },

    #[error("Process error: {message}")]
    ProcessError { message: String },

    #[error("Missing required property: {property}")]
    MissingPropertyError { property: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot parse '{input}': {reason}")]
    ParseError { input: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}: {source}")]
    WrappedError {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Coarse classification of failures, mainly reported by the process wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    Success,
    Io,
    Timeout,
    ConversionFailure,
    MissingProperty,
    Unexpected,
}

impl FailureCode {
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => FailureCode::Success,
            Err(e) => e.failure_code(),
        }
    }
}

impl KclError {
    pub fn failure_code(&self) -> FailureCode {
        match self {
            KclError::IoError(_) | KclError::ZipError(_) | KclError::ProcessError { .. } => {
                FailureCode::Io
            }
            KclError::CsvError(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => FailureCode::Io,
            KclError::TimeoutError { .. } => FailureCode::Timeout,
            KclError::ParseError { .. }
            | KclError::InvalidValueError { .. }
            | KclError::CsvError(_) => {
                FailureCode::ConversionFailure
            }
            KclError::MissingPropertyError { .. } => FailureCode::MissingProperty,
            KclError::WrappedError { source, .. } => {
                if source.is::<std::io::Error>() {
                    FailureCode::Io
                } else {
                    FailureCode::Unexpected
                }
            }
            KclError::RegexError(_) | KclError::TomlError(_) | KclError::ConfigError { .. } => {
                FailureCode::Unexpected
            }
        }
    }

    pub fn wrap<E>(error: E, message: impl Into<String>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        KclError::WrappedError {
            message: message.into(),
            source: Box::new(error),
        }
    }

    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        KclError::ParseError {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KclError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_codes() {
        let io = KclError::from(std::io::Error::other("boom"));
        assert_eq!(io.failure_code(), FailureCode::Io);

        let timeout = KclError::TimeoutError { millis: 10 };
        assert_eq!(timeout.failure_code(), FailureCode::Timeout);

        let missing = KclError::MissingPropertyError {
            property: "db.url".to_string(),
        };
        assert_eq!(missing.failure_code(), FailureCode::MissingProperty);
        assert_eq!(missing.to_string(), "Missing required property: db.url");
    }

    #[test]
    fn test_failure_code_of_result() {
        let ok: Result<u32> = Ok(1);
        assert_eq!(FailureCode::of(&ok), FailureCode::Success);

        let err: Result<u32> = Err(KclError::parse("abc", "not a number"));
        assert_eq!(FailureCode::of(&err), FailureCode::ConversionFailure);
    }

    #[test]
    fn test_wrapped_io_error_keeps_io_code() {
        let wrapped = KclError::wrap(std::io::Error::other("disk"), "writing report");
        assert_eq!(wrapped.failure_code(), FailureCode::Io);
        assert_eq!(wrapped.to_string(), "writing report: disk");
    }

    #[test]
    fn test_csv_failure_codes() {
        let io = KclError::from(csv::Error::from(std::io::Error::other("gone")));
        assert_eq!(io.failure_code(), FailureCode::Io);

        let uneven = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader("a,b\nc\n".as_bytes())
            .records()
            .nth(1)
            .unwrap()
            .unwrap_err();
        assert_eq!(KclError::from(uneven).failure_code(), FailureCode::ConversionFailure);
    }
}
