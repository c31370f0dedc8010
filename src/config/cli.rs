use crate::config::lib_config::LibConfig;
use crate::utils::error::{KclError, Result};
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "commons-kit")]
#[command(about = "Text, process, property and archive helpers from the command line")]
pub struct CliConfig {
    /// TOML file with library settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit log records as JSON")]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Split text on literal delimiters
    Tokenize {
        text: String,
        #[arg(short, long = "delimiter", required = true)]
        delimiters: Vec<String>,
        #[arg(long)]
        keep_delimiters: bool,
    },
    /// Sort version numbers
    Version {
        #[arg(required = true)]
        versions: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Substitute variables within a text file
    Resolve {
        file: PathBuf,
        #[arg(long)]
        properties: Option<PathBuf>,
        #[arg(long)]
        env: bool,
        #[arg(long)]
        sys: bool,
        #[arg(long)]
        var_format: Option<String>,
    },
    /// Print `/` separated paths as a tree
    Tree {
        /// Reads stdin when omitted
        file: Option<PathBuf>,
        #[arg(long)]
        xml: bool,
    },
    /// Run an external program
    Exec {
        program: PathBuf,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// KEY=VALUE, can be repeated
        #[arg(long = "env")]
        variables: Vec<String>,
        #[arg(long)]
        clean_env: bool,
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
    /// Archive a directory
    Zip { dir: PathBuf, output: PathBuf },
    /// Extract an archive
    Unzip { archive: PathBuf, dest: PathBuf },
    /// Print a CSV file as JSON records
    Csv {
        file: PathBuf,
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,
        #[arg(long)]
        title_row: bool,
        /// Pad short lines instead of failing
        #[arg(long)]
        fill: bool,
        #[arg(long)]
        max_lines: Option<usize>,
    },
    /// List a directory recursively
    List {
        dir: PathBuf,
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long)]
        dirs: bool,
    },
}

impl CliConfig {
    /// Loads the configured TOML file or falls back to the defaults.
    pub fn lib_config(&self) -> Result<LibConfig> {
        let config = match &self.config {
            Some(path) if !path.is_file() => {
                return Err(KclError::ConfigError {
                    message: format!("config file {} not found", path.display()),
                })
            }
            Some(path) => LibConfig::from_file(path)?,
            None => LibConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Splits `KEY=VALUE`.
pub fn parse_variable(text: &str) -> Result<(String, String)> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(KclError::InvalidValueError {
            field: "env".to_string(),
            value: text.to_string(),
            reason: "expected KEY=VALUE".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exec_command() {
        let config = CliConfig::parse_from([
            "commons-kit",
            "--verbose",
            "exec",
            "--timeout-ms",
            "500",
            "--env",
            "A=1",
            "/bin/echo",
            "-n",
            "hello",
        ]);
        assert!(config.verbose);
        match config.command {
            Command::Exec {
                program,
                args,
                timeout_ms,
                variables,
                clean_env,
                ..
            } => {
                assert_eq!(program, PathBuf::from("/bin/echo"));
                assert_eq!(args, vec!["-n", "hello"]);
                assert_eq!(timeout_ms, Some(500));
                assert_eq!(variables, vec!["A=1"]);
                assert!(!clean_env);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_tokenize_command() {
        let config =
            CliConfig::parse_from(["commons-kit", "tokenize", "a,b;c", "-d", ",", "-d", ";"]);
        match config.command {
            Command::Tokenize { text, delimiters, keep_delimiters } => {
                assert_eq!(text, "a,b;c");
                assert_eq!(delimiters, vec![",", ";"]);
                assert!(!keep_delimiters);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_csv_command() {
        let config = CliConfig::parse_from([
            "commons-kit",
            "csv",
            "people.csv",
            "-d",
            ";",
            "--title-row",
            "--max-lines",
            "10",
        ]);
        match config.command {
            Command::Csv {
                file,
                delimiter,
                title_row,
                fill,
                max_lines,
            } => {
                assert_eq!(file, PathBuf::from("people.csv"));
                assert_eq!(delimiter, ';');
                assert!(title_row);
                assert!(!fill);
                assert_eq!(max_lines, Some(10));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_default_lib_config() {
        let config = CliConfig::parse_from(["commons-kit", "version", "1.0"]);
        assert_eq!(config.lib_config().unwrap().buffer_size(), 8192);

        let missing =
            CliConfig::parse_from(["commons-kit", "--config", "/no/such.toml", "version", "1.0"]);
        assert!(missing.lib_config().is_err());
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(
            parse_variable("PATH=/bin:/usr/bin").unwrap(),
            ("PATH".to_string(), "/bin:/usr/bin".to_string())
        );
        assert_eq!(parse_variable("EMPTY=").unwrap().1, "");
        assert!(parse_variable("=value").is_err());
        assert!(parse_variable("novalue").is_err());
    }
}
