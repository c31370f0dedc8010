use crate::domain::constants::Encoding;
use crate::utils::error::{KclError, Result};
use crate::utils::text::cleanup;
use crate::utils::validation::{validate_positive_number, Validate};
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// How CSV text is split into cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub title_row: bool,
    pub delimiter: char,
    /// Line breaks inside cells become `\n`.
    pub disable_cr: bool,
    /// Short lines are padded with empty cells instead of being rejected.
    pub fill_missing_columns: bool,
    pub consume_single_quotes: bool,
    pub consume_double_quotes: bool,
    /// Upper bound for the number of lines read, title row included.
    pub max_lines: Option<usize>,
    pub encoding: Encoding,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            title_row: false,
            delimiter: ',',
            disable_cr: true,
            fill_missing_columns: false,
            consume_single_quotes: true,
            consume_double_quotes: true,
            max_lines: None,
            encoding: Encoding::Utf8,
        }
    }
}

impl CsvOptions {
    pub fn builder() -> CsvOptionsBuilder {
        CsvOptionsBuilder::default()
    }

    fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| KclError::InvalidValueError {
                field: "delimiter".to_string(),
                value: self.delimiter.to_string(),
                reason: "delimiter must be an ASCII character".to_string(),
            })
    }
}

impl Validate for CsvOptions {
    fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if matches!(self.delimiter, '"' | '\'' | '\r' | '\n') {
            return Err(KclError::InvalidValueError {
                field: "delimiter".to_string(),
                value: self.delimiter.escape_default().to_string(),
                reason: "quotes and line breaks cannot separate cells".to_string(),
            });
        }
        if let Some(max_lines) = self.max_lines {
            validate_positive_number("max_lines", max_lines, 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvOptionsBuilder {
    options: CsvOptions,
}

impl CsvOptionsBuilder {
    pub fn title_row(mut self, enable: bool) -> Self {
        self.options.title_row = enable;
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    pub fn disable_cr(mut self, enable: bool) -> Self {
        self.options.disable_cr = enable;
        self
    }

    pub fn fill_missing_columns(mut self, enable: bool) -> Self {
        self.options.fill_missing_columns = enable;
        self
    }

    pub fn single_quotes(mut self, consume: bool) -> Self {
        self.options.consume_single_quotes = consume;
        self
    }

    pub fn double_quotes(mut self, consume: bool) -> Self {
        self.options.consume_double_quotes = consume;
        self
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.options.max_lines = Some(max_lines);
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.options.encoding = encoding;
        self
    }

    pub fn build(self) -> Result<CsvOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// CSV content held in memory. Blank cells are `None`; every row has one
/// entry per title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    options: CsvOptions,
    titles: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl CsvTable {
    pub fn load<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| KclError::wrap(e, format!("Cannot open {}", path.display())))?;
        Self::from_reader(BufReader::new(file), options)
    }

    pub fn from_reader<R: Read>(mut reader: R, options: &CsvOptions) -> Result<Self> {
        options.validate()?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let text = options.encoding.decode(&data)?;

        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(options.delimiter_byte()?);
        match (options.consume_double_quotes, options.consume_single_quotes) {
            (true, _) => builder.quote(b'"'),
            (false, true) => builder.quote(b'\''),
            (false, false) => builder.quoting(false),
        };

        let mut lines = Vec::new();
        for record in builder.from_reader(text.as_bytes()).records() {
            if options.max_lines.is_some_and(|max| lines.len() >= max) {
                break;
            }
            let line: Vec<Option<String>> = record?
                .iter()
                .map(|cell| normalize(cell, options))
                .collect();
            if line.iter().any(Option::is_some) {
                lines.push(line);
            }
        }
        Self::from_lines(lines, options)
    }

    fn from_lines(mut lines: Vec<Vec<Option<String>>>, options: &CsvOptions) -> Result<Self> {
        let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
        if options.fill_missing_columns {
            for line in &mut lines {
                line.resize(columns, None);
            }
        } else if let Some(index) = lines.iter().position(|line| line.len() != columns) {
            return Err(KclError::InvalidValueError {
                field: "csv".to_string(),
                value: format!("line {}", index + 1),
                reason: format!(
                    "expected {} columns but found {}",
                    columns,
                    lines[index].len()
                ),
            });
        }

        let title_cells = if options.title_row && !lines.is_empty() {
            lines.remove(0)
        } else {
            Vec::new()
        };
        let titles = (0..columns)
            .map(|index| match title_cells.get(index) {
                Some(Some(title)) => title.clone(),
                _ => format!("Column {}", index),
            })
            .collect();

        tracing::debug!("Loaded {} csv rows with {} columns", lines.len(), columns);
        Ok(Self {
            options: options.clone(),
            titles,
            rows: lines,
        })
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn column_count(&self) -> usize {
        self.titles.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn column_index(&self, title: &str) -> Option<usize> {
        self.titles.iter().position(|t| t == title)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// All cells of the named column, top to bottom.
    pub fn column(&self, title: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(title)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).and_then(|cell| cell.as_deref()))
                .collect(),
        )
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Option<String>]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Returns `false` when there is no such column.
    pub fn remove_column(&mut self, title: &str) -> bool {
        let Some(index) = self.column_index(title) else {
            return false;
        };
        self.titles.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        true
    }

    /// Writes the titles followed by all rows. Every cell gets quoted.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .delimiter(self.options.delimiter_byte()?)
            .quote_style(QuoteStyle::Always)
            .from_writer(writer);
        csv_writer.write_record(&self.titles)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_to(BufWriter::new(file))
    }
}

fn normalize(cell: &str, options: &CsvOptions) -> Option<String> {
    let mut value = cell.to_string();
    // with both quote kinds enabled the reader only unquotes double quotes
    if options.consume_single_quotes
        && options.consume_double_quotes
        && value.len() >= 2
        && value.starts_with('\'')
        && value.ends_with('\'')
    {
        value = value[1..value.len() - 1].replace("''", "'");
    }
    if options.disable_cr {
        value = value.replace("\r\n", "\n").replace('\r', "\n");
    }
    cleanup(Some(&value))
}
