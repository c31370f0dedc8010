use crate::domain::constants::Encoding;
use crate::utils::text::cleanup;
use std::collections::BTreeMap;

const ESCAPES: [(char, &str); 5] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&apos;"),
];

/// Escapes the XML special characters. With `line_endings` the characters
/// `\n` and `\r` become `&#10;` and `&#13;`.
pub fn escape_xml(text: &str, line_endings: bool) -> String {
    let mut result = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ESCAPES.iter().find(|(c, _)| *c == ch) {
            Some((_, entity)) => result.push_str(entity),
            None if line_endings && ch == '\n' => result.push_str("&#10;"),
            None if line_endings && ch == '\r' => result.push_str("&#13;"),
            None => result.push(ch),
        }
    }
    result
}

/// Reverses [`escape_xml`]. With `line_endings` the literal sequences `\n`
/// and `\r` are accepted next to the numeric entities.
pub fn unescape_xml(text: &str, line_endings: bool) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while !rest.is_empty() {
        for (ch, entity) in ESCAPES.iter() {
            if let Some(tail) = rest.strip_prefix(entity) {
                result.push(*ch);
                rest = tail;
                continue 'outer;
            }
        }
        if line_endings {
            for (literal, ch) in [("&#10;", '\n'), ("&#13;", '\r'), ("\\n", '\n'), ("\\r", '\r')] {
                if let Some(tail) = rest.strip_prefix(literal) {
                    result.push(ch);
                    rest = tail;
                    continue 'outer;
                }
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            result.push(ch);
        }
        rest = chars.as_str();
    }
    result
}

/// Small string based XML writer.
///
/// Tags opened with [`XmlGenerator::open_tag`] are tracked on a stack and
/// closed automatically by [`XmlGenerator::to_xml`].
#[derive(Debug, Clone)]
pub struct XmlGenerator {
    buffer: String,
    encoding: Encoding,
    tags: Vec<String>,
    indentation: String,
    indent: String,
}

impl Default for XmlGenerator {
    fn default() -> Self {
        Self::new(Encoding::Utf8, 2)
    }
}

impl XmlGenerator {
    pub fn new(encoding: Encoding, indent_size: usize) -> Self {
        Self {
            buffer: String::new(),
            encoding,
            tags: Vec::new(),
            indentation: String::new(),
            indent: " ".repeat(indent_size),
        }
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.tags.clear();
        self.indentation.clear();
    }

    fn push_indent(&mut self) {
        self.indentation.push_str(&self.indent);
    }

    fn pop_indent(&mut self) {
        let len = self.indentation.len().saturating_sub(self.indent.len());
        self.indentation.truncate(len);
    }

    fn write_attributes(&mut self, attributes: &[(&str, &str)]) {
        let sorted: BTreeMap<String, &str> = attributes
            .iter()
            .filter_map(|(key, value)| cleanup(Some(key)).map(|k| (k, *value)))
            .collect();
        for (key, value) in sorted {
            self.buffer
                .push_str(&format!(" {}=\"{}\"", key, escape_xml(value, false)));
        }
    }

    /// Writes a complete element. Without text the element is empty (`<a/>`),
    /// multi-line text is written on its own indented line.
    pub fn tag(&mut self, name: &str, text: Option<&str>, attributes: &[(&str, &str)]) -> &mut Self {
        let name = name.trim().to_string();
        let text = cleanup(text);
        self.buffer.push_str(&self.indentation);
        self.buffer.push('<');
        self.buffer.push_str(&name);
        self.write_attributes(attributes);
        match text {
            Some(text) if text.contains('\n') => {
                self.buffer.push_str(">\n");
                self.push_indent();
                let line = format!("{}{}\n", self.indentation, escape_xml(&text, false));
                self.buffer.push_str(&line);
                self.pop_indent();
                self.buffer.push_str(&self.indentation);
                self.buffer.push_str(&format!("</{}>\n", name));
            }
            Some(text) => {
                self.buffer
                    .push_str(&format!(">{}</{}>\n", escape_xml(&text, false), name));
            }
            None => self.buffer.push_str("/>\n"),
        }
        self
    }

    pub fn open_tag(&mut self, name: &str, attributes: &[(&str, &str)]) -> &mut Self {
        let name = name.trim().to_string();
        self.buffer.push_str(&self.indentation);
        self.buffer.push('<');
        self.buffer.push_str(&name);
        self.write_attributes(attributes);
        self.buffer.push_str(">\n");
        self.tags.push(name);
        self.push_indent();
        self
    }

    /// Closes the innermost open tag. Does nothing when no tag is open.
    pub fn close_tag(&mut self) -> &mut Self {
        if let Some(name) = self.tags.pop() {
            self.pop_indent();
            self.buffer
                .push_str(&format!("{}</{}>\n", self.indentation, name));
        }
        self
    }

    /// A `]]>` inside the text is split across two sections.
    pub fn cdata(&mut self, text: &str) -> &mut Self {
        let text = text.replace("]]>", "]]]]><![CDATA[>");
        self.buffer.push_str(&format!("<![CDATA[{}]]>\n", text));
        self
    }

    pub fn processing_instruction(&mut self) -> &mut Self {
        self.buffer.push_str(&format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>\n",
            self.encoding.name()
        ));
        self
    }

    pub fn comment(&mut self, comment: &str) -> &mut Self {
        self.buffer.push_str(&format!(
            "{}<!-- {} -->\n",
            self.indentation,
            escape_xml(comment, false)
        ));
        self
    }

    pub fn multiline_comment(&mut self, comment: &str) -> &mut Self {
        self.buffer
            .push_str(&format!("{}<!-- ~~~~~~~~~~~~~~~~~\n", self.indentation));
        for line in comment.trim().split('\n') {
            if line.trim().is_empty() {
                self.buffer.push('\n');
            } else {
                self.buffer
                    .push_str(&format!("{}{}\n", self.indentation, line));
            }
        }
        self.buffer
            .push_str(&format!("{}~~~~~~~~~~~~~~~~~~ -->\n", self.indentation));
        self
    }

    pub fn open_tags(&self) -> usize {
        self.tags.len()
    }

    /// Closes all remaining tags and returns the document.
    pub fn to_xml(&mut self) -> String {
        while !self.tags.is_empty() {
            self.close_tag();
        }
        self.buffer.clone()
    }
}
