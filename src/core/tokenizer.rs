/// Splits text on literal (non-regex) delimiters.
///
/// At every position the delimiter occurring first wins. When two
/// delimiters start at the same index the one listed first is taken.
/// A delimiter at the very end of the input ends the sequence without
/// producing an empty trailing token.
///
/// ```
/// use commons_kit::core::tokenizer::LiteralTokenizer;
///
/// let tokens: Vec<&str> = LiteralTokenizer::new("a@@b##c", &["@@", "##"]).collect();
/// assert_eq!(tokens, vec!["a", "b", "c"]);
/// ```
#[derive(Debug, Clone)]
pub struct LiteralTokenizer<'a> {
    input: &'a str,
    delimiters: Vec<&'a str>,
    return_delimiters: bool,
    pos: Option<usize>,
}

impl<'a> LiteralTokenizer<'a> {
    pub fn new(input: &'a str, delimiters: &[&'a str]) -> Self {
        Self {
            input,
            delimiters: delimiters.iter().copied().filter(|d| !d.is_empty()).collect(),
            return_delimiters: false,
            pos: Some(0),
        }
    }

    /// Yield the delimiters as tokens of their own.
    pub fn with_delimiters_returned(mut self, return_delimiters: bool) -> Self {
        self.return_delimiters = return_delimiters;
        self
    }

    fn first_delimiter(&self, pos: usize) -> Option<(usize, &'a str)> {
        let rest = &self.input[pos..];
        let mut first: Option<(usize, &'a str)> = None;
        for delimiter in &self.delimiters {
            if let Some(idx) = rest.find(delimiter) {
                if first.map_or(true, |(best, _)| idx < best) {
                    first = Some((idx, *delimiter));
                }
            }
        }
        first.map(|(idx, delimiter)| (pos + idx, delimiter))
    }

    fn advance_to(&mut self, pos: usize) {
        self.pos = if pos >= self.input.len() {
            None
        } else {
            Some(pos)
        };
    }
}

impl<'a> Iterator for LiteralTokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let pos = self.pos?;
            match self.first_delimiter(pos) {
                None => {
                    self.pos = None;
                    return Some(&self.input[pos..]);
                }
                Some((idx, delimiter)) if idx == pos => {
                    let end = pos + delimiter.len();
                    self.advance_to(end);
                    if self.return_delimiters {
                        return Some(&self.input[pos..end]);
                    }
                }
                Some((idx, _)) => {
                    self.pos = Some(idx);
                    return Some(&self.input[pos..idx]);
                }
            }
        }
    }
}
