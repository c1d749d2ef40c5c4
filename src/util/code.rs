use super::{Code, Position};
use crate::Token;
use once_cell::unsync::OnceCell;

impl<'c> From<&'c [u8]> for Code<'c> {
    fn from(value: &'c [u8]) -> Self {
        Code::new(value)
    }
}
impl<'c> From<&'c str> for Code<'c> {
    fn from(value: &'c str) -> Self {
        Code::new(value.as_bytes())
    }
}

impl<'c> Code<'c> {
    pub fn new(value: &'c [u8]) -> Self {
        Self {
            value,
            line_breaks: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The source bytes of a byte range.
    pub fn slice(&self, start: usize, end: usize) -> &'c [u8] {
        &self.value[start..end]
    }

    /// The source bytes a token covers.
    pub fn text_of(&self, token: &Token) -> &'c [u8] {
        &self.value[token.start..token.end]
    }

    /// The token's bytes as text, for patch assembly and debug output. Invalid UTF-8
    /// is replaced rather than rejected; the engine itself is 8-bit clean.
    pub fn str_of(&self, token: &Token) -> std::borrow::Cow<'c, str> {
        String::from_utf8_lossy(self.text_of(token))
    }

    pub fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.value
                .iter()
                .enumerate()
                .filter_map(|(index, b)| if *b == b'\n' { Some(index) } else { None })
                .collect()
        })
    }

    pub fn obtain_position(&self, pointer: usize) -> Position {
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&pointer) {
            Ok(index) | Err(index) => index,
        };
        let line_start = if index == 0 { 0 } else { line_breaks[index - 1] + 1 };
        Position::new(index + 1, pointer - line_start + 1)
    }
}
