use super::{CommentScanner, ScannerLogger};
use crate::util::{Code, Log};
use crate::{IScanner, Token, TokenKind};
use once_cell::unsync::OnceCell;

impl CommentScanner {
    pub fn new() -> Self {
        Self {
            log: OnceCell::new(),
        }
    }

    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }
}

impl ScannerLogger for CommentScanner {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>> {
        &self.log
    }
}

impl IScanner for CommentScanner {
    fn consume(&self, code: &Code, pointer: usize, _: &Vec<Token>) -> Option<Token> {
        let rest = &code.value[pointer..];
        let result = if rest.starts_with(b"/*") {
            // Unterminated block comments are legal and span the rest of the input.
            let end = match rest[2..].windows(2).position(|pair| pair == b"*/") {
                Some(found) => pointer + 2 + found + 2,
                None => code.len(),
            };
            Some(Token::new(TokenKind::Comment, pointer, end))
        } else if rest.starts_with(b"//") {
            // The newline belongs to the following whitespace token.
            let end = match rest.iter().position(|byte| *byte == b'\n') {
                Some(found) => pointer + found,
                None => code.len(),
            };
            Some(Token::new(TokenKind::Comment, pointer, end))
        } else {
            None
        };
        self.log_result(pointer, code, &result);
        result
    }
}
