use super::{ScannerLogger, WhitespaceScanner};
use crate::util::{Code, Log};
use crate::{IScanner, Token, TokenKind};
use once_cell::unsync::OnceCell;

fn is_space(byte: u8) -> bool {
    match byte {
        b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c => true,
        _ => false,
    }
}

impl WhitespaceScanner {
    pub fn new() -> Self {
        Self {
            log: OnceCell::new(),
        }
    }

    /// Set a log label to debug the scanner.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }
}

impl ScannerLogger for WhitespaceScanner {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>> {
        &self.log
    }
}

impl IScanner for WhitespaceScanner {
    fn consume(&self, code: &Code, pointer: usize, _: &Vec<Token>) -> Option<Token> {
        let mut end = pointer;
        while end < code.len() && is_space(code.value[end]) {
            end += 1;
        }
        let result = if end > pointer {
            Some(Token::new(TokenKind::Whitespace, pointer, end))
        } else {
            None
        };
        self.log_result(pointer, code, &result);
        result
    }
}
