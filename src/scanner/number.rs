use super::{NumberScanner, ScannerLogger};
use crate::util::{Code, Log};
use crate::{IScanner, Token, TokenKind};
use once_cell::unsync::OnceCell;
use regex::bytes::Regex;

impl NumberScanner {
    pub fn new() -> Result<Self, String> {
        let regexp = Regex::new(
            r"^(0[xX][0-9a-fA-F]+|0[bB][01]+|[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?)[uUlLfF]*",
        )
        .map_err(|err| format!("Failed to compile number literal expression: {}", err))?;
        Ok(Self {
            regexp,
            log: OnceCell::new(),
        })
    }

    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }
}

impl ScannerLogger for NumberScanner {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>> {
        &self.log
    }
}

impl IScanner for NumberScanner {
    fn consume(&self, code: &Code, pointer: usize, _: &Vec<Token>) -> Option<Token> {
        let result = self
            .regexp
            .find(&code.value[pointer..])
            .map(|found| Token::new(TokenKind::Number, pointer, pointer + found.end()));
        self.log_result(pointer, code, &result);
        result
    }
}
