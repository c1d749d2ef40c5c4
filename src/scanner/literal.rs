use super::{LiteralScanner, ScannerLogger};
use crate::util::{Code, Log};
use crate::{IScanner, Token, TokenKind};
use once_cell::unsync::OnceCell;

impl LiteralScanner {
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

impl ScannerLogger for LiteralScanner {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>> {
        &self.log
    }
}

impl IScanner for LiteralScanner {
    fn consume(&self, code: &Code, pointer: usize, _: &Vec<Token>) -> Option<Token> {
        let quote = code.value[pointer];
        let kind = match quote {
            b'\'' => TokenKind::CharLiteral,
            b'"' => TokenKind::StringLiteral,
            _ => {
                self.log_result(pointer, code, &None);
                return None;
            }
        };

        let mut index = pointer + 1;
        while index < code.len() {
            match code.value[index] {
                b'\\' => index += 2,
                byte if byte == quote => {
                    index += 1;
                    break;
                }
                _ => index += 1,
            }
        }
        // An escape at end of input may step past the end; the literal is
        // unterminated either way and spans the rest of the input.
        let end = index.min(code.len());

        let result = Some(Token::new(kind, pointer, end));
        self.log_result(pointer, code, &result);
        result
    }
}
