use super::{MacroScanner, ScannerLogger};
use crate::util::{Code, Log};
use crate::{IScanner, Token, TokenKind};
use once_cell::unsync::OnceCell;

/// A `#` opens a preprocessor line only when nothing but whitespace and comments
/// precede it on its line.
fn at_line_start(stream: &Vec<Token>, code: &Code) -> bool {
    for token in stream.iter().rev() {
        match token.kind {
            TokenKind::Whitespace => {
                if code.text_of(token).contains(&b'\n') {
                    return true;
                }
            }
            TokenKind::Comment => {}
            _ => return false,
        }
    }
    true
}

impl MacroScanner {
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

impl ScannerLogger for MacroScanner {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>> {
        &self.log
    }
}

impl IScanner for MacroScanner {
    fn consume(&self, code: &Code, pointer: usize, stream: &Vec<Token>) -> Option<Token> {
        if code.value[pointer] != b'#' || !at_line_start(stream, code) {
            self.log_result(pointer, code, &None);
            return None;
        }

        let mut index = pointer;
        while index < code.len() {
            if code.value[index] != b'\n' {
                index += 1;
                continue;
            }
            // A backslash immediately before the newline (CR tolerated between)
            // continues the line; the newline is then part of the macro.
            let mut before = index;
            if before > pointer && code.value[before - 1] == b'\r' {
                before -= 1;
            }
            if before > pointer && code.value[before - 1] == b'\\' {
                index += 1;
            } else {
                break;
            }
        }

        let result = Some(Token::new(TokenKind::Macro, pointer, index));
        self.log_result(pointer, code, &result);
        result
    }
}
