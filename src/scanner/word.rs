use super::{ScannerLogger, WordScanner};
use crate::util::{Code, Log};
use crate::{IScanner, Token, TokenKind};
use once_cell::unsync::OnceCell;
use regex::bytes::Regex;
use std::collections::HashMap;

impl WordScanner {
    /// Create a word scanner with a keyword spelling map.
    ///
    /// A consumed word whose bytes exactly match a spelling becomes that keyword
    /// kind; every other word is an [TokenKind::Identifier].
    pub fn new(keywords: Vec<(&str, TokenKind)>) -> Result<Self, String> {
        let regexp = Regex::new(r"^[A-Za-z_][A-Za-z_0-9]*")
            .map_err(|err| format!("Failed to compile word expression: {}", err))?;

        let mut map: HashMap<Vec<u8>, TokenKind> = HashMap::new();
        for (spelling, kind) in keywords {
            if let Some(previous) = map.insert(spelling.as_bytes().to_vec(), kind) {
                return Err(format!(
                    "Keyword '{}' is already mapped to {:?}",
                    spelling, previous
                ));
            }
        }
        Ok(Self {
            regexp,
            keywords: map,
            log: OnceCell::new(),
        })
    }

    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }
}

impl ScannerLogger for WordScanner {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>> {
        &self.log
    }
}

impl IScanner for WordScanner {
    fn consume(&self, code: &Code, pointer: usize, _: &Vec<Token>) -> Option<Token> {
        let result = self.regexp.find(&code.value[pointer..]).map(|found| {
            let end = pointer + found.end();
            let kind = self
                .keywords
                .get(&code.value[pointer..end])
                .copied()
                .unwrap_or(TokenKind::Identifier);
            Token::new(kind, pointer, end)
        });
        self.log_result(pointer, code, &result);
        result
    }
}
