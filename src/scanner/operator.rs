use super::{OperatorScanner, ScannerLogger};
use crate::op_tree::OpTree;
use crate::util::{Code, Log};
use crate::{IScanner, Token, TokenKind};
use once_cell::unsync::OnceCell;

impl OperatorScanner {
    /// Create an operator scanner for a set of constant spellings.
    pub fn new(fields: Vec<(&str, TokenKind)>) -> Result<Self, String> {
        let mut tree = OpTree::new();
        for (spelling, kind) in &fields {
            tree.insert(spelling.as_bytes(), *kind).map_err(|err| {
                format!("Operator '{}' is already added with kind {:?}", spelling, err)
            })?;
        }
        Ok(Self {
            tree,
            spellings: fields
                .iter()
                .map(|(spelling, kind)| (spelling.to_string(), *kind))
                .collect(),
            log: OnceCell::new(),
        })
    }

    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub fn spellings(&self) -> &Vec<(String, TokenKind)> {
        &self.spellings
    }
}

impl ScannerLogger for OperatorScanner {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>> {
        &self.log
    }
}

impl IScanner for OperatorScanner {
    fn consume(&self, code: &Code, pointer: usize, _: &Vec<Token>) -> Option<Token> {
        let result = self
            .tree
            .find(&code.value[pointer..])
            .map(|(kind, length)| Token::new(kind, pointer, pointer + length));
        self.log_result(pointer, code, &result);
        result
    }
}
