//! A module consists of the scanner utilities the C tokenizer is built from.
//!
//! Each scanner owns one lexical family and implements [IScanner](crate::IScanner):
//! offered the input and a byte position, it either consumes a token starting exactly
//! there or declines. The [Tokenizer](crate::Tokenizer) tries its scanners in order
//! and takes the first token produced, so the scanner order encodes the tie-breaks of
//! C lexing (comments before the division operator, keywords before plain
//! identifiers via the word scanner's mapping, longest operator match inside the
//! operator scanner).
//!
//! Scanners receive the token stream produced so far, which keeps context-sensitive
//! decisions local: the macro scanner uses it to decide whether a `#` sits at the
//! start of a logical line.
//!
//! # Example
//!
//! ```
//! use c_outfix::scanner::{OperatorScanner, WhitespaceScanner};
//! use c_outfix::{Code, IScanner, Token, TokenKind};
//!
//! let operators = OperatorScanner::new(vec![
//!     ("<", TokenKind::Lt),
//!     ("<<", TokenKind::Shl),
//!     ("<<=", TokenKind::ShlAssign),
//! ])
//! .unwrap();
//!
//! let code = Code::from("<<= <");
//! assert_eq!(
//!     operators.consume(&code, 0, &Vec::new()),
//!     Some(Token::new(TokenKind::ShlAssign, 0, 3))
//! );
//!
//! let space = WhitespaceScanner::new();
//! assert_eq!(
//!     space.consume(&code, 3, &Vec::new()),
//!     Some(Token::new(TokenKind::Whitespace, 3, 4))
//! );
//! assert_eq!(
//!     operators.consume(&code, 4, &Vec::new()),
//!     Some(Token::new(TokenKind::Lt, 4, 5))
//! );
//! ```

mod comment;
mod literal;
mod macro_line;
mod number;
mod operator;
mod whitespace;
mod word;

#[cfg(test)]
mod __tests__;

use crate::op_tree::OpTree;
use crate::util::{Code, Log};
use crate::{Token, TokenKind};
use once_cell::unsync::OnceCell;
use regex::bytes::Regex;
use std::collections::HashMap;

trait ScannerLogger {
    fn log_cell(&self) -> &OnceCell<Log<&'static str>>;

    fn log_result(&self, _pointer: usize, _code: &Code, _result: &Option<Token>) {
        #[cfg(debug_assertions)]
        match _result {
            Some(token) => {
                if let Some(label) = self.log_cell().get() {
                    if label.order() >= Log::Success(()).order() {
                        println!(
                            "Scanner success for {} : {:?} from {} to {}.",
                            label,
                            token.kind,
                            _code.obtain_position(token.start),
                            _code.obtain_position(token.end)
                        )
                    }
                }
            }
            None => {
                if let Some(label) = self.log_cell().get() {
                    if label.order() >= Log::Result(()).order() {
                        println!(
                            "Scanner declined for {} : at {}",
                            label,
                            _code.obtain_position(_pointer)
                        )
                    }
                }
            }
        }
    }
}

/// Consumes the longest run of space, tab, carriage return, newline, vertical tab,
/// and form feed bytes as one [TokenKind::Whitespace] token.
pub struct WhitespaceScanner {
    log: OnceCell<Log<&'static str>>,
}

/// Consumes `/* ... */` block comments and `// ...` line comments.
///
/// An unterminated block comment is legal and spans the rest of the input. The
/// newline ending a line comment is not part of the comment; it belongs to the
/// following whitespace token.
pub struct CommentScanner {
    log: OnceCell<Log<&'static str>>,
}

/// Consumes a preprocessor line opened by `#` at the start of a logical line,
/// extending to the end of the line with backslash-newline continuations included.
///
/// A `#` anywhere else is declined and falls through to the operator scanner.
pub struct MacroScanner {
    log: OnceCell<Log<&'static str>>,
}

/// Consumes `'...'` character literals and `"..."` string literals, honoring
/// backslash escapes. An unterminated literal spans the rest of the input.
pub struct LiteralScanner {
    log: OnceCell<Log<&'static str>>,
}

/// Consumes number literals: decimal, hex (`0x…`), binary (`0b…`), and octal
/// integers, fractions, exponents, and integer/float suffixes, plus the `.5` forms.
pub struct NumberScanner {
    regexp: Regex,
    log: OnceCell<Log<&'static str>>,
}

/// Consumes identifier-shaped words and classifies them through a spelling map:
/// an exact match yields the keyword kind, anything else is
/// [TokenKind::Identifier].
pub struct WordScanner {
    regexp: Regex,
    keywords: HashMap<Vec<u8>, TokenKind>,
    log: OnceCell<Log<&'static str>>,
}

/// Consumes operator and punctuation tokens by longest match over a byte trie.
pub struct OperatorScanner {
    tree: OpTree,
    spellings: Vec<(String, TokenKind)>,
    log: OnceCell<Log<&'static str>>,
}
