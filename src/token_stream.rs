use crate::{SigPtr, Token, TokenKind, TokenStream};
use std::fmt::Display;
use std::ops::Index;

impl Display for SigPtr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'t> From<&'t Vec<Token>> for TokenStream<'t> {
    fn from(tokens: &'t Vec<Token>) -> Self {
        TokenStream::new(tokens)
    }
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter_map(|(index, token)| {
                if token.kind.is_significant() {
                    Some(index)
                } else {
                    None
                }
            })
            .collect();
        Self {
            tokens,
            significant,
        }
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
    pub fn sig_len(&self) -> usize {
        self.significant.len()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }
    pub fn kind(&self, index: usize) -> TokenKind {
        self.tokens[index].kind
    }

    /// The token index a significant-view pointer refers to.
    pub fn sig_token(&self, index: SigPtr) -> usize {
        self.significant[index.0]
    }

    /// Locate a token index in the significant view.
    pub fn sig_index(&self, token_index: usize) -> Result<SigPtr, SigPtr> {
        match self.significant.binary_search(&token_index) {
            Ok(found) => Ok(SigPtr(found)),
            Err(found) => Err(SigPtr(found)),
        }
    }

    /// The greatest significant token index strictly before `index`.
    pub fn prev_significant(&self, index: usize) -> Option<usize> {
        let position = match self.significant.binary_search(&index) {
            Ok(found) | Err(found) => found,
        };
        if position > 0 {
            Some(self.significant[position - 1])
        } else {
            None
        }
    }

    /// The least significant token index strictly after `index`.
    pub fn next_significant(&self, index: usize) -> Option<usize> {
        let position = match self.significant.binary_search(&index) {
            Ok(found) => found + 1,
            Err(found) => found,
        };
        self.significant.get(position).copied()
    }

    /// The least significant token index at or after `index`.
    pub fn sig_at_or_after(&self, index: usize) -> Option<usize> {
        let position = match self.significant.binary_search(&index) {
            Ok(found) | Err(found) => found,
        };
        self.significant.get(position).copied()
    }

    /// The token index of the closing parenthesis matching an opening one.
    pub fn matching_paren(&self, lparen: usize) -> Option<usize> {
        debug_assert_eq!(self.tokens[lparen].kind, TokenKind::LParen);
        let mut depth: usize = 0;
        for index in lparen..self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// The token index of the closing brace matching an opening one.
    pub fn matching_brace(&self, lbrace: usize) -> Option<usize> {
        debug_assert_eq!(self.tokens[lbrace].kind, TokenKind::LBrace);
        let mut depth: usize = 0;
        for index in lbrace..self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// The token index of the semicolon terminating the statement scanned forward
    /// from `from`, skipping semicolons nested in parentheses (`for` headers) and
    /// braces (initializer lists). Returns None when a closing brace ends the
    /// enclosing block first.
    pub fn stmt_end(&self, from: usize) -> Option<usize> {
        let mut paren_depth: isize = 0;
        let mut brace_depth: isize = 0;
        for index in from..self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::LParen => paren_depth += 1,
                TokenKind::RParen => paren_depth -= 1,
                TokenKind::LBrace => brace_depth += 1,
                TokenKind::RBrace => {
                    brace_depth -= 1;
                    if brace_depth < 0 {
                        return None;
                    }
                }
                TokenKind::Semicolon => {
                    if paren_depth <= 0 && brace_depth <= 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// The first significant token index of the statement containing `at`: the walk
    /// goes backwards to the nearest semicolon or brace boundary.
    pub fn stmt_start(&self, at: usize) -> usize {
        let mut start = at;
        let mut cursor = at;
        while let Some(previous) = self.prev_significant(cursor) {
            if self.tokens[previous].kind.is_stmt_boundary() {
                break;
            }
            start = previous;
            cursor = previous;
        }
        start
    }
}

impl<'t> Index<usize> for TokenStream<'t> {
    type Output = Token;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

impl<'t> Index<SigPtr> for TokenStream<'t> {
    type Output = Token;

    fn index(&self, index: SigPtr) -> &Self::Output {
        debug_assert!(
            index.0 < self.significant.len(),
            "Trying to access index '{}' from a significant view of length '{}'",
            index,
            self.significant.len()
        );
        &self.tokens[self.significant[index.0]]
    }
}
