use crate::{Token, TokenKind};
use std::fmt::{Debug, Display, Formatter};

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("")
            .field(&self.kind)
            .field(&self.start)
            .field(&self.end)
            .finish()
    }
}

impl TokenKind {
    /// Whether the token carries grammatical meaning. Whitespace and comments are
    /// kept in the stream for byte-exact output but skipped during analysis.
    pub fn is_significant(&self) -> bool {
        match self {
            TokenKind::Whitespace | TokenKind::Comment => false,
            _ => true,
        }
    }

    pub fn is_type_keyword(&self) -> bool {
        match self {
            TokenKind::Void
            | TokenKind::Char
            | TokenKind::Int
            | TokenKind::Short
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Signed
            | TokenKind::Unsigned
            | TokenKind::Bool => true,
            _ => false,
        }
    }

    pub fn is_qualifier(&self) -> bool {
        match self {
            TokenKind::Const | TokenKind::Volatile => true,
            _ => false,
        }
    }

    /// Storage-class and function specifiers, which stay outside a rewritten return
    /// type (`static char *f` becomes `static int f`).
    pub fn is_storage(&self) -> bool {
        match self {
            TokenKind::Static
            | TokenKind::Inline
            | TokenKind::Extern
            | TokenKind::Auto
            | TokenKind::Register => true,
            _ => false,
        }
    }

    pub fn is_tag_keyword(&self) -> bool {
        match self {
            TokenKind::Struct | TokenKind::Union | TokenKind::Enum => true,
            _ => false,
        }
    }

    /// Whether a top-level declaration or definition may begin with this token.
    pub fn is_type_start(&self) -> bool {
        self.is_type_keyword()
            || self.is_qualifier()
            || self.is_storage()
            || self.is_tag_keyword()
            || *self == TokenKind::Identifier
    }

    pub fn is_assignment(&self) -> bool {
        match self {
            TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign
            | TokenKind::AmpAssign
            | TokenKind::PipeAssign
            | TokenKind::CaretAssign
            | TokenKind::ShlAssign
            | TokenKind::ShrAssign => true,
            _ => false,
        }
    }

    pub fn is_literal(&self) -> bool {
        match self {
            TokenKind::Number | TokenKind::CharLiteral | TokenKind::StringLiteral => true,
            _ => false,
        }
    }

    /// Tokens which end the statement-or-declaration scan of the grouper and the
    /// backward walks of the analyzer.
    pub fn is_stmt_boundary(&self) -> bool {
        match self {
            TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace => true,
            _ => false,
        }
    }
}
