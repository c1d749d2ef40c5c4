//! c-outfix is a source-to-source refactoring engine which rewrites C functions that
//! allocate heap memory and return a pointer or `void` into the out-parameter idiom:
//! every rewritten function returns an `int` status code and writes its result through
//! a trailing `T **out` parameter, and allocation failures are propagated up the call
//! graph as `ENOMEM`.
//!
//! # Overview
//! Refactoring C by hand to add allocation-failure handling is repetitive and easy to
//! get wrong: every allocating function, and transitively every caller, has to change
//! shape together. This crate automates the transformation for one translation unit at
//! a time. The engine deliberately works on tokens rather than a semantic AST, so it
//! preserves every byte of whitespace and every comment in code it does not rewrite;
//! a file in which nothing needs to change is returned byte-identical.
//!
//! # Design
//! The pipeline is a fixed sequence of phases over in-memory data:
//!
//! 1. A byte-level [Tokenizer] splits the source into typed [Token]s which cover the
//!    input exactly. The tokenizer is an ordered set of [IScanner] utilities, one per
//!    lexical family (whitespace, comments, macros, literals, numbers, words,
//!    operators), and it is total: malformed input still tokenizes.
//! 2. A concrete-syntax grouper ([cst::group]) segments the token stream into
//!    top-level [CstNode]s: function definitions, struct/enum/union blocks, macros,
//!    comments, and a catch-all for everything else.
//! 3. An allocation analyzer ([analysis::find_alloc_sites]) locates calls to a
//!    recognized allocator set and classifies each site as checked or unchecked.
//! 4. A call graph ([analysis::CallGraph]) seeds the refactoring on functions which
//!    allocate and return an unsafe type, then transitively marks their callers.
//! 5. Signature and body rewriters ([rewrite]) emit token-range [Patch]es for every
//!    marked function, and a patch engine ([apply_patches]) merges the patches with
//!    the original token stream into the output bytes.
//!
//! The whole pipeline is exposed as one pure function, [refactor_source]; the
//! configurable form is [Refactorer]. File I/O, directory walking, and CLI handling
//! are left to the caller.
//!
//! # Example
//!
//! ```
//! use c_outfix::refactor_source;
//!
//! let source = br#"char *clone_tag(const char *tag) {
//!     char *copy = strdup(tag);
//!     return copy;
//! }"#;
//!
//! let output = refactor_source(source).unwrap();
//! let text = String::from_utf8(output).unwrap();
//!
//! assert!(text.contains("int clone_tag(const char *tag, char **out)"));
//! assert!(text.contains("if (!copy) { return ENOMEM; }"));
//! assert!(text.contains("*out = copy; return 0;"));
//! ```
//!
//! A function that is already safe flows through untouched:
//!
//! ```
//! use c_outfix::refactor_source;
//!
//! let source = b"int add(int a, int b) { return a + b; }\n";
//! assert_eq!(refactor_source(source).unwrap(), source.to_vec());
//! ```

pub mod analysis;
pub mod cst;
mod error;
pub mod examples;
mod op_tree;
mod patch;
mod pipeline;
pub mod rewrite;
pub mod scanner;
mod token;
mod token_stream;
mod tokenization;
mod util;

use once_cell::unsync::OnceCell;
use std::rc::Rc;

pub use analysis::{
    AllocResult, AllocSite, AllocSpec, AllocatorTable, CallGraph, CheckShape, FuncNode,
};
pub use patch::apply_patches;
pub use pipeline::refactor_source;
pub use rewrite::{DiscardPolicy, Transform};
pub use tokenization::c_tokenizer;
pub use util::{Code, Log, Position};

/// A typed region of the source text.
///
/// The byte span always refers back into the original source; tokens never own text.
/// Concatenating `source[start..end]` over a tokenized stream reproduces the source
/// exactly, including whitespace and comments.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// The closed set of token kinds the engine distinguishes.
///
/// Reserved words outside the recognized keyword list (such as `goto` or `typedef`)
/// tokenize as [TokenKind::Identifier]; the analyzer has no use for them. A byte that
/// belongs to no family at all becomes a one-byte [TokenKind::Unknown] token so that
/// the tokenizer stays total.
pub enum TokenKind {
    // structural
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Question,
    Hash,
    // operators
    Assign,
    Eq,
    Ne,
    Arrow,
    Dot,
    Ellipsis,
    Star,
    Amp,
    Plus,
    Minus,
    Slash,
    Percent,
    Not,
    Tilde,
    Caret,
    Pipe,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    ShlAssign,
    ShrAssign,
    // lexical
    Identifier,
    Number,
    CharLiteral,
    StringLiteral,
    Comment,
    Macro,
    Whitespace,
    Unknown,
    // keywords
    Struct,
    Union,
    Enum,
    Static,
    Inline,
    Extern,
    Const,
    Volatile,
    Auto,
    Register,
    If,
    While,
    For,
    Switch,
    Return,
    StaticAssert,
    Void,
    Char,
    Int,
    Short,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Bool,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// An index into the significant (non-whitespace, non-comment) view of a
/// [TokenStream].
pub struct SigPtr(pub(crate) usize);

/// A navigation wrapper over a tokenized stream.
///
/// Alongside the full token list, the stream keeps a filtered index of significant
/// tokens so the analyzer and the rewriters can walk backwards and forwards over
/// meaningful tokens without repeatedly skipping whitespace and comments.
#[derive(Debug)]
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    significant: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// Discriminant of a [CstNode].
pub enum CstKind {
    Function,
    Struct,
    Enum,
    Union,
    Comment,
    Macro,
    Attribute,
    StaticAssert,
    GenericSelection,
    Other,
}

/// One grouped region of the token stream.
///
/// Node boundaries are aligned to token boundaries and consecutive top-level nodes
/// tile the stream: a node's `token_start` equals the previous node's `token_end`.
/// Struct, enum, and union nodes carry their members as nested [CstKind::Other]
/// children.
#[derive(Debug, Clone)]
pub struct CstNode {
    pub kind: CstKind,
    pub start: usize,
    pub end: usize,
    pub token_start: usize,
    pub token_end: usize,
    pub children: Vec<CstNode>,
}

/// A replacement or insertion against the token stream.
///
/// The patch covers the token range `start..end`; when `start == end` the patch is an
/// insertion before token `start`. Patch text is owned; the patch engine concatenates
/// it with original source slices and never edits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An error returned from the refactoring pipeline.
///
/// The pipeline is total over malformed input, so the taxonomy is small: misuse of
/// the API surface, allocation failure, and the internal-invariant case the patch
/// engine reports when it is handed overlapping replacements (which the rewriters
/// never produce in practice).
pub enum RefactorError {
    InvalidArgument(String),
    OutOfMemory(String),
    InternalInvariant(String),
}

/// An interface implemented by the scanner utilities a [Tokenizer] is built from.
///
/// The tokenizer calls each scanner in order at the current byte position; the first
/// scanner to return a token wins, and the token must start exactly at the position
/// it was offered.
pub trait IScanner {
    fn consume(&self, code: &Code, pointer: usize, stream: &Vec<Token>) -> Option<Token>;
}

/// The byte-level tokenizer.
///
/// A [Tokenizer] holds an ordered set of [IScanner] utilities and drives them over
/// the input in a single linear pass. Use [c_tokenizer] for the standard C scanner
/// set. Tokenization never fails on malformed input: any byte no scanner claims is
/// emitted as a one-byte [TokenKind::Unknown] token.
pub struct Tokenizer {
    scanners: Vec<Rc<dyn IScanner>>,
    debug: OnceCell<Log<&'static str>>,
}

/// The configurable pipeline driver.
///
/// Holds the tokenizer, the allocator recognition table, and the policy for calls to
/// rewritten pointer-returning functions whose result is discarded. [refactor_source]
/// is the convenience form with every knob at its default.
pub struct Refactorer {
    tokenizer: Tokenizer,
    allocators: AllocatorTable,
    discard: DiscardPolicy,
    debug: OnceCell<Log<&'static str>>,
}
