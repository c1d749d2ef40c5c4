mod code;
mod logger;
mod position;
use once_cell::unsync::OnceCell;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// The line and column information at a byte position of the input.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A wrapper for the C translation unit being refactored.
///
/// The wrapped bytes are borrowed for the lifetime of one pipeline invocation; every
/// token and node produced by the pipeline refers back into them. Line breaks are
/// indexed lazily for position reporting in debug output. The wrapper is 8-bit clean:
/// no UTF-8 validation is performed.
pub struct Code<'c> {
    pub value: &'c [u8],
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to the tokenizer and the
/// pipeline driver.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}
