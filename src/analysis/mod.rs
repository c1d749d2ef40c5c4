//! The analysis phases: allocation sites and the call graph.
//!
//! [find_alloc_sites] locates every call to a recognized allocator and classifies it
//! as checked or unchecked, recording the assigned variable where one exists.
//! [CallGraph] builds one [FuncNode] per grouped function definition, records caller
//! edges by scanning bodies for calls to known names, and
//! [propagates](CallGraph::propagate) the refactoring mark from the seed set — the
//! functions that allocate and return a pointer or `void` — to every transitive
//! caller.
//!
//! Analysis never fails: an allocation whose assigned variable cannot be determined
//! is still counted, with `var_name` left empty, and a construct the heuristics do
//! not understand simply contributes nothing.

mod alloc;
mod call_graph;

#[cfg(test)]
mod __tests__;

pub use alloc::find_alloc_sites;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a correct failure check for an allocator is shaped.
pub enum CheckShape {
    /// The result is a pointer; failure is `NULL`.
    PtrNull,
    /// The result is an `int`; failure is negative (`asprintf`).
    IntNegative,
    /// The result is an `int`; failure is any non-zero value.
    IntNonzero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where an allocator delivers the new memory.
pub enum AllocResult {
    /// Through the return value (`malloc`, `strdup`, ...).
    Returned,
    /// Through an out-parameter; the return value is only a status (`asprintf`).
    OutParam,
}

#[derive(Debug, Clone)]
/// One recognized allocator: its spelling, check shape, and result route.
pub struct AllocSpec {
    pub name: String,
    pub shape: CheckShape,
    pub result: AllocResult,
}

/// The immutable allocator recognition table.
///
/// The default set covers the libc allocators; [AllocatorTable::new] builds an
/// extended table, rejecting duplicate spellings.
#[derive(Debug, Clone)]
pub struct AllocatorTable {
    specs: Vec<AllocSpec>,
}

#[derive(Debug, Clone)]
/// One call to a recognized allocator.
pub struct AllocSite {
    /// Token index of the allocator identifier.
    pub token_index: usize,
    /// The variable the result is assigned to, when the analyzer could find one.
    pub var_name: Option<String>,
    /// Index into the [AllocatorTable] the site was found with.
    pub spec_index: usize,
    pub is_checked: bool,
    pub used_before_check: bool,
    /// The allocator call is the expression of a `return` statement.
    pub is_return_stmt: bool,
}

#[derive(Debug, Clone)]
/// One function definition in the call graph.
pub struct FuncNode {
    /// Index of the [CstNode](crate::CstNode) the function was built from.
    pub cst_index: usize,
    pub name: String,
    /// First token of the node (leading whitespace included).
    pub token_start: usize,
    /// First significant token: where the return type begins.
    pub type_start: usize,
    /// Token index of the function name.
    pub name_token: usize,
    /// Token index of the body's opening brace.
    pub body_start: usize,
    /// One past the body's closing brace.
    pub token_end: usize,
    pub returns_void: bool,
    pub returns_ptr: bool,
    /// Verbatim source from the first significant token through the token before
    /// the name.
    pub return_type: String,
    pub is_main: bool,
    pub contains_allocs: bool,
    pub marked: bool,
    /// Indices of the functions that call this one, de-duplicated.
    pub callers: Vec<usize>,
}

/// The function nodes of one translation unit plus the reverse call edges.
#[derive(Debug)]
pub struct CallGraph {
    nodes: Vec<FuncNode>,
}
