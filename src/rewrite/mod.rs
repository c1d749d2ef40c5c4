//! The rewriters: per-function transform policy, signature rewriting, and body
//! rewriting.
//!
//! Every marked function receives a [Transform]: `void` returners become `int`
//! returners, pointer returners grow a trailing `T **out` parameter, and everything
//! else (including `main`) keeps its signature while its body is still brought up to
//! date. The rewriters only ever emit [Patch](crate::Patch)es; nothing is mutated in
//! place, and a construct a rewriter cannot classify simply emits no patch for that
//! site.

mod body;
mod signature;


use crate::analysis::FuncNode;
use crate::util::Code;
use crate::TokenStream;

pub use body::rewrite_body;
pub use signature::rewrite_signature;

#[derive(Debug, Clone, PartialEq, Eq)]
/// The signature/return policy applied to one function.
pub enum Transform {
    /// The signature stays; only calls and allocation checks inside the body are
    /// rewritten (`main`, and marked functions already returning `int`).
    None,
    /// `void f(args)` becomes `int f(args)`; bare `return;` becomes `return 0;`.
    VoidToInt,
    /// `T *f(args)` becomes `int f(args, T **out)`; `return expr;` stores through
    /// `out` and returns a status.
    RetPtrToArg {
        /// The returned type with one pointer level unwrapped and storage-class
        /// specifiers removed.
        pointee: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What to do with a call to a rewritten pointer-returning function whose result
/// is discarded (`f();` in statement position).
pub enum DiscardPolicy {
    /// Rewrite the call like a `void` one: take the status, pass no out-argument.
    NoOutArg,
    /// Leave the statement untouched.
    SkipSite,
}

/// The transform a marked function receives, derived from its return shape.
pub fn transform_of(stream: &TokenStream, code: &Code, func: &FuncNode) -> Transform {
    if !func.marked || func.is_main {
        return Transform::None;
    }
    if func.returns_ptr {
        Transform::RetPtrToArg {
            pointee: pointee_type(stream, code, func),
        }
    } else if func.returns_void {
        Transform::VoidToInt
    } else {
        Transform::None
    }
}

/// The return type with storage-class specifiers dropped and one trailing `*`
/// removed: `static const char *` yields `const char`.
fn pointee_type(stream: &TokenStream, code: &Code, func: &FuncNode) -> String {
    let mut parts: Vec<String> = Vec::new();
    for index in func.type_start..func.name_token {
        let token = stream[index];
        if token.kind.is_significant() && !token.kind.is_storage() {
            parts.push(code.str_of(&token).into_owned());
        }
    }
    if parts.last().map(|part| part.as_str()) == Some("*") {
        parts.pop();
    }
    parts.join(" ")
}

/// The storage-class prefix kept in front of the rewritten return type:
/// `static char *f` becomes `static int f`.
fn storage_prefix(stream: &TokenStream, code: &Code, func: &FuncNode) -> String {
    let mut prefix = String::new();
    for index in func.type_start..func.name_token {
        let token = stream[index];
        if token.kind.is_storage() {
            prefix.push_str(&code.str_of(&token));
            prefix.push(' ');
        }
    }
    prefix
}
