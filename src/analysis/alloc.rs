use super::{AllocResult, AllocSite, AllocSpec, AllocatorTable, CheckShape};
use crate::util::Code;
use crate::{SigPtr, TokenKind, TokenStream};

impl AllocSpec {
    pub fn new(name: &str, shape: CheckShape, result: AllocResult) -> Self {
        Self {
            name: name.to_string(),
            shape,
            result,
        }
    }
}

impl AllocatorTable {
    /// Create a table from a spec list, rejecting duplicate spellings.
    pub fn new(mut specs: Vec<AllocSpec>) -> Result<Self, String> {
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in specs.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(format!("Allocator '{}' is already added.", pair[0].name));
            }
        }
        Ok(Self { specs })
    }

    /// The libc allocator allow-list.
    pub fn default_set() -> Self {
        AllocatorTable::new(vec![
            AllocSpec::new("malloc", CheckShape::PtrNull, AllocResult::Returned),
            AllocSpec::new("calloc", CheckShape::PtrNull, AllocResult::Returned),
            AllocSpec::new("realloc", CheckShape::PtrNull, AllocResult::Returned),
            AllocSpec::new("strdup", CheckShape::PtrNull, AllocResult::Returned),
            AllocSpec::new("strndup", CheckShape::PtrNull, AllocResult::Returned),
            AllocSpec::new("asprintf", CheckShape::IntNegative, AllocResult::OutParam),
            AllocSpec::new("vasprintf", CheckShape::IntNegative, AllocResult::OutParam),
        ])
        .unwrap()
    }

    pub fn find(&self, name: &[u8]) -> Option<(usize, &AllocSpec)> {
        self.specs
            .binary_search_by(|spec| spec.name.as_bytes().cmp(name))
            .ok()
            .map(|index| (index, &self.specs[index]))
    }

    pub fn get(&self, index: usize) -> &AllocSpec {
        &self.specs[index]
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for AllocatorTable {
    fn default() -> Self {
        AllocatorTable::default_set()
    }
}

/// Locate every call to a recognized allocator, ordered by token index.
///
/// An allocator identifier is a site only when it is an actual call: followed by a
/// parenthesis and not reached through `->` or `.`. Classification never fails; a
/// site whose assigned variable cannot be determined is recorded with `var_name`
/// empty.
pub fn find_alloc_sites(
    stream: &TokenStream,
    code: &Code,
    table: &AllocatorTable,
) -> Vec<AllocSite> {
    let mut sites: Vec<AllocSite> = Vec::new();

    for position in 0..stream.sig_len() {
        let token_index = stream.sig_token(SigPtr(position));
        let token = stream[token_index];
        if token.kind != TokenKind::Identifier {
            continue;
        }
        let (spec_index, _) = match table.find(code.text_of(&token)) {
            Some(found) => found,
            None => continue,
        };

        match stream.next_significant(token_index) {
            Some(next) if stream.kind(next) == TokenKind::LParen => {}
            _ => continue,
        }
        let previous = stream.prev_significant(token_index);
        match previous.map(|prev| stream.kind(prev)) {
            Some(TokenKind::Arrow) | Some(TokenKind::Dot) => continue,
            Some(TokenKind::Return) => {
                sites.push(AllocSite {
                    token_index,
                    var_name: None,
                    spec_index,
                    is_checked: false,
                    used_before_check: false,
                    is_return_stmt: true,
                });
                continue;
            }
            _ => {}
        }

        let var_name = assigned_variable(stream, code, token_index);
        let mut is_checked = in_condition(stream, token_index);
        let mut used_before_check = false;
        if !is_checked {
            if let Some(var) = &var_name {
                let (checked, used) = checked_later(stream, code, token_index, var);
                is_checked = checked;
                used_before_check = used;
            }
        }

        sites.push(AllocSite {
            token_index,
            var_name,
            spec_index,
            is_checked,
            used_before_check,
            is_return_stmt: false,
        });
    }
    sites
}

/// Walk backwards from the call to the statement boundary looking for `=`; on a
/// hit, the nearest preceding identifier is the assigned variable.
fn assigned_variable(stream: &TokenStream, code: &Code, from: usize) -> Option<String> {
    let mut cursor = from;
    let assign = loop {
        let prev = stream.prev_significant(cursor)?;
        let kind = stream.kind(prev);
        if kind == TokenKind::Assign {
            break prev;
        }
        if kind.is_stmt_boundary() {
            return None;
        }
        cursor = prev;
    };

    let mut cursor = assign;
    while let Some(prev) = stream.prev_significant(cursor) {
        let kind = stream.kind(prev);
        if kind == TokenKind::Identifier {
            return Some(String::from_utf8_lossy(code.text_of(&stream[prev])).into_owned());
        }
        if kind.is_stmt_boundary() {
            break;
        }
        cursor = prev;
    }
    None
}

/// Whether the call sits inside the condition of an enclosing `if` or `while`:
/// walk backwards across balanced parentheses until an opening parenthesis whose
/// preceding significant token is the keyword.
fn in_condition(stream: &TokenStream, from: usize) -> bool {
    let mut depth: usize = 0;
    let mut cursor = from;
    while let Some(prev) = stream.prev_significant(cursor) {
        match stream.kind(prev) {
            TokenKind::RParen => depth += 1,
            TokenKind::LParen => {
                if depth > 0 {
                    depth -= 1;
                } else {
                    match stream.prev_significant(prev).map(|before| stream.kind(before)) {
                        Some(TokenKind::If) | Some(TokenKind::While) => return true,
                        _ => {}
                    }
                }
            }
            kind if kind.is_stmt_boundary() => return false,
            _ => {}
        }
        cursor = prev;
    }
    false
}

/// After the terminating semicolon, scan forward for the assigned variable: an
/// occurrence inside an `if`/`while` condition means the site is checked; a
/// dereference (`*v`, `v->`, `v[`) first means it was used before any check.
fn checked_later(
    stream: &TokenStream,
    code: &Code,
    site: usize,
    var: &str,
) -> (bool, bool) {
    let semi = match stream.stmt_end(site) {
        Some(semi) => semi,
        None => return (false, false),
    };

    let mut zones: Vec<usize> = Vec::new();
    let mut brace_depth: isize = 0;
    let mut cursor = semi;
    while let Some(index) = stream.next_significant(cursor) {
        cursor = index;
        while zones.last().map_or(false, |close| *close < index) {
            zones.pop();
        }
        match stream.kind(index) {
            TokenKind::LBrace => brace_depth += 1,
            TokenKind::RBrace => {
                brace_depth -= 1;
                if brace_depth < 0 {
                    break;
                }
            }
            TokenKind::If | TokenKind::While => {
                if let Some(open) = stream.next_significant(index) {
                    if stream.kind(open) == TokenKind::LParen {
                        if let Some(close) = stream.matching_paren(open) {
                            zones.push(close);
                        }
                    }
                }
            }
            TokenKind::Identifier if code.text_of(&stream[index]) == var.as_bytes() => {
                if !zones.is_empty() {
                    return (true, false);
                }
                let next_kind = stream.next_significant(index).map(|next| stream.kind(next));
                if next_kind == Some(TokenKind::Arrow) || next_kind == Some(TokenKind::LBracket) {
                    return (false, true);
                }
                if let Some(prev) = stream.prev_significant(index) {
                    if stream.kind(prev) == TokenKind::Star && is_unary_star(stream, prev) {
                        return (false, true);
                    }
                }
            }
            _ => {}
        }
    }
    (false, false)
}

/// A `*` is a dereference, not a multiplication, when no value expression can end
/// immediately before it.
fn is_unary_star(stream: &TokenStream, star: usize) -> bool {
    match stream.prev_significant(star).map(|prev| stream.kind(prev)) {
        Some(TokenKind::Identifier)
        | Some(TokenKind::Number)
        | Some(TokenKind::RParen)
        | Some(TokenKind::RBracket)
        | Some(TokenKind::CharLiteral)
        | Some(TokenKind::StringLiteral) => false,
        _ => true,
    }
}
