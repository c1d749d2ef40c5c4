//! The concrete-syntax grouper.
//!
//! [group] walks the token stream at top level and segments it into [CstNode]s:
//! function definitions, struct/enum/union blocks, attributes, static assertions,
//! macros, comments, and a catch-all [CstKind::Other] for statements and
//! declarations the refactoring pipeline never needs to look inside. The grouper is
//! total: it never fails, and consecutive nodes tile the token stream exactly, with
//! whitespace attached to the node that follows it.

mod node;

#[cfg(test)]
mod __tests__;

use crate::util::Code;
use crate::{CstKind, CstNode, TokenKind, TokenStream};

/// Group a token stream into top-level concrete-syntax nodes.
pub fn group(tokens: &[crate::Token], code: &Code) -> Vec<CstNode> {
    Grouper {
        stream: TokenStream::new(tokens),
        code,
    }
    .run()
}

struct Grouper<'t, 'c> {
    stream: TokenStream<'t>,
    code: &'t Code<'c>,
}

impl<'t, 'c> Grouper<'t, 'c> {
    fn run(&self) -> Vec<CstNode> {
        let total = self.stream.len();
        let mut nodes: Vec<CstNode> = Vec::new();
        let mut cursor = 0;

        while cursor < total {
            let first = match self.next_non_ws(cursor) {
                Some(first) => first,
                None => {
                    // Only whitespace remains; it joins the preceding node.
                    match nodes.last_mut() {
                        Some(last) => {
                            last.token_end = total;
                            last.end = self.stream[total - 1].end;
                        }
                        None => nodes.push(self.node(CstKind::Other, cursor, total, Vec::new())),
                    }
                    break;
                }
            };

            let (kind, token_end, children) = self.dispatch(first);
            debug_assert!(token_end > cursor, "grouper failed to advance");
            nodes.push(self.node(kind, cursor, token_end, children));
            cursor = token_end;
        }
        nodes
    }

    fn dispatch(&self, first: usize) -> (CstKind, usize, Vec<CstNode>) {
        let total = self.stream.len();
        match self.stream.kind(first) {
            TokenKind::Comment => (CstKind::Comment, first + 1, Vec::new()),
            TokenKind::Macro => (CstKind::Macro, first + 1, Vec::new()),
            TokenKind::LBracket
                if self.stream.next_significant(first).map(|next| self.stream.kind(next))
                    == Some(TokenKind::LBracket) =>
            {
                match self.matching_bracket(first) {
                    Some(close) => (CstKind::Attribute, close + 1, Vec::new()),
                    None => (CstKind::Attribute, total, Vec::new()),
                }
            }
            TokenKind::StaticAssert => self.static_assert(first),
            TokenKind::Struct => self.tagged_block(first, CstKind::Struct),
            TokenKind::Union => self.tagged_block(first, CstKind::Union),
            TokenKind::Enum => self.tagged_block(first, CstKind::Enum),
            TokenKind::Identifier if self.code.text_of(&self.stream[first]) == b"_Generic" => {
                self.generic_selection(first)
            }
            kind if kind.is_type_start() => match self.try_function(first) {
                Some(token_end) => (CstKind::Function, token_end, Vec::new()),
                None => (CstKind::Other, self.other_end(first), Vec::new()),
            },
            _ => (CstKind::Other, self.other_end(first), Vec::new()),
        }
    }

    fn static_assert(&self, first: usize) -> (CstKind, usize, Vec<CstNode>) {
        let open = match self.stream.next_significant(first) {
            Some(open) if self.stream.kind(open) == TokenKind::LParen => open,
            _ => return (CstKind::Other, self.other_end(first), Vec::new()),
        };
        let close = match self.stream.matching_paren(open) {
            Some(close) => close,
            None => return (CstKind::StaticAssert, self.stream.len(), Vec::new()),
        };
        let token_end = match self.stream.next_significant(close) {
            Some(next) if self.stream.kind(next) == TokenKind::Semicolon => next + 1,
            _ => close + 1,
        };
        (CstKind::StaticAssert, token_end, Vec::new())
    }

    fn generic_selection(&self, first: usize) -> (CstKind, usize, Vec<CstNode>) {
        let open = match self.stream.next_significant(first) {
            Some(open) if self.stream.kind(open) == TokenKind::LParen => open,
            _ => return (CstKind::Other, self.other_end(first), Vec::new()),
        };
        let close = match self.stream.matching_paren(open) {
            Some(close) => close,
            None => return (CstKind::GenericSelection, self.stream.len(), Vec::new()),
        };
        let token_end = match self.stream.next_significant(close) {
            Some(next) if self.stream.kind(next) == TokenKind::Semicolon => next + 1,
            _ => close + 1,
        };
        (CstKind::GenericSelection, token_end, Vec::new())
    }

    /// A `struct`/`union`/`enum` leader: a definition when a brace block follows
    /// (possibly after a tag), a forward-declaration node when a semicolon arrives
    /// first, and otherwise the start of a function definition or a plain
    /// declaration.
    fn tagged_block(&self, first: usize, kind: CstKind) -> (CstKind, usize, Vec<CstNode>) {
        let mut cursor = first;
        loop {
            cursor = match self.stream.next_significant(cursor) {
                Some(next) => next,
                None => return (CstKind::Other, self.other_end(first), Vec::new()),
            };
            match self.stream.kind(cursor) {
                TokenKind::LBrace => {
                    let close = match self.stream.matching_brace(cursor) {
                        Some(close) => close,
                        None => return (kind, self.stream.len(), Vec::new()),
                    };
                    let token_end = match self.stream.next_significant(close) {
                        Some(next) if self.stream.kind(next) == TokenKind::Semicolon => next + 1,
                        _ => close + 1,
                    };
                    let children = self.members(kind, cursor, close);
                    return (kind, token_end, children);
                }
                TokenKind::Semicolon => return (kind, cursor + 1, Vec::new()),
                TokenKind::LParen => {
                    return match self.try_function(first) {
                        Some(token_end) => (CstKind::Function, token_end, Vec::new()),
                        None => (CstKind::Other, self.other_end(first), Vec::new()),
                    };
                }
                other
                    if other.is_type_keyword()
                        || other.is_qualifier()
                        || other.is_storage()
                        || other.is_tag_keyword()
                        || other == TokenKind::Identifier
                        || other == TokenKind::Star => {}
                _ => return (CstKind::Other, self.other_end(first), Vec::new()),
            }
        }
    }

    /// The members of a brace block, one [CstKind::Other] child per member, split
    /// on semicolons (struct/union) or commas (enum) outside nested groups.
    fn members(&self, kind: CstKind, open: usize, close: usize) -> Vec<CstNode> {
        let separator = if kind == CstKind::Enum {
            TokenKind::Comma
        } else {
            TokenKind::Semicolon
        };

        let mut children: Vec<CstNode> = Vec::new();
        let mut cursor = open + 1;
        while cursor < close {
            if self.next_non_ws_before(cursor, close).is_none() {
                // trailing whitespace joins the last member
                if let Some(last) = children.last_mut() {
                    last.token_end = close;
                    last.end = self.stream[close - 1].end;
                }
                break;
            }

            let mut depth: usize = 0;
            let mut end = close;
            for index in cursor..close {
                match self.stream.kind(index) {
                    TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                    TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                        depth = depth.saturating_sub(1)
                    }
                    other if other == separator && depth == 0 => {
                        end = index + 1;
                        break;
                    }
                    _ => {}
                }
            }
            children.push(self.node(CstKind::Other, cursor, end, Vec::new()));
            cursor = end;
        }
        children
    }

    /// The function-definition heuristic: declaration-shaped tokens up to a
    /// parenthesized parameter list followed by a brace block. Any other token
    /// before the parameter list disqualifies the candidate.
    fn try_function(&self, first: usize) -> Option<usize> {
        let mut cursor = first;
        let open = loop {
            let next = self.stream.next_significant(cursor)?;
            match self.stream.kind(next) {
                TokenKind::LParen => break next,
                other
                    if other.is_type_keyword()
                        || other.is_qualifier()
                        || other.is_storage()
                        || other.is_tag_keyword()
                        || other == TokenKind::Identifier
                        || other == TokenKind::Star =>
                {
                    cursor = next
                }
                _ => return None,
            }
        };
        let close = self.stream.matching_paren(open)?;
        let body = self.stream.next_significant(close)?;
        if self.stream.kind(body) != TokenKind::LBrace {
            return None;
        }
        let end = self.stream.matching_brace(body)?;
        Some(end + 1)
    }

    /// The catch-all scan: a statement or declaration run ending at a top-level
    /// semicolon (inclusive) or an unmatched closing brace (exclusive).
    /// Initializer and compound-literal braces are consumed with their match;
    /// a statement-block brace terminates the run.
    fn other_end(&self, first: usize) -> usize {
        let total = self.stream.len();
        match self.stream.kind(first) {
            TokenKind::LBrace => {
                return self
                    .stream
                    .matching_brace(first)
                    .map(|close| close + 1)
                    .unwrap_or(total)
            }
            TokenKind::RBrace => return first + 1,
            _ => {}
        }

        let mut paren_depth: usize = 0;
        let mut index = first;
        while index < total {
            match self.stream.kind(index) {
                TokenKind::LParen => paren_depth += 1,
                TokenKind::RParen => paren_depth = paren_depth.saturating_sub(1),
                TokenKind::Semicolon if paren_depth == 0 => return index + 1,
                TokenKind::RBrace if paren_depth == 0 => return index,
                TokenKind::LBrace if paren_depth == 0 => {
                    let initializer = match self
                        .stream
                        .prev_significant(index)
                        .map(|prev| self.stream.kind(prev))
                    {
                        Some(TokenKind::Assign)
                        | Some(TokenKind::Comma)
                        | Some(TokenKind::Return)
                        | Some(TokenKind::LBracket)
                        | Some(TokenKind::Colon)
                        | Some(TokenKind::RParen) => true,
                        _ => false,
                    };
                    if !initializer {
                        return index;
                    }
                    match self.stream.matching_brace(index) {
                        Some(close) => index = close,
                        None => return total,
                    }
                }
                _ => {}
            }
            index += 1;
        }
        total
    }

    fn matching_bracket(&self, open: usize) -> Option<usize> {
        let mut depth: usize = 0;
        for index in open..self.stream.len() {
            match self.stream.kind(index) {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
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

    /// The first non-whitespace token at or after `from`. Comments are not skipped;
    /// they become nodes of their own.
    fn next_non_ws(&self, from: usize) -> Option<usize> {
        (from..self.stream.len()).find(|index| self.stream.kind(*index) != TokenKind::Whitespace)
    }

    fn next_non_ws_before(&self, from: usize, limit: usize) -> Option<usize> {
        (from..limit).find(|index| self.stream.kind(*index) != TokenKind::Whitespace)
    }

    fn node(
        &self,
        kind: CstKind,
        token_start: usize,
        token_end: usize,
        children: Vec<CstNode>,
    ) -> CstNode {
        CstNode::new(
            kind,
            self.stream[token_start].start,
            self.stream[token_end - 1].end,
            token_start,
            token_end,
            children,
        )
    }
}
