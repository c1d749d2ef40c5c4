use super::{AllocSite, CallGraph, FuncNode};
use crate::util::Code;
use crate::{CstKind, CstNode, TokenKind, TokenStream};
use std::collections::{HashMap, VecDeque};

impl CallGraph {
    /// Build one node per grouped function definition and record caller edges.
    pub fn build(
        cst: &[CstNode],
        stream: &TokenStream,
        code: &Code,
        sites: &[AllocSite],
    ) -> Self {
        let mut nodes: Vec<FuncNode> = Vec::new();
        for (cst_index, cst_node) in cst.iter().enumerate() {
            if cst_node.kind != CstKind::Function {
                continue;
            }
            if let Some(node) = build_node(cst_index, cst_node, stream, code, sites) {
                nodes.push(node);
            }
        }
        let mut graph = CallGraph { nodes };
        graph.collect_edges(stream, code);
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn node(&self, index: usize) -> &FuncNode {
        &self.nodes[index]
    }
    pub fn nodes(&self) -> &[FuncNode] {
        &self.nodes
    }

    /// The index of the function with the given name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == name)
    }

    /// Scan every body for identifiers naming another known function followed by a
    /// parenthesis; each hit adds the scanning function to the target's caller
    /// set. Self-edges are skipped and edges are de-duplicated.
    fn collect_edges(&mut self, stream: &TokenStream, code: &Code) {
        let names: HashMap<Vec<u8>, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.name.clone().into_bytes(), index))
            .collect();

        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (caller_index, caller) in self.nodes.iter().enumerate() {
            let mut cursor = caller.body_start;
            while let Some(index) = stream.next_significant(cursor) {
                if index >= caller.token_end {
                    break;
                }
                cursor = index;
                if stream.kind(index) != TokenKind::Identifier {
                    continue;
                }
                let callee_index = match names.get(code.text_of(&stream[index])) {
                    Some(found) => *found,
                    None => continue,
                };
                if callee_index == caller_index {
                    continue;
                }
                match stream.next_significant(index).map(|next| stream.kind(next)) {
                    Some(TokenKind::LParen) => {}
                    _ => continue,
                }
                match stream.prev_significant(index).map(|prev| stream.kind(prev)) {
                    Some(TokenKind::Arrow) | Some(TokenKind::Dot) => continue,
                    _ => {}
                }
                edges.push((callee_index, caller_index));
            }
        }

        for (callee, caller) in edges {
            let callers = &mut self.nodes[callee].callers;
            if !callers.contains(&caller) {
                callers.push(caller);
            }
        }
    }

    /// Mark the closure of the seed set under the reverse call edges.
    ///
    /// Seeds are the functions that allocate and return a pointer or `void`,
    /// `main` included. `main` is marked when seeded or reached, so its body is
    /// rewritten, but propagation stops there and its signature is never
    /// changed.
    pub fn propagate(&mut self) {
        let mut queue: VecDeque<usize> = VecDeque::new();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.contains_allocs && (node.returns_void || node.returns_ptr) {
                node.marked = true;
                if !node.is_main {
                    queue.push_back(index);
                }
            }
        }

        while let Some(current) = queue.pop_front() {
            let callers = self.nodes[current].callers.clone();
            for caller in callers {
                if self.nodes[caller].marked {
                    continue;
                }
                self.nodes[caller].marked = true;
                if !self.nodes[caller].is_main {
                    queue.push_back(caller);
                }
            }
        }
    }
}

fn build_node(
    cst_index: usize,
    cst_node: &CstNode,
    stream: &TokenStream,
    code: &Code,
    sites: &[AllocSite],
) -> Option<FuncNode> {
    let type_start = stream.sig_at_or_after(cst_node.token_start)?;

    // The parameter list is the first parenthesis of the definition.
    let mut open = None;
    let mut cursor = Some(type_start);
    while let Some(index) = cursor {
        if index >= cst_node.token_end {
            break;
        }
        if stream.kind(index) == TokenKind::LParen {
            open = Some(index);
            break;
        }
        cursor = stream.next_significant(index);
    }
    let open = open?;

    // The function name is the last identifier before the parameter list.
    let mut name_token = None;
    let mut back = open;
    while let Some(prev) = stream.prev_significant(back) {
        if prev < cst_node.token_start {
            break;
        }
        if stream.kind(prev) == TokenKind::Identifier {
            name_token = Some(prev);
            break;
        }
        back = prev;
    }
    let name_token = name_token?;

    let close = stream.matching_paren(open)?;
    let body_start = stream.next_significant(close)?;
    if stream.kind(body_start) != TokenKind::LBrace {
        return None;
    }
    // one past the closing brace; the grouped node may extend further when
    // trailing whitespace was attached to it
    let token_end = stream.matching_brace(body_start)? + 1;

    let mut returns_ptr = false;
    let mut returns_void = false;
    for index in type_start..name_token {
        match stream.kind(index) {
            TokenKind::Star => returns_ptr = true,
            TokenKind::Void => returns_void = true,
            _ => {}
        }
    }
    if returns_ptr {
        // pointer takes precedence over void (`void *f`)
        returns_void = false;
    }

    let return_type =
        String::from_utf8_lossy(code.slice(stream[type_start].start, stream[name_token].start))
            .into_owned();
    let name = String::from_utf8_lossy(code.text_of(&stream[name_token])).into_owned();
    let is_main = name == "main";
    let contains_allocs = sites
        .iter()
        .any(|site| site.token_index > body_start && site.token_index < token_end);

    Some(FuncNode {
        cst_index,
        name,
        token_start: cst_node.token_start,
        type_start,
        name_token,
        body_start,
        token_end,
        returns_void,
        returns_ptr,
        return_type,
        is_main,
        contains_allocs,
        marked: false,
        callers: Vec::new(),
    })
}
