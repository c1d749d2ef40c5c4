use super::{transform_of, DiscardPolicy, Transform};
use crate::analysis::{AllocSite, AllocatorTable, CallGraph, CheckShape};
use crate::util::Code;
use crate::{Patch, TokenKind, TokenStream};
use std::collections::HashMap;

/// Emit the body patches for one marked function: failure checks at unchecked
/// allocation sites, call rewrites for marked callees, return transformation, and
/// the `rc` declaration when one was introduced.
pub fn rewrite_body(
    stream: &TokenStream,
    code: &Code,
    graph: &CallGraph,
    func_index: usize,
    sites: &[AllocSite],
    table: &AllocatorTable,
    discard: DiscardPolicy,
    patches: &mut Vec<Patch>,
) {
    let func = graph.node(func_index);
    let transform = transform_of(stream, code, func);
    let body_start = func.body_start;
    let token_end = func.token_end;

    let body_sites: Vec<&AllocSite> = sites
        .iter()
        .filter(|site| site.token_index > body_start && site.token_index < token_end)
        .collect();

    // Every return statement in the body, with its terminating semicolon and
    // whether an allocation site sits inside its expression.
    let mut returns: Vec<(usize, usize, bool)> = Vec::new();
    let mut cursor = body_start;
    while let Some(index) = stream.next_significant(cursor) {
        if index >= token_end {
            break;
        }
        cursor = index;
        if stream.kind(index) != TokenKind::Return {
            continue;
        }
        if let Some(semi) = stream.stmt_end(index) {
            let has_alloc = body_sites
                .iter()
                .any(|site| site.token_index > index && site.token_index < semi);
            returns.push((index, semi, has_alloc));
        }
    }
    let alloc_returns: Vec<(usize, usize)> = returns
        .iter()
        .filter(|(_, _, has_alloc)| *has_alloc)
        .map(|(ret, semi, _)| (*ret, *semi))
        .collect();

    let mut rewriter = BodyRewriter {
        stream,
        code,
        graph,
        func_index,
        table,
        discard,
        transform,
        local: Vec::new(),
        uses_rc: false,
        hoist_count: 0,
        replaced: Vec::new(),
        alloc_returns,
    };

    rewriter.check_allocations(&body_sites);
    rewriter.rewrite_calls(body_start, token_end);
    rewriter.rewrite_returns(&returns);

    if rewriter.uses_rc {
        rewriter
            .local
            .push(Patch::insertion(body_start + 1, "\n  int rc = 0;".to_string()));
    }
    patches.append(&mut rewriter.local);
}

struct BodyRewriter<'a, 't, 'c> {
    stream: &'a TokenStream<'t>,
    code: &'a Code<'c>,
    graph: &'a CallGraph,
    func_index: usize,
    table: &'a AllocatorTable,
    discard: DiscardPolicy,
    transform: Transform,
    local: Vec<Patch>,
    uses_rc: bool,
    hoist_count: usize,
    /// Token ranges already consumed by a call replacement; later calls inside
    /// them are conflicts and are skipped.
    replaced: Vec<(usize, usize)>,
    /// Return statements whose expression holds an allocation; call rewrites
    /// inside them would collide with the whole-statement return patch.
    alloc_returns: Vec<(usize, usize)>,
}

impl<'a, 't, 'c> BodyRewriter<'a, 't, 'c> {
    /// Inject a failure check after every unchecked, assigned, non-return
    /// allocation statement. `p = realloc(p, …)` goes through a temporary so the
    /// original pointer is not lost on failure.
    fn check_allocations(&mut self, body_sites: &[&AllocSite]) {
        for site in body_sites {
            if site.is_checked || site.is_return_stmt {
                continue;
            }
            let var = match &site.var_name {
                Some(var) => var.clone(),
                None => continue,
            };
            let spec_name = self.table.get(site.spec_index).name.clone();
            let shape = self.table.get(site.spec_index).shape;
            let semi = match self.stream.stmt_end(site.token_index) {
                Some(semi) => semi,
                None => continue,
            };

            if spec_name == "realloc" {
                if let Some(patch) = self.realloc_statement(site, &var, semi) {
                    self.local.push(patch);
                    continue;
                }
            }

            let text = match shape {
                CheckShape::PtrNull => format!("\n  if (!{}) {{ return ENOMEM; }}", var),
                CheckShape::IntNegative => format!("\n  if ({} < 0) {{ return ENOMEM; }}", var),
                CheckShape::IntNonzero => format!("\n  if ({} != 0) {{ return ENOMEM; }}", var),
            };
            self.local.push(Patch::insertion(semi + 1, text));
        }
    }

    /// `v = realloc(v, …);` → `{ void *_safe_tmp = realloc(v, …); if (!_safe_tmp)
    /// return ENOMEM; v = _safe_tmp; }`, replacing the whole statement. Applies
    /// only to the plain same-variable assignment form.
    fn realloc_statement(&self, site: &AllocSite, var: &str, semi: usize) -> Option<Patch> {
        let open = self.stream.next_significant(site.token_index)?;
        if self.stream.kind(open) != TokenKind::LParen {
            return None;
        }
        let close = self.stream.matching_paren(open)?;
        let first_arg = self.stream.next_significant(open)?;
        if self.stream.kind(first_arg) != TokenKind::Identifier
            || self.code.text_of(&self.stream[first_arg]) != var.as_bytes()
        {
            return None;
        }
        let start = self.stream.stmt_start(site.token_index);
        if self.stream.kind(start) != TokenKind::Identifier
            || self.code.text_of(&self.stream[start]) != var.as_bytes()
        {
            return None;
        }
        let args = String::from_utf8_lossy(
            self.code
                .slice(self.stream[open].end, self.stream[close].start),
        )
        .into_owned();
        Some(Patch::replacement(
            start,
            semi + 1,
            format!(
                "{{ void *_safe_tmp = realloc({}); if (!_safe_tmp) return ENOMEM; {} = _safe_tmp; }}",
                args, var
            ),
        ))
    }

    /// Rewrite calls to marked callees by position: assignment, declaration,
    /// statement, and nested-expression (hoisted) forms.
    fn rewrite_calls(&mut self, body_start: usize, token_end: usize) {
        let names: HashMap<Vec<u8>, usize> = self
            .graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| (node.name.clone().into_bytes(), index))
            .collect();

        let mut cursor = body_start;
        while let Some(index) = self.stream.next_significant(cursor) {
            if index >= token_end {
                break;
            }
            cursor = index;
            if self.stream.kind(index) != TokenKind::Identifier {
                continue;
            }
            let callee_index = match names.get(self.code.text_of(&self.stream[index])) {
                Some(found) => *found,
                None => continue,
            };
            if callee_index == self.func_index {
                continue;
            }
            let callee_transform = {
                let callee = self.graph.node(callee_index);
                if !callee.marked || callee.is_main {
                    continue;
                }
                transform_of(self.stream, self.code, callee)
            };
            if callee_transform == Transform::None {
                continue;
            }

            let open = match self.stream.next_significant(index) {
                Some(open) if self.stream.kind(open) == TokenKind::LParen => open,
                _ => continue,
            };
            if self.replaced.iter().any(|(s, e)| index >= *s && index < *e) {
                continue;
            }
            if self
                .alloc_returns
                .iter()
                .any(|(s, e)| index > *s && index < *e)
            {
                continue;
            }
            let close = match self.stream.matching_paren(open) {
                Some(close) => close,
                None => continue,
            };

            match self
                .stream
                .prev_significant(index)
                .map(|prev| self.stream.kind(prev))
            {
                Some(TokenKind::Arrow) | Some(TokenKind::Dot) => {}
                Some(TokenKind::Assign) => {
                    self.assignment_form(index, open, close, &callee_transform)
                }
                Some(kind) if kind.is_stmt_boundary() => {
                    self.statement_form(index, close, &callee_transform)
                }
                Some(TokenKind::Return) => {
                    // the return itself is rewritten separately; hoist the call
                    // in front of it when this function stores through `out`
                    if matches!(self.transform, Transform::RetPtrToArg { .. }) {
                        self.nested_form(index, open, close, &callee_transform);
                    }
                }
                Some(_) => self.nested_form(index, open, close, &callee_transform),
                None => {}
            }
        }
    }

    fn assignment_form(
        &mut self,
        index: usize,
        open: usize,
        close: usize,
        callee_transform: &Transform,
    ) {
        if !matches!(callee_transform, Transform::RetPtrToArg { .. }) {
            // assigning from a void callee cannot occur in valid input
            return;
        }
        let assign = match self.stream.prev_significant(index) {
            Some(assign) => assign,
            None => return,
        };
        let lhs = match self.stream.prev_significant(assign) {
            Some(lhs) => lhs,
            None => return,
        };
        if self.stream.kind(lhs) != TokenKind::Identifier {
            self.nested_form(index, open, close, callee_transform);
            return;
        }
        match self
            .stream
            .prev_significant(lhs)
            .map(|prev| self.stream.kind(prev))
        {
            Some(TokenKind::Arrow) | Some(TokenKind::Dot) | Some(TokenKind::RBracket) => {
                // a member or element target needs the hoisted form
                self.nested_form(index, open, close, callee_transform);
                return;
            }
            _ => {}
        }
        let semi = match self.stream.stmt_end(close) {
            Some(semi) => semi,
            None => return,
        };
        let var = String::from_utf8_lossy(self.code.text_of(&self.stream[lhs])).into_owned();

        let stmt_first = self.stream.stmt_start(index);
        if stmt_first == lhs {
            // plain assignment: `var = callee(args);`
            self.local
                .push(Patch::replacement(lhs, assign + 1, "rc =".to_string()));
        } else if self.stream.kind(stmt_first).is_type_start() {
            // declaration: keep `type var`, close it with a semicolon
            self.local
                .push(Patch::replacement(assign, assign + 1, "; rc =".to_string()));
        } else {
            // something stranger on the left (`*p = ...`); hoist instead
            self.nested_form(index, open, close, callee_transform);
            return;
        }
        let out_argument = self.out_argument(open, close, &var);
        self.local.push(Patch::insertion(close, out_argument));
        self.local
            .push(Patch::insertion(semi + 1, " if (rc != 0) return rc;".to_string()));
        self.uses_rc = true;
    }

    fn statement_form(&mut self, index: usize, close: usize, callee_transform: &Transform) {
        if matches!(callee_transform, Transform::RetPtrToArg { .. })
            && self.discard == DiscardPolicy::SkipSite
        {
            return;
        }
        let semi = match self.stream.stmt_end(close) {
            Some(semi) => semi,
            None => return,
        };
        // the discarded result needs no out-argument; the call is taken as
        // status-only either way
        self.local.push(Patch::insertion(index, "rc = ".to_string()));
        self.local
            .push(Patch::insertion(semi + 1, " if (rc != 0) return rc;".to_string()));
        self.uses_rc = true;
    }

    /// Hoist a nested call out of its expression: bind the result to a fresh
    /// `_tmp_cdd_<k>` temporary in front of the enclosing statement and replace
    /// the call expression with the temporary.
    fn nested_form(
        &mut self,
        index: usize,
        open: usize,
        close: usize,
        callee_transform: &Transform,
    ) {
        let pointee = match callee_transform {
            Transform::RetPtrToArg { pointee } => pointee.clone(),
            // a nested void call cannot occur in valid input
            _ => return,
        };
        let stmt_first = self.stream.stmt_start(index);
        let callee_name =
            String::from_utf8_lossy(self.code.text_of(&self.stream[index])).into_owned();
        let temp = format!("_tmp_cdd_{}", self.hoist_count);

        let arguments = if self.stream.next_significant(open) == Some(close) {
            format!("&{}", temp)
        } else {
            let args = String::from_utf8_lossy(
                self.code
                    .slice(self.stream[open].end, self.stream[close].start),
            );
            format!("{}, &{}", args, temp)
        };

        self.local.push(Patch::insertion(
            stmt_first,
            format!(
                "{} * {}; rc = {}({}); if (rc != 0) return rc; ",
                pointee, temp, callee_name, arguments
            ),
        ));
        self.local.push(Patch::replacement(index, close + 1, temp));
        self.replaced.push((index, close + 1));
        self.hoist_count += 1;
        self.uses_rc = true;
    }

    /// Transform the return statements per the function's [Transform].
    fn rewrite_returns(&mut self, returns: &[(usize, usize, bool)]) {
        match self.transform.clone() {
            Transform::None => {}
            Transform::VoidToInt => {
                for (ret, semi, _) in returns {
                    if self.stream.next_significant(*ret) == Some(*semi) {
                        self.local.push(Patch::replacement(
                            *ret,
                            *semi + 1,
                            "return 0;".to_string(),
                        ));
                    }
                    // a value return in a void function is left alone
                }
                self.trailing_return();
            }
            Transform::RetPtrToArg { pointee } => {
                for (ret, semi, has_alloc) in returns {
                    let first_expr = self.stream.next_significant(*ret);
                    let is_null_literal = match first_expr {
                        Some(expr) => {
                            self.stream.kind(expr) == TokenKind::Identifier
                                && self.code.text_of(&self.stream[expr]) == b"NULL"
                                && self.stream.next_significant(expr) == Some(*semi)
                        }
                        None => false,
                    };
                    if is_null_literal {
                        // a literal NULL return was the failure path already
                        self.local.push(Patch::replacement(
                            *ret,
                            *semi + 1,
                            "return ENOMEM;".to_string(),
                        ));
                    } else if *has_alloc {
                        let expr = String::from_utf8_lossy(
                            self.code
                                .slice(self.stream[*ret].end, self.stream[*semi].start),
                        )
                        .trim()
                        .to_string();
                        self.local.push(Patch::replacement(
                            *ret,
                            *semi + 1,
                            format!(
                                "{{ {} * _safe_ret = {}; if (!_safe_ret) return ENOMEM; *out = _safe_ret; return 0; }}",
                                pointee, expr
                            ),
                        ));
                    } else {
                        self.local
                            .push(Patch::replacement(*ret, *ret + 1, "*out =".to_string()));
                        self.local
                            .push(Patch::insertion(*semi + 1, " return 0;".to_string()));
                    }
                }
            }
        }
    }

    /// A `void`-turned-`int` body that does not end with a return needs one.
    fn trailing_return(&mut self) {
        let rbrace = self.graph.node(self.func_index).token_end - 1;
        let ends_with_return = match self.stream.prev_significant(rbrace) {
            Some(last) if self.stream.kind(last) == TokenKind::Semicolon => {
                self.stream.kind(self.stream.stmt_start(last)) == TokenKind::Return
            }
            _ => false,
        };
        if !ends_with_return {
            self.local
                .push(Patch::insertion(rbrace, "\n  return 0;".to_string()));
        }
    }

    fn out_argument(&self, open: usize, close: usize, var: &str) -> String {
        if self.stream.next_significant(open) == Some(close) {
            format!("&{}", var)
        } else {
            format!(", &{}", var)
        }
    }
}
