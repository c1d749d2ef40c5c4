use crate::{CstKind, CstNode};
use ptree::TreeItem;
use std::fmt::{Display, Formatter};

impl Display for CstNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("")
            .field("kind", &self.kind)
            .field("bytes", &(&self.start, &self.end))
            .field("tokens", &(&self.token_start, &self.token_end))
            .finish()
    }
}

impl CstNode {
    pub fn new(
        kind: CstKind,
        start: usize,
        end: usize,
        token_start: usize,
        token_end: usize,
        children: Vec<CstNode>,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            token_start,
            token_end,
            children,
        }
    }

    /// Create a node without members.
    pub fn leaf(
        kind: CstKind,
        start: usize,
        end: usize,
        token_start: usize,
        token_end: usize,
    ) -> Self {
        CstNode::new(kind, start, end, token_start, token_end, Vec::with_capacity(0))
    }

    pub fn token_len(&self) -> usize {
        self.token_end - self.token_start
    }

    /// Find the first node of a given kind, searching self and nested children.
    pub fn find_node(&self, kind: CstKind) -> Option<&CstNode> {
        if self.kind == kind {
            Some(self)
        } else {
            self.children.iter().find_map(|child| child.find_node(kind))
        }
    }

    pub fn contains(&self, kind: CstKind) -> bool {
        self.find_node(kind).is_some()
    }

    /// Return all nodes of a given kind, searching self and nested children.
    pub fn list_nodes<'this>(&'this self, kind: CstKind) -> Vec<&'this CstNode> {
        let mut found: Vec<&'this CstNode> = Vec::new();
        self.walk(&mut |node| {
            if node.kind == kind {
                found.push(node);
            }
        });
        found
    }

    fn walk<'this, TF: FnMut(&'this CstNode)>(&'this self, f: &mut TF) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

impl TreeItem for CstNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{:?} # {}-{}", self.kind, self.start, self.end)
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(&self.children)
    }
}

impl CstNode {
    /// Print the node and its members as a tree for debugging.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}
