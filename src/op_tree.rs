use crate::TokenKind;

/// A byte trie over the operator and punctuation spellings.
///
/// Each level keeps its children sorted by byte so descent is a binary search. The
/// lookup remembers the deepest node with an attached kind, which gives the
/// longest-match rule for compound operators (`<<=` beats `<<` beats `<`) without
/// requiring every prefix to be a spelling of its own.
#[derive(Clone, Debug)]
pub(crate) struct OpTree {
    kind: Option<TokenKind>,
    children: Vec<(u8, OpTree)>,
}

impl OpTree {
    pub fn new() -> Self {
        Self {
            kind: None,
            children: Vec::new(),
        }
    }

    pub fn insert(&mut self, spelling: &[u8], kind: TokenKind) -> Result<(), TokenKind> {
        match spelling.split_first() {
            Some((first, rest)) => {
                match self.children.binary_search_by_key(first, |child| child.0) {
                    Ok(index) => self.children[index].1.insert(rest, kind),
                    Err(index) => {
                        let mut node = OpTree::new();
                        node.insert(rest, kind)?;
                        self.children.insert(index, (*first, node));
                        Ok(())
                    }
                }
            }
            None => match self.kind.replace(kind) {
                Some(previous) => Err(previous),
                None => Ok(()),
            },
        }
    }

    /// The longest spelling matching a prefix of `bytes`, with its byte length.
    pub fn find(&self, bytes: &[u8]) -> Option<(TokenKind, usize)> {
        let mut node = self;
        let mut depth = 0;
        let mut best = self.kind.map(|kind| (kind, 0));

        while depth < bytes.len() {
            match node
                .children
                .binary_search_by_key(&bytes[depth], |child| child.0)
            {
                Ok(index) => {
                    node = &node.children[index].1;
                    depth += 1;
                    if let Some(kind) = node.kind {
                        best = Some((kind, depth));
                    }
                }
                Err(_) => break,
            }
        }
        best.filter(|(_, length)| *length > 0)
    }
}
