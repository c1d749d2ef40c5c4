use crate::util::Code;
use crate::{Patch, RefactorError, Token};

impl Patch {
    /// A patch inserting text before the token at `at`.
    pub fn insertion(at: usize, text: String) -> Self {
        Self {
            start: at,
            end: at,
            text,
        }
    }

    /// A patch replacing the token range `start..end` with text.
    pub fn replacement(start: usize, end: usize, text: String) -> Self {
        debug_assert!(start < end, "a replacement must cover at least one token");
        Self { start, end, text }
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Merge patches with the original token stream into the output bytes.
///
/// Patches are stably sorted by their start token; the walk emits original token
/// bytes until a patch starts at the cursor, emits the patch text instead, and for
/// replacements skips the covered tokens. An insertion swallowed by a previous
/// replacement is dropped silently; a swallowed replacement is a rewriter bug and
/// reported as [RefactorError::InternalInvariant]. Patches at or past the end of
/// the stream are appended in order.
///
/// The output is a concatenation of source slices and patch texts: its length is
/// the sum of all unreplaced token bytes plus the sum of patch text bytes.
pub fn apply_patches(
    code: &Code,
    tokens: &[Token],
    mut patches: Vec<Patch>,
) -> Result<Vec<u8>, RefactorError> {
    for patch in &patches {
        if patch.start > patch.end || patch.end > tokens.len() {
            return Err(RefactorError::invalid_argument(format!(
                "patch range {}..{} is outside the token stream of length {}",
                patch.start,
                patch.end,
                tokens.len()
            )));
        }
    }
    patches.sort_by_key(|patch| patch.start);

    let mut output: Vec<u8> = Vec::with_capacity(code.len());
    let mut next_patch = 0;
    let mut cursor = 0;

    while cursor < tokens.len() {
        let mut replaced = false;
        while next_patch < patches.len() && patches[next_patch].start <= cursor {
            let patch = &patches[next_patch];
            if patch.start < cursor {
                // swallowed by an earlier replacement
                if !patch.is_insertion() {
                    return Err(RefactorError::internal_invariant(format!(
                        "overlapping replacement at tokens {}..{}",
                        patch.start, patch.end
                    )));
                }
                next_patch += 1;
                continue;
            }
            output.extend_from_slice(patch.text.as_bytes());
            let end = patch.end;
            next_patch += 1;
            if end > cursor {
                cursor = end;
                replaced = true;
                break;
            }
        }
        if replaced {
            continue;
        }
        output.extend_from_slice(code.text_of(&tokens[cursor]));
        cursor += 1;
    }

    // trailing patches at or past the end of the stream
    while next_patch < patches.len() {
        let patch = &patches[next_patch];
        if patch.start >= tokens.len() {
            output.extend_from_slice(patch.text.as_bytes());
        } else if !patch.is_insertion() {
            return Err(RefactorError::internal_invariant(format!(
                "overlapping replacement at tokens {}..{}",
                patch.start, patch.end
            )));
        }
        next_patch += 1;
    }

    Ok(output)
}
