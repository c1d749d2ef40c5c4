use super::{storage_prefix, Transform};
use crate::analysis::FuncNode;
use crate::util::Code;
use crate::{Patch, TokenKind, TokenStream};

/// Emit the signature patches for one marked function.
///
/// The return-type tokens are replaced as a whole; the parameter list is touched
/// only at its tail (or at a lone `void`), so interior whitespace and comments are
/// preserved verbatim.
pub fn rewrite_signature(
    stream: &TokenStream,
    code: &Code,
    func: &FuncNode,
    transform: &Transform,
    patches: &mut Vec<Patch>,
) {
    let pointee = match transform {
        Transform::None => return,
        Transform::VoidToInt => {
            patches.push(Patch::replacement(
                func.type_start,
                func.name_token,
                format!("{}int ", storage_prefix(stream, code, func)),
            ));
            return;
        }
        Transform::RetPtrToArg { pointee } => pointee,
    };

    patches.push(Patch::replacement(
        func.type_start,
        func.name_token,
        format!("{}int ", storage_prefix(stream, code, func)),
    ));

    let open = match stream.next_significant(func.name_token) {
        Some(open) if stream.kind(open) == TokenKind::LParen => open,
        _ => return,
    };
    let close = match stream.matching_paren(open) {
        Some(close) => close,
        None => return,
    };

    let first_param = stream.next_significant(open).filter(|index| *index < close);
    match first_param {
        None => {
            // `f()` — the out-parameter becomes the only parameter
            patches.push(Patch::insertion(close, format!("{} **out", pointee)));
        }
        Some(param)
            if stream.kind(param) == TokenKind::Void
                && stream.next_significant(param) == Some(close) =>
        {
            // `f(void)` — drop the void so the new parameter is not second
            patches.push(Patch::replacement(
                param,
                param + 1,
                format!("{} **out", pointee),
            ));
        }
        Some(_) => {
            patches.push(Patch::insertion(close, format!(", {} **out", pointee)));
        }
    }
}
