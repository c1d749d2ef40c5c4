use crate::cst::group;
use crate::util::Code;
use crate::{c_tokenizer, CstKind, CstNode};

fn group_source(source: &str) -> (Vec<CstNode>, usize) {
    let tokenizer = c_tokenizer();
    let code = Code::from(source);
    let tokens = tokenizer.tokenize(&code).unwrap();
    let total = tokens.len();
    (group(&tokens, &code), total)
}

fn assert_tiled(nodes: &[CstNode], total: usize) {
    let mut cursor = 0;
    for node in nodes {
        assert_eq!(node.token_start, cursor, "nodes must tile the token stream");
        assert!(node.token_end > node.token_start);
        cursor = node.token_end;
    }
    assert_eq!(cursor, total);
}

#[test]
fn function_definition_is_grouped() {
    let (nodes, total) = group_source("int main(void) { return 0; }");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, CstKind::Function);
}

#[test]
fn struct_definition_with_members() {
    let (nodes, total) = group_source("struct point { int x; int y; };");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, CstKind::Struct);
    assert_eq!(nodes[0].children.len(), 2);
    for member in &nodes[0].children {
        assert_eq!(member.kind, CstKind::Other);
    }
}

#[test]
fn enum_members_split_on_commas() {
    let (nodes, total) = group_source("enum color { RED, GREEN, BLUE };");
    assert_tiled(&nodes, total);
    assert_eq!(nodes[0].kind, CstKind::Enum);
    assert_eq!(nodes[0].children.len(), 3);
}

#[test]
fn forward_declaration_keeps_its_kind() {
    let (nodes, total) = group_source("struct point;");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, CstKind::Struct);
    assert!(nodes[0].children.is_empty());
}

#[test]
fn prototype_is_not_a_function() {
    let (nodes, total) = group_source("int f(void);");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, CstKind::Other);
}

#[test]
fn initializer_braces_stay_inside_one_node() {
    let (nodes, total) = group_source("int a[] = {1, 2};");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, CstKind::Other);
}

#[test]
fn attribute_then_function() {
    let (nodes, total) = group_source("[[nodiscard]] int f(void) { return 0; }");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].kind, CstKind::Attribute);
    assert_eq!(nodes[1].kind, CstKind::Function);
}

#[test]
fn static_assert_node() {
    let (nodes, total) = group_source("_Static_assert(1, \"one\");");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, CstKind::StaticAssert);
}

#[test]
fn macros_and_comments_are_their_own_nodes() {
    let (nodes, total) = group_source("// header\n#include <x.h>\nint g;\n");
    assert_tiled(&nodes, total);
    let kinds: Vec<CstKind> = nodes.iter().map(|node| node.kind).collect();
    assert_eq!(kinds, vec![CstKind::Comment, CstKind::Macro, CstKind::Other]);
}

#[test]
fn struct_returning_function_is_a_function() {
    let (nodes, total) = group_source("struct point make_point(int x) { struct point p; return p; }");
    assert_tiled(&nodes, total);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind, CstKind::Function);
}

#[test]
fn mixed_file_tiles_exactly() {
    let source = r#"
#include <stdlib.h>

/* the shape */
struct shape { int sides; };

static int count;

int area(int side) {
    return side * side;
}
"#;
    let (nodes, total) = group_source(source);
    assert_tiled(&nodes, total);
    let kinds: Vec<CstKind> = nodes.iter().map(|node| node.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CstKind::Macro,
            CstKind::Comment,
            CstKind::Struct,
            CstKind::Other,
            CstKind::Function,
        ]
    );
}
