use crate::analysis::{find_alloc_sites, AllocSpec, AllocatorTable, CallGraph, CheckShape};
use crate::cst::group;
use crate::util::Code;
use crate::{c_tokenizer, AllocResult, Token, TokenStream};

fn tokenize(source: &str) -> Vec<Token> {
    c_tokenizer().tokenize(&Code::from(source)).unwrap()
}

fn sites_of(source: &str) -> Vec<crate::AllocSite> {
    let code = Code::from(source);
    let tokens = tokenize(source);
    let stream = TokenStream::new(&tokens);
    find_alloc_sites(&stream, &code, &AllocatorTable::default_set())
}

#[test]
fn unchecked_allocation_with_use_before_check() {
    let sites = sites_of("void f(void) { char *p = malloc(10); *p = 5; }");
    assert_eq!(sites.len(), 1);
    let site = &sites[0];
    assert_eq!(site.var_name.as_deref(), Some("p"));
    assert!(!site.is_checked);
    assert!(site.used_before_check);
    assert!(!site.is_return_stmt);
}

#[test]
fn later_condition_marks_the_site_checked() {
    let sites = sites_of("void f(void) { char *p = malloc(10); if (!p) return; *p = 1; }");
    assert_eq!(sites.len(), 1);
    assert!(sites[0].is_checked);
    assert!(!sites[0].used_before_check);
}

#[test]
fn allocation_inside_a_condition_is_checked() {
    let sites = sites_of("void f(void) { char *p; if (!(p = malloc(4))) return; }");
    assert_eq!(sites.len(), 1);
    assert!(sites[0].is_checked);
    assert_eq!(sites[0].var_name.as_deref(), Some("p"));

    let loops = sites_of("void g(void) { char *q; while ((q = malloc(2)) != 0) { use(q); } }");
    assert_eq!(loops.len(), 1);
    assert!(loops[0].is_checked);
}

#[test]
fn return_statement_site() {
    let sites = sites_of("char *g(void) { return malloc(8); }");
    assert_eq!(sites.len(), 1);
    assert!(sites[0].is_return_stmt);
    assert!(sites[0].var_name.is_none());
}

#[test]
fn out_param_allocator_records_the_status_variable() {
    let sites = sites_of("void h(char **s) { int rc; rc = asprintf(s, \"x\"); }");
    assert_eq!(sites.len(), 1);
    let site = &sites[0];
    assert_eq!(site.var_name.as_deref(), Some("rc"));
    assert!(!site.is_checked);
    let table = AllocatorTable::default_set();
    assert_eq!(table.get(site.spec_index).shape, CheckShape::IntNegative);
    assert_eq!(table.get(site.spec_index).result, AllocResult::OutParam);
}

#[test]
fn member_access_is_not_a_site() {
    let sites = sites_of("void m(struct pool *s) { s->malloc(1); s.malloc(2); }");
    assert!(sites.is_empty());
}

#[test]
fn bare_mention_without_call_is_not_a_site() {
    let sites = sites_of("void m(void) { take(malloc); }");
    assert!(sites.is_empty());
}

#[test]
fn duplicate_allocator_spelling_is_rejected() {
    let table = AllocatorTable::new(vec![
        AllocSpec::new("my_alloc", CheckShape::PtrNull, AllocResult::Returned),
        AllocSpec::new("my_alloc", CheckShape::IntNonzero, AllocResult::Returned),
    ]);
    match table {
        Ok(_) => panic!("duplicate spelling should be rejected"),
        Err(message) => assert!(message.contains("my_alloc")),
    }
}

fn graph_of(source: &str) -> (CallGraph, Vec<Token>) {
    let code = Code::from(source);
    let tokens = tokenize(source);
    let stream = TokenStream::new(&tokens);
    let cst = group(&tokens, &code);
    let sites = find_alloc_sites(&stream, &code, &AllocatorTable::default_set());
    let mut graph = CallGraph::build(&cst, &stream, &code, &sites);
    graph.propagate();
    (graph, tokens)
}

const CHAIN: &str = r#"
char *dup(void) { return strdup("a"); }
void use1(void) { char *s = dup(); }
int silent(void) { return 1; }
int main(void) { use1(); return 0; }
"#;

#[test]
fn call_graph_nodes_and_edges() {
    let (graph, _) = graph_of(CHAIN);
    assert_eq!(graph.len(), 4);

    let dup = graph.find("dup").unwrap();
    let use1 = graph.find("use1").unwrap();
    let main = graph.find("main").unwrap();

    assert!(graph.node(dup).returns_ptr);
    assert!(graph.node(dup).contains_allocs);
    assert_eq!(graph.node(dup).return_type, "char *");
    assert_eq!(graph.node(dup).callers, vec![use1]);
    assert!(graph.node(use1).returns_void);
    assert_eq!(graph.node(use1).callers, vec![main]);
    assert!(graph.node(main).is_main);
}

#[test]
fn propagation_is_the_closure_of_the_seeds() {
    let (graph, _) = graph_of(CHAIN);
    assert!(graph.node(graph.find("dup").unwrap()).marked);
    assert!(graph.node(graph.find("use1").unwrap()).marked);
    assert!(graph.node(graph.find("main").unwrap()).marked);
    assert!(!graph.node(graph.find("silent").unwrap()).marked);
}

#[test]
fn caller_edges_are_deduplicated_and_self_edges_skipped() {
    let source = r#"
char *twice(void) { char *p = malloc(2); return p; }
void caller(void) { char *a = twice(); char *b = twice(); }
int loops(int n) { if (n > 0) return loops(n - 1); return 0; }
"#;
    let (graph, _) = graph_of(source);
    let twice = graph.find("twice").unwrap();
    let caller = graph.find("caller").unwrap();
    assert_eq!(graph.node(twice).callers, vec![caller]);
    let loops = graph.find("loops").unwrap();
    assert!(graph.node(loops).callers.is_empty());
}

#[test]
fn generated_call_chains_mark_exactly_the_reachable_set() {
    // f0 <- f1 <- ... <- f5 call downwards; f0 allocates. g0/g1 are a
    // disconnected pair and must stay unmarked.
    let mut source = String::from("char *f0(void) { char *p = malloc(1); return p; }\n");
    for level in 1..6 {
        source.push_str(&format!(
            "void f{}(void) {{ char *x = f{}(); }}\n",
            level,
            level - 1
        ));
    }
    source.push_str("int g0(int a) { return a + 1; }\n");
    source.push_str("int g1(int a) { return g0(a); }\n");

    let (graph, _) = graph_of(&source);
    for level in 0..6 {
        let index = graph.find(&format!("f{}", level)).unwrap();
        assert!(graph.node(index).marked, "f{} must be marked", level);
    }
    assert!(!graph.node(graph.find("g0").unwrap()).marked);
    assert!(!graph.node(graph.find("g1").unwrap()).marked);
}

#[test]
fn int_returning_allocator_user_is_not_a_seed() {
    let source = "int count(void) { char *p = malloc(1); if (!p) return -1; return 0; }";
    let (graph, _) = graph_of(source);
    assert!(!graph.node(graph.find("count").unwrap()).marked);
}
