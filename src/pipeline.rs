use crate::analysis::{find_alloc_sites, AllocatorTable, CallGraph};
use crate::rewrite::{self, DiscardPolicy};
use crate::util::{Code, Log};
use crate::{apply_patches, c_tokenizer, cst, Patch, RefactorError, Refactorer, TokenStream};
use once_cell::unsync::OnceCell;

/// Refactor one C translation unit with every knob at its default.
///
/// Equivalent to `Refactorer::new().refactor(source)`. When no function ends up
/// marked, the output is byte-identical to the input.
pub fn refactor_source(source: &[u8]) -> Result<Vec<u8>, RefactorError> {
    Refactorer::new().refactor(source)
}

impl Refactorer {
    pub fn new() -> Self {
        Self {
            tokenizer: c_tokenizer(),
            allocators: AllocatorTable::default_set(),
            discard: DiscardPolicy::NoOutArg,
            debug: OnceCell::new(),
        }
    }

    /// A driver recognizing a custom allocator table.
    pub fn with_allocators(allocators: AllocatorTable) -> Self {
        Self {
            tokenizer: c_tokenizer(),
            allocators,
            discard: DiscardPolicy::NoOutArg,
            debug: OnceCell::new(),
        }
    }

    /// Choose what happens to calls of rewritten pointer-returning functions
    /// whose result is discarded.
    pub fn discard_policy(mut self, discard: DiscardPolicy) -> Self {
        self.discard = discard;
        self
    }

    /// Set a log label to debug the pipeline phases.
    pub fn set_log(&self, log_label: Log<&'static str>) -> Result<(), String> {
        self.debug
            .set(log_label)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Run the pipeline: tokenize, group, analyze, propagate, rewrite, patch.
    pub fn refactor(&self, source: &[u8]) -> Result<Vec<u8>, RefactorError> {
        if source.is_empty() {
            return Ok(Vec::new());
        }

        let code = Code::new(source);
        let tokens = self.tokenizer.tokenize(&code)?;
        let stream = TokenStream::new(&tokens);
        let nodes = cst::group(&tokens, &code);
        let sites = find_alloc_sites(&stream, &code, &self.allocators);
        let mut graph = CallGraph::build(&nodes, &stream, &code, &sites);
        graph.propagate();

        #[cfg(debug_assertions)]
        if let Some(debug) = self.debug.get() {
            if debug.order() >= Log::Default(()).order() {
                let marked = graph.nodes().iter().filter(|node| node.marked).count();
                println!(
                    "[{}; Analysis]: {} tokens, {} nodes, {} sites, {} functions, {} marked",
                    debug,
                    tokens.len(),
                    nodes.len(),
                    sites.len(),
                    graph.len(),
                    marked
                );
            }
        }

        let mut patches: Vec<Patch> = Vec::new();
        for index in 0..graph.len() {
            if !graph.node(index).marked {
                continue;
            }
            let transform = rewrite::transform_of(&stream, &code, graph.node(index));
            rewrite::rewrite_signature(&stream, &code, graph.node(index), &transform, &mut patches);
            rewrite::rewrite_body(
                &stream,
                &code,
                &graph,
                index,
                &sites,
                &self.allocators,
                self.discard,
                &mut patches,
            );
        }

        if patches.is_empty() {
            return Ok(source.to_vec());
        }
        apply_patches(&code, &tokens, patches)
    }

    /// The pipeline with text output for collaborators that want a string.
    pub fn refactor_to_string(&self, source: &[u8]) -> Result<String, RefactorError> {
        self.refactor(source)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for Refactorer {
    fn default() -> Self {
        Refactorer::new()
    }
}
