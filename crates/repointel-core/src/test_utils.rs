//! Test utilities for repointel-core

use crate::graph::DependencyGraph;
use crate::model::{CodeBlock, ContentHash, DependencyNode, BlockId, LineRange, TokenBag};
use std::path::PathBuf;

/// Build a graph from `(id, importance, connects_to)` triples.
pub fn graph_from(shape: &[(&str, u8, &[&str])]) -> DependencyGraph {
    let nodes = shape
        .iter()
        .map(|(id, importance, targets)| {
            targets
                .iter()
                .fold(DependencyNode::new(*id, *importance), |node, t| node.connects_to(*t))
        })
        .collect();
    let (graph, diagnostics) = DependencyGraph::build(nodes);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    graph
}

/// A block whose tokens are the whitespace-separated words of `text`.
pub fn block(file: &str, start: u32, text: &str) -> CodeBlock {
    let source_file = PathBuf::from(file);
    let lines = text.lines().count().max(1) as u32;
    CodeBlock {
        id: BlockId::new(&source_file, start),
        source_file,
        line_range: LineRange::new(start, start + lines - 1),
        fence_language: None,
        raw_text: text.to_string(),
        content_hash: ContentHash::of(text),
        tokens: text.split_whitespace().collect::<TokenBag>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_helper_line_range() {
        let b = block("a.md", 4, "one\ntwo\nthree");
        assert_eq!(b.line_range, LineRange::new(4, 6));
        assert_eq!(b.line_count(), 3);
    }
}
