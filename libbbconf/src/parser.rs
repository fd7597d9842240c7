//! Phase 3: Tree Builder
//!
//! Walks the scan lines in document order and builds the configuration tree.
//! A key with an inline value is a leaf written under the currently open
//! branches; a key with an empty value opens a branch whose children are the
//! following, deeper lines.

use crate::classify::classify;
use crate::error::{ParseContext, ParseError, Result};
use crate::lexer::IndentTracker;
use crate::scanner::{self, ScanLine};
use crate::value::{Mapping, Value};
use tracing::{debug, trace, warn};

/// Parse a whole document into its tree.
pub fn parse_document(source: &str, ctx: &ParseContext) -> Result<Mapping> {
    let lines = scanner::scan(source);
    debug!(lines = lines.len(), filename = ?ctx.filename, "parsing document");

    let mut parser = Parser::new(ctx);
    for line in &lines {
        parser.line(line)?;
    }
    parser.finish()
}

// ============================================================================
// Tree Builder
// ============================================================================

/// Output tree plus the chain of currently open branches.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    root: Mapping,
    /// Open branch keys with the depth each was opened at.
    path: Vec<(String, usize)>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of the currently open branches, outermost first.
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.path.iter().map(|(key, _)| key.as_str())
    }

    /// Close every open branch that a line at `depth` is not nested in.
    ///
    /// Pops by the depth each branch was opened at rather than by the
    /// difference between the previous and current depth, so a dedent out of
    /// a child that skipped levels lands back in the right branch.
    pub fn close_to(&mut self, depth: usize) {
        while let Some((key, _)) = self.path.last().filter(|(_, d)| *d >= depth) {
            trace!(key = key.as_str(), depth, "closing branch");
            self.path.pop();
        }
    }

    /// Open a branch: following deeper lines are written beneath `key`.
    pub fn open(&mut self, key: &str, depth: usize) {
        trace!(key, depth, "opening branch");
        self.path.push((key.to_string(), depth));
    }

    /// Write a leaf at the open path plus `key`.
    ///
    /// Missing intermediate mappings are created. When an intermediate key
    /// already holds a leaf the write is dropped and `false` is returned.
    pub fn insert(&mut self, key: &str, value: Value) -> bool {
        let mut node = &mut self.root;
        for (segment, _) in &self.path {
            node = match node
                .entry(segment.clone())
                .or_insert_with(|| Value::Mapping(Mapping::new()))
            {
                Value::Mapping(children) => children,
                leaf => {
                    warn!(
                        key,
                        segment = segment.as_str(),
                        existing = ?leaf,
                        "dropping value: path crosses a leaf"
                    );
                    return false;
                }
            };
        }
        node.insert(key.to_string(), value);
        true
    }

    /// Hand over the finished tree.
    pub fn finish(self) -> Mapping {
        self.root
    }
}

// ============================================================================
// Document Parser
// ============================================================================

/// A branch key still waiting for its first child.
#[derive(Debug)]
struct PendingBranch {
    key: String,
    line_num: usize,
    col: usize,
}

impl PendingBranch {
    fn dangling(&self, ctx: &ParseContext) -> ParseError {
        ParseError::DanglingKey {
            key: self.key.clone(),
            loc: String::new(),
        }
        .with_location(ctx, self.line_num, self.col)
    }
}

/// Per-document parse state. Never shared between documents.
struct Parser<'a> {
    ctx: &'a ParseContext,
    tracker: IndentTracker,
    builder: TreeBuilder,
    previous_depth: usize,
    pending: Option<PendingBranch>,
}

impl<'a> Parser<'a> {
    fn new(ctx: &'a ParseContext) -> Self {
        Self {
            ctx,
            tracker: IndentTracker::new(),
            builder: TreeBuilder::new(),
            previous_depth: 0,
            pending: None,
        }
    }

    /// Process one non-blank line.
    fn line(&mut self, line: &ScanLine<'_>) -> Result<()> {
        let depth = self
            .tracker
            .depth(line.indent)
            .map_err(|e| e.with_location(self.ctx, line.line_num, 0))?;

        let (key, raw) = scanner::split_line(line.content)
            .map_err(|e| e.with_location(self.ctx, line.line_num, line.indent))?;
        let value = classify(raw);
        trace!(line = line.line_num + 1, depth, key, ?value, "classified");

        if let Some(pending) = &self.pending {
            if depth == self.previous_depth {
                return Err(pending.dangling(self.ctx));
            }
        }

        // A dedent abandons a pending branch along with the rest of the path
        self.builder.close_to(depth);

        if raw.is_empty() {
            self.builder.open(key, depth);
            self.pending = Some(PendingBranch {
                key: key.to_string(),
                line_num: line.line_num,
                col: line.indent,
            });
        } else {
            self.builder.insert(key, value);
            self.pending = None;
        }

        self.previous_depth = depth;
        Ok(())
    }

    /// Finish the document. A trailing branch key without children leaves
    /// nothing in the tree.
    fn finish(self) -> Result<Mapping> {
        if let Some(pending) = &self.pending {
            debug!(key = pending.key.as_str(), "ignoring trailing branch key");
        }
        let tree = self.builder.finish();
        debug!(keys = tree.len(), "parsed document");
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Op;

    fn parse(source: &str) -> Result<Mapping> {
        parse_document(source, &ParseContext::new(None))
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_builder_insert_creates_intermediates() {
        let mut builder = TreeBuilder::new();
        builder.open("a", 0);
        builder.open("b", 1);
        assert!(builder.insert("c", Value::Number(1.0)));
        assert_eq!(builder.path().collect::<Vec<_>>(), ["a", "b"]);

        let tree = builder.finish();
        assert_eq!(tree["a"]["b"]["c"], Value::Number(1.0));
    }

    #[test]
    fn test_builder_close_to() {
        let mut builder = TreeBuilder::new();
        builder.open("a", 0);
        builder.open("b", 1);
        builder.open("c", 3);
        builder.close_to(2);
        assert_eq!(builder.path().collect::<Vec<_>>(), ["a", "b"]);
        builder.close_to(0);
        assert_eq!(builder.path().count(), 0);
    }

    #[test]
    fn test_builder_drops_write_through_leaf() {
        let mut builder = TreeBuilder::new();
        assert!(builder.insert("a", Value::Number(1.0)));
        builder.open("a", 0);
        assert!(!builder.insert("b", Value::Number(2.0)));
        let tree = builder.finish();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["a"], Value::Number(1.0));
    }

    #[test]
    fn test_flat_document() {
        let tree = parse("connection: fib\nrepetition count: 50000").unwrap();
        assert_eq!(tree["connection"], text("fib"));
        assert_eq!(tree["repetition count"], Value::Number(50000.0));
    }

    #[test]
    fn test_nested_document() {
        let source = "\
test:
    type: performance
    validation:
        cpu: <=50%
        response time: <= 5ms
        throughput: 5000 rps
    execution:
        warmup runs count: 250
";
        let tree = parse(source).unwrap();
        let test = &tree["test"];
        assert_eq!(test["type"], text("performance"));
        assert_eq!(
            test["validation"]["cpu"],
            Value::Comparator(Op::Le, Box::new(Value::Percentage(50.0)))
        );
        assert_eq!(
            test["validation"]["response time"],
            Value::Comparator(Op::Le, Box::new(Value::NamedNumber("ms".into(), 5.0)))
        );
        assert_eq!(
            test["validation"]["throughput"],
            Value::NamedNumber("rps".into(), 5000.0)
        );
        assert_eq!(test["execution"]["warmup runs count"], Value::Number(250.0));
    }

    #[test]
    fn test_dedent_closes_branches() {
        let source = "a:\n  b:\n    c: 1\n  d: 2\ne: 3";
        let tree = parse(source).unwrap();
        assert_eq!(tree["a"]["b"]["c"], Value::Number(1.0));
        assert_eq!(tree["a"]["d"], Value::Number(2.0));
        assert_eq!(tree["e"], Value::Number(3.0));
    }

    #[test]
    fn test_skipped_levels_close_correctly() {
        let source = "a:\n  b:\n      c: 1\n  d: 2";
        let tree = parse(source).unwrap();
        assert_eq!(tree["a"]["b"]["c"], Value::Number(1.0));
        assert_eq!(tree["a"]["d"], Value::Number(2.0));
    }

    #[test]
    fn test_reopened_branch_merges() {
        let tree = parse("a:\n  b: 1\na:\n  c: 2").unwrap();
        assert_eq!(tree["a"]["b"], Value::Number(1.0));
        assert_eq!(tree["a"]["c"], Value::Number(2.0));
    }

    #[test]
    fn test_duplicate_leaf_last_wins() {
        let tree = parse("a: 1\na: 2").unwrap();
        assert_eq!(tree["a"], Value::Number(2.0));
    }

    #[test]
    fn test_write_through_leaf_is_dropped() {
        let tree = parse("a: 1\na:\n  b: 2").unwrap();
        assert_eq!(tree["a"], Value::Number(1.0));
    }

    #[test]
    fn test_dangling_sibling() {
        let err = parse("a:\nb: 1").unwrap_err();
        assert!(matches!(err, ParseError::DanglingKey { ref key, .. } if key == "a"));
        assert_eq!(err.to_string(), "Key \"a\" has no value at line 1");
    }

    #[test]
    fn test_dangling_nested_sibling() {
        let err = parse("a:\n  b:\n  c: 1").unwrap_err();
        assert!(matches!(err, ParseError::DanglingKey { ref key, .. } if key == "b"));
        assert_eq!(err.to_string(), "Key \"b\" has no value at line 2");
    }

    #[test]
    fn test_dedent_after_branch_key_drops_it() {
        let tree = parse("a:\n  b:\nc: 1").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["c"], Value::Number(1.0));
    }

    #[test]
    fn test_trailing_branch_key_is_ignored() {
        let tree = parse("a: 1\nb:").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["a"], Value::Number(1.0));

        let tree = parse("a: 1\nb:\n\n").unwrap();
        assert!(tree.get("b").is_none());
    }

    #[test]
    fn test_indent_under_leaf_writes_at_open_path() {
        let tree = parse("a: 1\n  b: 2").unwrap();
        assert_eq!(tree["a"], Value::Number(1.0));
        assert_eq!(tree["b"], Value::Number(2.0));

        let tree = parse("x:\n  a: 1\n    b: 2").unwrap();
        assert_eq!(tree["x"]["a"], Value::Number(1.0));
        assert_eq!(tree["x"]["b"], Value::Number(2.0));
    }

    #[test]
    fn test_empty_key() {
        let tree = parse(": 5").unwrap();
        assert_eq!(tree[""], Value::Number(5.0));
    }

    #[test]
    fn test_line_syntax_location() {
        let ctx = ParseContext::new(Some("env.bbconf"));
        let err = parse_document("a:\n    oops", &ctx).unwrap_err();
        assert_eq!(err.to_string(), "Expected \"key: value\" at 2:5 of <env.bbconf>");
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n  \n\t\n").unwrap().is_empty());
    }
}
