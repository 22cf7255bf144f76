use crate::error::SyntaxError;
use crate::span::{Position, Span};
use std::fmt;
use std::sync::Arc;
use tracing::trace;
use tree_sitter::{InputEdit, Language, Node, Parser, Point, Tree, TreeCursor};

/// An immutable parse of one Rust source text.
///
/// Cloning is cheap: the text is shared and tree-sitter trees are reference counted internally.
#[derive(Clone)]
pub struct SyntaxTree {
    text: Arc<str>,
    tree: Tree,
}

impl SyntaxTree {
    pub fn parse(text: impl Into<Arc<str>>) -> Result<Self, SyntaxError> {
        let text = text.into();
        let tree = parse_rust(&text, None)?;
        Ok(Self { text, tree })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Pre-order walk over every node (named and anonymous) in source order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self.root())
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Position of the first ERROR or MISSING node, if the parse was not clean.
    pub fn first_error(&self) -> Option<Position> {
        if !self.has_errors() {
            return None;
        }
        self.preorder()
            .find(|n| n.is_error() || n.is_missing())
            .map(|n| self.position(n.start_byte()))
    }

    pub fn node_text(&self, node: Node<'_>) -> &str {
        &self.text[node.start_byte()..node.end_byte()]
    }

    /// Smallest node that covers `span`.
    pub fn covering_node(&self, span: Span) -> Option<Node<'_>> {
        if span.end > self.text.len() {
            return None;
        }
        self.root().descendant_for_byte_range(span.start, span.end)
    }

    pub fn position(&self, byte: usize) -> Position {
        let p = point_at(&self.text, byte);
        Position {
            line: p.row + 1,
            column: p.column + 1,
        }
    }

    /// Replace `span` with `replacement`, returning the new tree.
    ///
    /// The old tree is edited and handed to the parser, so subtrees outside the span are reused
    /// rather than rebuilt.
    pub fn replace_span(&self, span: Span, replacement: &str) -> Result<SyntaxTree, SyntaxError> {
        self.check_span(span)?;

        let mut text =
            String::with_capacity(self.text.len() - span.len() + replacement.len());
        text.push_str(&self.text[..span.start]);
        text.push_str(replacement);
        text.push_str(&self.text[span.end..]);

        let new_end = span.start + replacement.len();
        let edit = InputEdit {
            start_byte: span.start,
            old_end_byte: span.end,
            new_end_byte: new_end,
            start_position: point_at(&self.text, span.start),
            old_end_position: point_at(&self.text, span.end),
            new_end_position: point_at(&text, new_end),
        };

        let mut old = self.tree.clone();
        old.edit(&edit);
        let tree = parse_rust(&text, Some(&old))?;
        trace!(%span, inserted = replacement.len(), "reparsed after span replacement");

        Ok(SyntaxTree {
            text: Arc::from(text),
            tree,
        })
    }

    fn check_span(&self, span: Span) -> Result<(), SyntaxError> {
        if span.start > span.end || span.end > self.text.len() {
            return Err(SyntaxError::SpanOutOfBounds {
                span,
                len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(span.start) || !self.text.is_char_boundary(span.end) {
            return Err(SyntaxError::NotCharBoundary { span });
        }
        Ok(())
    }
}

/// Trees compare by text: two parses of the same text by the same grammar are the same tree.
impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for SyntaxTree {}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("len", &self.text.len())
            .field("has_errors", &self.has_errors())
            .finish()
    }
}

fn parse_rust(text: &str, old: Option<&Tree>) -> Result<Tree, SyntaxError> {
    let language: Language = tree_sitter_rust::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| SyntaxError::Language(format!("{e}")))?;
    parser.parse(text, old).ok_or(SyntaxError::ParseFailed)
}

fn point_at(text: &str, byte: usize) -> Point {
    let before = &text.as_bytes()[..byte.min(text.len())];
    let row = before.iter().filter(|b| **b == b'\n').count();
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    Point::new(row, before.len() - line_start)
}

/// Lazy pre-order iterator driven by a tree cursor.
pub struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Preorder<'t> {
    fn new(root: Node<'t>) -> Self {
        Self {
            cursor: root.walk(),
            done: false,
        }
    }
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if self.cursor.goto_first_child() {
            return Some(node);
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}
