use std::collections::HashSet;

use tracing::warn;

use crate::trace::{ParsedTrace, Span};

use super::bounds::{Bounds, BoundsFn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct SpanNode {
    pub span: Span,
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub children: Vec<NodeId>,
    pub expanded: bool,
    /// Pre-order position, starting at 1 for the root.
    pub sequence: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderRow {
    Span { node: NodeId, bounds: Bounds },
    HiddenSpans { count: usize },
}

/// Span hierarchy stored flat, in pre-order.
#[derive(Clone, Debug)]
pub struct SpanTree {
    nodes: Vec<SpanNode>,
}

impl SpanTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn build(trace: &ParsedTrace) -> Self {
        let mut nodes: Vec<SpanNode> = Vec::with_capacity(trace.num_of_spans + 1);
        let mut descended: HashSet<String> = HashSet::new();
        let mut stack: Vec<(Option<NodeId>, usize, Span)> = vec![(None, 0, trace.root_span())];

        while let Some((parent, depth, span)) = stack.pop() {
            let id = NodeId(nodes.len());
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }

            let children = if span.span_id.is_empty() {
                &[][..]
            } else if descended.insert(span.span_id.clone()) {
                trace.children_of(&span.span_id)
            } else {
                warn!(span_id = %span.span_id, "span id seen twice, not descending again");
                &[][..]
            };
            for child in children.iter().rev() {
                stack.push((Some(id), depth + 1, child.clone()));
            }

            nodes.push(SpanNode {
                span,
                parent,
                depth,
                children: Vec::new(),
                expanded: true,
                sequence: id.0 + 1,
            });
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SpanNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&SpanNode> {
        self.nodes.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SpanNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Flips a node's expanded flag and returns the new value.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.expanded = !node.expanded;
                node.expanded
            }
            None => false,
        }
    }

    pub fn expand_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = true;
        }
    }

    /// Collapses every subtree below the root.
    pub fn collapse_all(&mut self) {
        for node in self.nodes.iter_mut().skip(1) {
            node.expanded = node.children.is_empty();
        }
        if let Some(root) = self.nodes.first_mut() {
            root.expanded = true;
        }
    }

    /// Rows to draw under `bounds`.
    ///
    /// Consecutive spans outside the window fold into one
    /// [`RenderRow::HiddenSpans`] marker placed before the next visible span,
    /// or at the end. Collapsed subtrees are skipped entirely.
    pub fn rows(&self, bounds: &BoundsFn) -> Vec<RenderRow> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut hidden = 0usize;
        let mut stack = vec![Self::ROOT];

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };

            let span_bounds = bounds.bounds(node.span.start_timestamp, node.span.timestamp);
            if span_bounds.is_visible() {
                if hidden > 0 {
                    rows.push(RenderRow::HiddenSpans { count: hidden });
                    hidden = 0;
                }
                rows.push(RenderRow::Span {
                    node: id,
                    bounds: span_bounds,
                });
            } else {
                hidden += 1;
            }

            if node.expanded {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        if hidden > 0 {
            rows.push(RenderRow::HiddenSpans { count: hidden });
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::timeline::bounds::make_bounds_fn;

    fn span(id: &str, parent: &str, start: f64, end: f64) -> Span {
        Span {
            span_id: id.to_owned(),
            parent_span_id: Some(parent.to_owned()),
            start_timestamp: start,
            timestamp: end,
            ..Span::default()
        }
    }

    /// root ─┬─ a ── a1
    ///       └─ b
    fn sample() -> ParsedTrace {
        let mut child_spans = HashMap::new();
        child_spans.insert(
            "root".to_owned(),
            vec![span("a", "root", 0.0, 40.0), span("b", "root", 60.0, 100.0)],
        );
        child_spans.insert("a".to_owned(), vec![span("a1", "a", 10.0, 20.0)]);

        ParsedTrace {
            child_spans,
            trace_id: "t".to_owned(),
            root_span_id: "root".to_owned(),
            op: "transaction".to_owned(),
            trace_start_timestamp: 0.0,
            trace_end_timestamp: 100.0,
            num_of_spans: 3,
        }
    }

    fn ids(tree: &SpanTree) -> Vec<&str> {
        tree.iter().map(|(_, node)| node.span.span_id.as_str()).collect()
    }

    #[test]
    fn nodes_are_pre_ordered_with_sequences() {
        let tree = SpanTree::build(&sample());

        assert_eq!(ids(&tree), ["root", "a", "a1", "b"]);
        let sequences = tree.iter().map(|(_, node)| node.sequence).collect::<Vec<_>>();
        assert_eq!(sequences, [1, 2, 3, 4]);

        let a1 = tree.node(NodeId::from_index(2));
        assert_eq!(a1.depth, 2);
        assert_eq!(a1.parent, Some(NodeId::from_index(1)));
        assert_eq!(tree.node(SpanTree::ROOT).children.len(), 2);
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn cycles_do_not_loop() {
        let mut trace = sample();
        trace
            .child_spans
            .insert("a1".to_owned(), vec![span("a", "a1", 12.0, 18.0)]);

        let tree = SpanTree::build(&trace);
        assert_eq!(ids(&tree), ["root", "a", "a1", "a", "b"]);
    }

    #[test]
    fn hidden_spans_fold_into_markers() {
        let tree = SpanTree::build(&sample());
        let rows = tree.rows(&make_bounds_fn(0.0, 100.0, 0.5, 1.0));

        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], RenderRow::Span { node, .. } if node == SpanTree::ROOT));
        assert_eq!(rows[1], RenderRow::HiddenSpans { count: 2 });
        assert!(matches!(rows[2], RenderRow::Span { node, .. } if node.index() == 3));
    }

    #[test]
    fn trailing_hidden_spans_get_a_marker() {
        let tree = SpanTree::build(&sample());
        let rows = tree.rows(&make_bounds_fn(0.0, 100.0, 0.0, 0.05));

        assert_eq!(rows.last(), Some(&RenderRow::HiddenSpans { count: 2 }));
    }

    #[test]
    fn collapsed_subtrees_are_skipped_and_not_counted() {
        let mut tree = SpanTree::build(&sample());
        assert!(!tree.toggle(NodeId::from_index(1)));

        let rows = tree.rows(&make_bounds_fn(0.0, 100.0, 0.0, 1.0));
        let nodes = rows
            .iter()
            .filter_map(|row| match row {
                RenderRow::Span { node, .. } => Some(node.index()),
                RenderRow::HiddenSpans { .. } => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(nodes, [0, 1, 3]);
    }

    #[test]
    fn collapse_and_expand_all() {
        let mut tree = SpanTree::build(&sample());
        tree.collapse_all();
        assert_eq!(tree.rows(&make_bounds_fn(0.0, 100.0, 0.0, 1.0)).len(), 3);

        tree.expand_all();
        assert_eq!(tree.rows(&make_bounds_fn(0.0, 100.0, 0.0, 1.0)).len(), 4);
    }

    #[test]
    fn empty_trace_has_only_root() {
        let trace = ParsedTrace {
            trace_start_timestamp: 1.0,
            trace_end_timestamp: 2.0,
            ..ParsedTrace::default()
        };
        let tree = SpanTree::build(&trace);
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert!(tree.node(SpanTree::ROOT).children.is_empty());
    }
}
