// graph.rs - Compiled pattern graph and the Expr-to-graph lowering.
//
// The graph is an arena of nodes built once and then shared read-only by
// any number of match attempts. Lowering works back to front: a node is
// created after its continuation, so every `next` link is known when the
// node is pushed and no chain is ever left unterminated (index 0 holds the
// Succeed sentinel).
//
// Capture numbers follow opening-parenthesis order. Each subtree's state
// slots are allocated contiguously, which lets atomic groups and
// lookaheads describe the registers they enclose as plain ranges.

use crate::error::RegexError;
use crate::expr::{Expr, GroupKind, RepeatKind};
use crate::node::{Inner, Node, NodeId};

/// An immutable, shareable match-node graph.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    entry: NodeId,
    captures: usize,
    slots: usize,
    prefix: Option<u8>,
}

impl Graph {
    /// Lower `expr` into a graph.
    pub fn compile(expr: &Expr) -> Result<Graph, RegexError> {
        let captures = expr.capture_count();
        validate(expr, captures)?;

        let mut builder = Builder {
            nodes: vec![Node::Succeed],
            slots: 0,
        };
        let entry = builder.lower(expr, NodeId::SUCCEED, 1);

        let mut graph = Graph {
            nodes: builder.nodes,
            entry,
            captures,
            slots: builder.slots,
            prefix: None,
        };
        graph.prefix = graph.first_byte(entry);
        log::debug!(
            "compiled graph: {} nodes, {} captures, {} slots, prefix {:?}",
            graph.nodes.len(),
            graph.captures,
            graph.slots,
            graph.prefix
        );
        Ok(graph)
    }

    /// The node every match attempt starts from.
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All nodes with their ids, in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Number of nodes, the sentinel included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a graph holds at least its sentinel.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of capture groups (excluding group 0).
    pub fn captures_len(&self) -> usize {
        self.captures
    }

    /// Number of state slots a [`MatchState`](crate::state::MatchState)
    /// must provide.
    pub fn slots_len(&self) -> usize {
        self.slots
    }

    /// Byte every match must begin with, when known.
    pub(crate) fn prefix_byte(&self) -> Option<u8> {
        self.prefix
    }

    fn first_byte(&self, id: NodeId) -> Option<u8> {
        match self.node(id) {
            Node::Literal {
                text,
                ignore_case: false,
                ..
            } => text.as_bytes().first().copied(),
            Node::Sequence { children, .. } => self.first_byte(*children.first()?),
            Node::Group { branches, .. } | Node::Atomic { branches, .. } if branches.len() == 1 => {
                self.first_byte(branches[0])
            }
            Node::Repeat { body, min, .. } if *min > 0 => self.first_byte(*body),
            Node::LeafRepeat { leaf, min, .. } if *min > 0 => self.first_byte(*leaf),
            _ => None,
        }
    }
}

fn validate(expr: &Expr, captures: usize) -> Result<(), RegexError> {
    match expr {
        Expr::BackRef { group, .. } => {
            if *group == 0 || *group > captures {
                return Err(RegexError::InvalidBackReference { group: *group });
            }
        }
        Expr::Concat(items) => {
            for item in items {
                validate(item, captures)?;
            }
        }
        Expr::Alternation(branches) => {
            if branches.is_empty() {
                return Err(RegexError::EmptyAlternation);
            }
            for branch in branches {
                validate(branch, captures)?;
            }
        }
        Expr::Group { body, .. } => validate(body, captures)?,
        Expr::Repeat { body, min, max, .. } => {
            if let Some(max) = max {
                if min > max {
                    return Err(RegexError::InvalidRepeatRange {
                        min: *min,
                        max: *max,
                    });
                }
            }
            validate(body, captures)?;
        }
        Expr::Empty | Expr::Literal { .. } | Expr::Class(_) | Expr::Anchor(_) => {}
    }
    Ok(())
}

struct Builder {
    nodes: Vec<Node>,
    slots: usize,
}

impl Builder {
    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn alloc_slot(&mut self) -> usize {
        let slot = self.slots;
        self.slots += 1;
        slot
    }

    /// Lower `expr` so that it continues at `next`; `cap` is the number the
    /// first capture group inside `expr` receives. Returns the entry node,
    /// which is `next` itself when `expr` matches only the empty string
    /// without needing a node.
    fn lower(&mut self, expr: &Expr, next: NodeId, cap: usize) -> NodeId {
        match expr {
            Expr::Empty => next,
            Expr::Literal { text, .. } if text.is_empty() => next,
            Expr::Literal { text, ignore_case } => self.push(Node::Literal {
                text: text.as_str().into(),
                ignore_case: *ignore_case,
                next,
            }),
            Expr::Class(class) => self.push(Node::Class {
                class: class.clone(),
                next,
            }),
            Expr::Anchor(anchor) => self.push(Node::Anchor {
                anchor: *anchor,
                next,
            }),
            Expr::BackRef { group, ignore_case } => self.push(Node::BackRef {
                group: *group,
                ignore_case: *ignore_case,
                next,
            }),
            Expr::Concat(items) => self.lower_concat(items, next, cap),
            Expr::Alternation(branches) => {
                self.lower_group(GroupKind::NonCapture, branches, next, cap)
            }
            Expr::Group { kind, body } => match body.as_ref() {
                Expr::Alternation(branches) => self.lower_group(*kind, branches, next, cap),
                single => self.lower_group(*kind, std::slice::from_ref(single), next, cap),
            },
            Expr::Repeat {
                body,
                min,
                max,
                kind,
            } => self.lower_repeat(body, *min, *max, *kind, next, cap),
        }
    }

    fn lower_concat(&mut self, items: &[Expr], next: NodeId, cap: usize) -> NodeId {
        let mut bases = Vec::with_capacity(items.len());
        let mut base = cap;
        for item in items {
            bases.push(base);
            base += item.capture_count();
        }

        let mut cont = next;
        let mut children = Vec::with_capacity(items.len());
        for (item, &base) in items.iter().zip(&bases).rev() {
            let id = self.lower(item, cont, base);
            if id != cont {
                children.push(id);
                cont = id;
            }
        }
        children.reverse();

        match children.len() {
            0 => next,
            1 => children[0],
            _ => self.push(Node::Sequence {
                children: children.into_boxed_slice(),
                next,
            }),
        }
    }

    fn lower_group(
        &mut self,
        kind: GroupKind,
        branches: &[Expr],
        next: NodeId,
        cap: usize,
    ) -> NodeId {
        let slot = self.alloc_slot();
        let (capture, first_inner) = match kind {
            GroupKind::Capture => (Some(cap), cap + 1),
            _ => (None, cap),
        };

        let tail = match kind {
            GroupKind::Capture | GroupKind::NonCapture => self.push(Node::GroupEnd {
                slot,
                capture,
                next,
            }),
            GroupKind::Atomic | GroupKind::LookAhead | GroupKind::NegativeLookAhead => {
                self.push(Node::Commit { slot })
            }
        };

        let mut base = first_inner;
        let mut ids = Vec::with_capacity(branches.len());
        for branch in branches {
            ids.push(self.lower(branch, tail, base));
            base += branch.capture_count();
        }
        let branches = ids.into_boxed_slice();
        let inner = Inner {
            captures: first_inner..base,
            slots: slot + 1..self.slots,
        };

        match kind {
            GroupKind::Capture | GroupKind::NonCapture => self.push(Node::Group {
                slot,
                capture,
                branches,
                next,
            }),
            GroupKind::Atomic => self.push(Node::Atomic {
                slot,
                branches,
                inner,
                next,
            }),
            GroupKind::LookAhead | GroupKind::NegativeLookAhead => self.push(Node::LookAhead {
                slot,
                negate: kind == GroupKind::NegativeLookAhead,
                branches,
                inner,
                next,
            }),
        }
    }

    fn lower_repeat(
        &mut self,
        body: &Expr,
        min: u32,
        max: Option<u32>,
        kind: RepeatKind,
        next: NodeId,
        cap: usize,
    ) -> NodeId {
        if max == Some(0) {
            return next;
        }
        if kind == RepeatKind::Possessive {
            let greedy = Expr::repeat(body.clone(), min, max, RepeatKind::Greedy);
            return self.lower_group(GroupKind::Atomic, std::slice::from_ref(&greedy), next, cap);
        }

        let min = min as usize;
        let max = max.map(|m| m as usize);
        let greedy = kind == RepeatKind::Greedy;

        if body.is_simple_leaf() {
            let leaf = self.lower(body, NodeId::SUCCEED, cap);
            return self.push(Node::LeafRepeat {
                leaf,
                min,
                max,
                greedy,
                next,
            });
        }

        let slot = self.alloc_slot();
        // Reserved until the body exists; the tail needs this id first.
        let id = self.push(Node::Succeed);
        let tail = self.push(Node::RepeatTail { owner: id });
        let body = self.lower(body, tail, cap);
        self.nodes[id.index()] = Node::Repeat {
            slot,
            body,
            min,
            max,
            greedy,
            next,
        };
        id
    }
}
