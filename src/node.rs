// node.rs - Match node kinds and the attempt dispatcher.
//
// Nodes live in the Graph's arena and refer to each other by NodeId.
// Two kinds of edges exist:
//   - owned children (`children`, `branches`, `body`, `leaf`): the tree part
//     of the graph, each child belongs to exactly one parent;
//   - continuation links (`next`, `owner`): plain indices into the shared
//     arena, possibly pointing backwards, never implying ownership.
//
// `attempt` on a node matches the node AND everything after it. Success is
// the final position reached by the whole chain; failure is `None` with the
// state rolled back to what the caller passed in.

use std::ops::Range;

use crate::graph::Graph;
use crate::leaf::{match_backref, match_class, match_literal, Anchor, CharClass};
use crate::state::MatchState;

/// Index of a node in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The terminal sentinel every graph stores at index 0.
    pub const SUCCEED: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Registers enclosed by an atomic group or lookahead, restored when the
/// construct fails after having committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inner {
    pub captures: Range<usize>,
    pub slots: Range<usize>,
}

/// One unit of a compiled pattern.
#[derive(Debug, Clone)]
pub enum Node {
    /// Terminal sentinel: succeeds at whatever position it is given.
    Succeed,
    Literal {
        text: Box<str>,
        ignore_case: bool,
        next: NodeId,
    },
    Class {
        class: CharClass,
        next: NodeId,
    },
    Anchor {
        anchor: Anchor,
        next: NodeId,
    },
    BackRef {
        group: usize,
        ignore_case: bool,
        next: NodeId,
    },
    /// Children chained one into the next; the last one continues at `next`.
    Sequence {
        children: Box<[NodeId]>,
        next: NodeId,
    },
    /// Alternation body of a capturing (`capture: Some`) or non-capturing
    /// group. Every branch ends in the group's `GroupEnd`.
    Group {
        slot: usize,
        capture: Option<usize>,
        branches: Box<[NodeId]>,
        next: NodeId,
    },
    GroupEnd {
        slot: usize,
        capture: Option<usize>,
        next: NodeId,
    },
    /// General quantifier. `body` ends in a `RepeatTail` pointing back here.
    Repeat {
        slot: usize,
        body: NodeId,
        min: usize,
        max: Option<usize>,
        greedy: bool,
        next: NodeId,
    },
    RepeatTail {
        owner: NodeId,
    },
    /// Quantifier over a single literal or class, iterated without a body
    /// chain. The leaf's own `next` is unused.
    LeafRepeat {
        leaf: NodeId,
        min: usize,
        max: Option<usize>,
        greedy: bool,
        next: NodeId,
    },
    /// `(?>...)`. Every branch ends in a `Commit`.
    Atomic {
        slot: usize,
        branches: Box<[NodeId]>,
        inner: Inner,
        next: NodeId,
    },
    /// `(?=...)` / `(?!...)`. Every branch ends in a `Commit`.
    LookAhead {
        slot: usize,
        negate: bool,
        branches: Box<[NodeId]>,
        inner: Inner,
        next: NodeId,
    },
    /// End of an atomic/lookahead branch: reports local success at the
    /// commit index without running anything after the group.
    Commit {
        slot: usize,
    },
}

impl Node {
    /// Continuation link, for nodes that have one.
    pub fn next(&self) -> Option<NodeId> {
        match self {
            Node::Literal { next, .. }
            | Node::Class { next, .. }
            | Node::Anchor { next, .. }
            | Node::BackRef { next, .. }
            | Node::Sequence { next, .. }
            | Node::Group { next, .. }
            | Node::GroupEnd { next, .. }
            | Node::Repeat { next, .. }
            | Node::LeafRepeat { next, .. }
            | Node::Atomic { next, .. }
            | Node::LookAhead { next, .. } => Some(*next),
            Node::Succeed | Node::RepeatTail { .. } | Node::Commit { .. } => None,
        }
    }
}

impl Graph {
    /// Match node `id` and its continuation chain starting at `pos`.
    ///
    /// Returns the position reached by the whole chain, or `None` with every
    /// register the call touched restored. Every call counts towards the
    /// match-stack limit while it is active.
    #[inline]
    pub fn attempt(
        &self,
        id: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        if !state.enter() {
            return None;
        }
        let r = self.attempt_node(id, pos, input, state);
        state.leave();
        r
    }

    fn attempt_node(
        &self,
        id: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        match self.node(id) {
            Node::Succeed => Some(pos),
            Node::Commit { slot } => {
                debug_assert!(state.consumed(*slot).is_some());
                Some(pos)
            }
            Node::Literal { next, .. } | Node::Class { next, .. } | Node::BackRef { next, .. } => {
                let end = self.match_leaf(id, pos, input, state)?;
                self.attempt(*next, end, input, state)
            }
            Node::Anchor { anchor, next } => {
                if anchor.is_at(input, pos, state.origin()) {
                    self.attempt(*next, pos, input, state)
                } else {
                    None
                }
            }
            Node::Sequence { children, next } => match children.first() {
                Some(&first) => self.attempt(first, pos, input, state),
                None => self.attempt(*next, pos, input, state),
            },
            Node::Group { slot, branches, .. } => {
                self.attempt_group(*slot, branches, pos, input, state)
            }
            Node::GroupEnd {
                slot,
                capture,
                next,
            } => self.attempt_group_end(*slot, *capture, *next, pos, input, state),
            Node::Repeat { .. } => self.attempt_repeat(id, pos, input, state),
            Node::RepeatTail { owner } => self.attempt_repeat_tail(*owner, pos, input, state),
            Node::LeafRepeat {
                leaf,
                min,
                max,
                greedy,
                next,
            } => {
                if *greedy {
                    self.attempt_leaf_repeat_greedy(*leaf, *min, *max, *next, pos, input, state)
                } else {
                    self.attempt_leaf_repeat_reluctant(*leaf, *min, *max, *next, pos, input, state)
                }
            }
            Node::Atomic {
                slot,
                branches,
                inner,
                next,
            } => self.attempt_atomic(*slot, branches, inner, *next, pos, input, state),
            Node::LookAhead {
                slot,
                negate,
                branches,
                inner,
                next,
            } => self.attempt_lookahead(*slot, *negate, branches, inner, *next, pos, input, state),
        }
    }

    /// Match leaf `id` alone, ignoring its continuation.
    #[inline]
    pub(crate) fn match_leaf(
        &self,
        id: NodeId,
        pos: usize,
        input: &str,
        state: &MatchState,
    ) -> Option<usize> {
        match self.node(id) {
            Node::Literal {
                text, ignore_case, ..
            } => match_literal(text, *ignore_case, input, pos),
            Node::Class { class, .. } => match_class(class, input, pos),
            Node::BackRef {
                group, ignore_case, ..
            } => match_backref(state.group(*group), *ignore_case, input, pos),
            Node::Anchor { anchor, .. } => anchor.is_at(input, pos, state.origin()).then_some(pos),
            _ => None,
        }
    }
}
