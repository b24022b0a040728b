// quantifier.rs - Greedy and reluctant repetition.
//
// Repeat: the body chain ends in a RepeatTail whose `owner` link leads back
// to the Repeat node, so every completed iteration re-enters the decision
// "iterate again or continue" with the iteration counter in MatchState.
//
// LeafRepeat: a single literal or class needs no body chain. Greedy
// matching collects every reachable end position first and then backs off
// one iteration at a time.
//
// Non-progress: an iteration that ends where it began stops the loop and
// continues with what follows the quantifier.

use smallvec::{smallvec, SmallVec};

use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::state::MatchState;

#[inline]
fn below_max(count: usize, max: Option<usize>) -> bool {
    max.map_or(true, |m| count < m)
}

impl Graph {
    pub(crate) fn attempt_repeat(
        &self,
        id: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let Node::Repeat { slot, .. } = self.node(id) else {
            debug_assert!(false, "attempt_repeat on non-repeat node {:?}", id);
            return None;
        };
        let slot = *slot;
        let prior_count = state.count(slot);
        let prior_start = state.consumed(slot);
        state.set_count(slot, 0);
        state.set_consumed(slot, None);

        let r = self.repeat_step(id, pos, input, state);
        if r.is_none() {
            state.set_count(slot, prior_count);
            state.set_consumed(slot, prior_start);
        }
        r
    }

    pub(crate) fn attempt_repeat_tail(
        &self,
        owner: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let Node::Repeat { slot, next, .. } = self.node(owner) else {
            debug_assert!(false, "repeat tail owner {:?} is not a repeat", owner);
            return None;
        };
        let slot = *slot;

        if state.consumed(slot) == Some(pos) {
            return self.attempt(*next, pos, input, state);
        }

        let count = state.count(slot);
        state.set_count(slot, count + 1);
        let r = self.repeat_step(owner, pos, input, state);
        if r.is_none() {
            state.set_count(slot, count);
        }
        r
    }

    /// Decide between another iteration and the continuation, in the order
    /// the quantifier's greediness prefers.
    fn repeat_step(
        &self,
        id: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let Node::Repeat {
            slot,
            body,
            min,
            max,
            greedy,
            next,
        } = self.node(id)
        else {
            return None;
        };
        let count = state.count(*slot);
        let may_loop = below_max(count, *max);

        if *greedy {
            if may_loop {
                if let Some(end) = self.repeat_iterate(*slot, *body, pos, input, state) {
                    return Some(end);
                }
            }
            if count >= *min && !state.is_halted() {
                return self.attempt(*next, pos, input, state);
            }
            None
        } else {
            if count >= *min {
                if let Some(end) = self.attempt(*next, pos, input, state) {
                    return Some(end);
                }
            }
            if may_loop {
                return self.repeat_iterate(*slot, *body, pos, input, state);
            }
            None
        }
    }

    fn repeat_iterate(
        &self,
        slot: usize,
        body: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        if !state.proceed() {
            return None;
        }
        let prior = state.consumed(slot);
        state.set_consumed(slot, Some(pos));

        let r = self.attempt(body, pos, input, state);
        if r.is_none() {
            state.set_consumed(slot, prior);
        }
        r
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn attempt_leaf_repeat_greedy(
        &self,
        leaf: NodeId,
        min: usize,
        max: Option<usize>,
        next: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let mut ends: SmallVec<[usize; 32]> = smallvec![pos];
        let mut cur = pos;
        while below_max(ends.len() - 1, max) {
            match self.match_leaf(leaf, cur, input, state) {
                Some(end) if end > cur => {
                    ends.push(end);
                    cur = end;
                }
                _ => break,
            }
        }

        let mut count = ends.len() - 1;
        while count >= min {
            if !state.proceed() {
                return None;
            }
            if let Some(end) = self.attempt(next, ends[count], input, state) {
                return Some(end);
            }
            if count == 0 {
                break;
            }
            count -= 1;
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn attempt_leaf_repeat_reluctant(
        &self,
        leaf: NodeId,
        min: usize,
        max: Option<usize>,
        next: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let mut cur = pos;
        let mut count = 0;
        loop {
            if !state.proceed() {
                return None;
            }
            if count >= min {
                if let Some(end) = self.attempt(next, cur, input, state) {
                    return Some(end);
                }
            }
            if !below_max(count, max) {
                return None;
            }
            match self.match_leaf(leaf, cur, input, state) {
                Some(end) if end > cur => {
                    cur = end;
                    count += 1;
                }
                _ => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::{Expr, RepeatKind};
    use crate::graph::Graph;
    use crate::leaf::CharClass;
    use crate::node::Node;
    use crate::state::MatchState;

    fn end_of(expr: &Expr, input: &str) -> Option<usize> {
        let g = Graph::compile(expr).unwrap();
        let mut st = MatchState::new(&g);
        g.attempt(g.entry(), 0, input, &mut st)
    }

    #[test]
    fn greedy_leaf_backs_off() {
        // a*ab
        let e = Expr::concat([
            Expr::star(Expr::literal("a")),
            Expr::literal("ab"),
        ]);
        assert_eq!(end_of(&e, "aaab"), Some(4));
        assert_eq!(end_of(&e, "aaa"), None);
    }

    #[test]
    fn reluctant_leaf_takes_fewest() {
        // a+?
        let e = Expr::repeat(Expr::literal("a"), 1, None, RepeatKind::Reluctant);
        assert_eq!(end_of(&e, "aaa"), Some(1));
        // a*?b
        let e = Expr::concat([
            Expr::repeat(Expr::literal("a"), 0, None, RepeatKind::Reluctant),
            Expr::literal("b"),
        ]);
        assert_eq!(end_of(&e, "aaab"), Some(4));
    }

    #[test]
    fn bounded_leaf() {
        // \d{2,3}
        let e = Expr::repeat(Expr::class(CharClass::digit()), 2, Some(3), RepeatKind::Greedy);
        assert_eq!(end_of(&e, "12345"), Some(3));
        assert_eq!(end_of(&e, "1x"), None);
    }

    #[test]
    fn general_repeat_counts_iterations() {
        // (?:ab){2}c
        let e = Expr::concat([
            Expr::repeat(
                Expr::non_capture(Expr::literal("ab")),
                2,
                Some(2),
                RepeatKind::Greedy,
            ),
            Expr::literal("c"),
        ]);
        assert_eq!(end_of(&e, "ababc"), Some(5));
        assert_eq!(end_of(&e, "abc"), None);
        assert_eq!(end_of(&e, "abababc"), None);
    }

    #[test]
    fn general_repeat_backtracks_iterations() {
        // (?:a|b)*b
        let e = Expr::concat([
            Expr::star(Expr::non_capture(Expr::alternation([
                Expr::literal("a"),
                Expr::literal("b"),
            ]))),
            Expr::literal("b"),
        ]);
        assert_eq!(end_of(&e, "abab"), Some(4));
    }

    #[test]
    fn reluctant_general_repeat() {
        // (?:ab)*?
        let e = Expr::repeat(
            Expr::non_capture(Expr::literal("ab")),
            0,
            None,
            RepeatKind::Reluctant,
        );
        assert_eq!(end_of(&e, "abab"), Some(0));
    }

    #[test]
    fn empty_iteration_terminates() {
        // (?:)*x and (?:a?)*x
        let e = Expr::concat([Expr::star(Expr::non_capture(Expr::Empty)), Expr::literal("x")]);
        assert_eq!(end_of(&e, "x"), Some(1));
        let e = Expr::concat([
            Expr::star(Expr::non_capture(Expr::optional(Expr::literal("a")))),
            Expr::literal("x"),
        ]);
        assert_eq!(end_of(&e, "aax"), Some(3));
        assert_eq!(end_of(&e, "y"), None);
    }

    #[test]
    fn capture_keeps_last_iteration() {
        // (a|b)+
        let g = Graph::compile(&Expr::plus(Expr::capture(Expr::alternation([
            Expr::literal("a"),
            Expr::literal("b"),
        ]))))
        .unwrap();
        let mut st = MatchState::new(&g);
        assert_eq!(g.attempt(g.entry(), 0, "abba", &mut st), Some(4));
        assert_eq!(st.group(1), Some((3, 4)));
    }

    #[test]
    fn failed_repeat_restores_registers() {
        // (a)+b against "aac"
        let g = Graph::compile(&Expr::concat([
            Expr::plus(Expr::capture(Expr::literal("a"))),
            Expr::literal("b"),
        ]))
        .unwrap();
        let mut st = MatchState::new(&g);
        let before = st.snapshot();
        assert_eq!(g.attempt(g.entry(), 0, "aac", &mut st), None);
        assert_eq!(st.snapshot(), before);
    }

    #[test]
    fn tail_links_back_to_owner() {
        let g = Graph::compile(&Expr::star(Expr::capture(Expr::literal("a")))).unwrap();
        let repeat = g.entry();
        assert!(matches!(g.node(repeat), Node::Repeat { .. }));
        let tail = g
            .nodes()
            .find(|(_, n)| matches!(n, Node::RepeatTail { .. }))
            .map(|(id, _)| id)
            .unwrap();
        match g.node(tail) {
            Node::RepeatTail { owner } => assert_eq!(*owner, repeat),
            _ => unreachable!(),
        }
    }
}
