// atomic.rs - Atomic groups and lookahead.
//
// Both constructs run their branches against a Commit terminal instead of
// the real continuation. The position a branch returns is therefore the
// commit index: where the group's own content ended. The owning node then
// drives the rest of the pattern itself, and a later failure never comes
// back into a different branch.
//
// Once committed, a failure after the group restores everything the branch
// left behind (enclosed captures, slots and counters) before reporting it.

use crate::graph::Graph;
use crate::node::{Inner, NodeId};
use crate::state::MatchState;

impl Graph {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn attempt_atomic(
        &self,
        slot: usize,
        branches: &[NodeId],
        inner: &Inner,
        next: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let prior = state.consumed(slot);
        let saved = state.save_range(inner.captures.clone(), inner.slots.clone());
        state.set_consumed(slot, Some(pos));

        for &branch in branches {
            if !state.proceed() {
                break;
            }
            if let Some(commit) = self.attempt(branch, pos, input, state) {
                log::trace!("atomic slot {} committed {}..{}", slot, pos, commit);
                let r = self.attempt(next, commit, input, state);
                if r.is_none() {
                    state.restore_range(&saved);
                    state.set_consumed(slot, prior);
                }
                return r;
            }
        }

        state.set_consumed(slot, prior);
        None
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn attempt_lookahead(
        &self,
        slot: usize,
        negate: bool,
        branches: &[NodeId],
        inner: &Inner,
        next: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let prior = state.consumed(slot);
        let saved = state.save_range(inner.captures.clone(), inner.slots.clone());
        state.set_consumed(slot, Some(pos));

        let mut committed = false;
        for &branch in branches {
            if !state.proceed() {
                break;
            }
            if self.attempt(branch, pos, input, state).is_some() {
                committed = true;
                break;
            }
        }

        let r = if committed != negate && !state.is_halted() {
            self.attempt(next, pos, input, state)
        } else {
            None
        };
        if r.is_none() {
            state.restore_range(&saved);
            state.set_consumed(slot, prior);
        }
        r
    }
}
