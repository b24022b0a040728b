// group.rs - Alternation and capturing/non-capturing groups.
//
// A group marks its slot as entered, then offers every branch the same
// entry position. Branch tails meet at the group's GroupEnd, which records
// the capture and runs the real continuation, so a failure anywhere after
// the group comes back here and the next branch is tried.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::state::MatchState;

impl Graph {
    pub(crate) fn attempt_group(
        &self,
        slot: usize,
        branches: &[NodeId],
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let prior = state.consumed(slot);
        state.set_consumed(slot, Some(pos));

        for &branch in branches {
            if !state.proceed() {
                break;
            }
            if let Some(end) = self.attempt(branch, pos, input, state) {
                return Some(end);
            }
        }

        state.set_consumed(slot, prior);
        None
    }

    pub(crate) fn attempt_group_end(
        &self,
        slot: usize,
        capture: Option<usize>,
        next: NodeId,
        pos: usize,
        input: &str,
        state: &mut MatchState,
    ) -> Option<usize> {
        let Some(group) = capture else {
            return self.attempt(next, pos, input, state);
        };

        let prior_start = state.group_start(group);
        let prior_end = state.group_end(group);
        state.set_group(group, state.consumed(slot), Some(pos));

        let r = self.attempt(next, pos, input, state);
        if r.is_none() {
            state.set_group(group, prior_start, prior_end);
        }
        r
    }
}
