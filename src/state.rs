// state.rs - Per-attempt match state.
//
// A MatchState is created for one match attempt, threaded through the node
// graph by `&mut`, and discarded (or turned into a MatchOutcome) afterwards.
// It owns no part of the graph. Every composite node restores the fields it
// wrote before reporting failure, so a failed `attempt` leaves the registers
// exactly as the caller saw them.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use smallvec::{smallvec, SmallVec};

use crate::error::RegexError;
use crate::exec::MatchOptions;
use crate::graph::Graph;

/// Number of budget polls between two clock reads.
const CHECK_TIME_INTERVAL: u64 = 512;

// ============================================================================
// Registers
// ============================================================================

/// The observable, rollback-tracked part of a [`MatchState`].
///
/// Index spaces:
/// - `consumed` / `counts` are indexed by state slot. Every group and every
///   general quantifier owns one slot.
/// - `starts` / `ends` are indexed by capture number, 0 being the whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    consumed: SmallVec<[Option<usize>; 8]>,
    counts: SmallVec<[usize; 8]>,
    starts: SmallVec<[Option<usize>; 8]>,
    ends: SmallVec<[Option<usize>; 8]>,
    origin: usize,
}

impl Registers {
    fn new(slots: usize, captures: usize) -> Self {
        Registers {
            consumed: smallvec![None; slots],
            counts: smallvec![0; slots],
            starts: smallvec![None; captures + 1],
            ends: smallvec![None; captures + 1],
            origin: 0,
        }
    }

    fn clear(&mut self, origin: usize) {
        self.consumed.iter_mut().for_each(|c| *c = None);
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.starts.iter_mut().for_each(|s| *s = None);
        self.ends.iter_mut().for_each(|e| *e = None);
        self.origin = origin;
    }
}

/// Saved copy of the registers enclosed by an atomic group or lookahead.
#[derive(Debug)]
pub(crate) struct SavedRange {
    captures: Range<usize>,
    slots: Range<usize>,
    bounds: SmallVec<[(Option<usize>, Option<usize>); 4]>,
    consumed: SmallVec<[Option<usize>; 4]>,
    counts: SmallVec<[usize; 4]>,
}

// ============================================================================
// Budget (retry / time limits, cancellation)
// ============================================================================

struct Budget {
    match_stack_limit: u32,
    depth: u32,
    retry_limit_in_match: u64,
    retry_limit_in_search: u64,
    retries_in_match: u64,
    retries_in_search: u64,
    time_limit: u64,
    time_start: Option<Instant>,
    abort: Option<Arc<AtomicBool>>,
    halt: Option<RegexError>,
}

impl Budget {
    fn new(options: &MatchOptions) -> Self {
        Budget {
            match_stack_limit: options.match_stack_limit,
            depth: 0,
            retry_limit_in_match: options.retry_limit_in_match,
            retry_limit_in_search: options.retry_limit_in_search,
            retries_in_match: 0,
            retries_in_search: 0,
            time_limit: options.time_limit,
            time_start: None,
            abort: options.abort.clone(),
            halt: None,
        }
    }

    /// Restart every counter and the clock.
    fn clear(&mut self) {
        self.depth = 0;
        self.retries_in_match = 0;
        self.retries_in_search = 0;
        self.time_start = None;
        self.halt = None;
    }

    #[inline]
    fn enter(&mut self) -> bool {
        if self.halt.is_some() {
            return false;
        }
        if self.match_stack_limit != 0 && self.depth >= self.match_stack_limit {
            return self.trip(RegexError::MatchStackLimitOver);
        }
        self.depth += 1;
        true
    }

    #[inline]
    fn poll(&mut self) -> bool {
        if self.halt.is_some() {
            return false;
        }
        self.retries_in_match += 1;
        self.retries_in_search += 1;

        if self.retry_limit_in_match != 0 && self.retries_in_match > self.retry_limit_in_match {
            return self.trip(RegexError::RetryLimitInMatchOver);
        }
        if self.retry_limit_in_search != 0 && self.retries_in_search > self.retry_limit_in_search {
            return self.trip(RegexError::RetryLimitInSearchOver);
        }
        if self.retries_in_search % CHECK_TIME_INTERVAL == 0 {
            if self.time_limit != 0 {
                let start = self.time_start.get_or_insert_with(Instant::now);
                if start.elapsed() >= Duration::from_millis(self.time_limit) {
                    return self.trip(RegexError::TimeLimitOver);
                }
            }
            if let Some(abort) = &self.abort {
                if abort.load(Ordering::Relaxed) {
                    return self.trip(RegexError::Aborted);
                }
            }
        }
        true
    }

    #[cold]
    fn trip(&mut self, err: RegexError) -> bool {
        log::debug!("match halted after {} retries: {}", self.retries_in_search, err);
        self.halt = Some(err);
        false
    }
}

// ============================================================================
// MatchState
// ============================================================================

/// Mutable record of group boundaries and iteration counters for one match
/// attempt against a [`Graph`].
pub struct MatchState {
    regs: Registers,
    budget: Budget,
}

impl MatchState {
    /// Create a state sized for `graph`, using the process-wide limits.
    pub fn new(graph: &Graph) -> Self {
        Self::with_options(graph, &MatchOptions::default())
    }

    /// Create a state sized for `graph` with explicit limits.
    pub fn with_options(graph: &Graph, options: &MatchOptions) -> Self {
        MatchState {
            regs: Registers::new(graph.slots_len(), graph.captures_len()),
            budget: Budget::new(options),
        }
    }

    /// Clear all registers and restart every limit counter and the clock,
    /// for an independent match whose `\G` position is `origin`.
    pub fn reset(&mut self, origin: usize) {
        self.regs.clear(origin);
        self.budget.clear();
    }

    /// Clear the registers for the next attempt of a search that began at
    /// `origin`. The search-wide retry counter and clock keep running.
    pub(crate) fn reset_attempt(&mut self, origin: usize) {
        self.regs.clear(origin);
        self.budget.retries_in_match = 0;
        self.budget.depth = 0;
    }

    /// Position the current search began at (the `\G` anchor).
    pub fn origin(&self) -> usize {
        self.regs.origin
    }

    /// Position at which group `slot`'s content last began, if inside it.
    #[inline]
    pub fn consumed(&self, slot: usize) -> Option<usize> {
        self.regs.consumed[slot]
    }

    #[inline]
    pub fn set_consumed(&mut self, slot: usize, pos: Option<usize>) {
        self.regs.consumed[slot] = pos;
    }

    /// Completed iterations of the quantifier owning `slot`.
    #[inline]
    pub fn count(&self, slot: usize) -> usize {
        self.regs.counts[slot]
    }

    #[inline]
    pub fn set_count(&mut self, slot: usize, count: usize) {
        self.regs.counts[slot] = count;
    }

    /// Start of capture `group`, if set.
    #[inline]
    pub fn group_start(&self, group: usize) -> Option<usize> {
        self.regs.starts[group]
    }

    /// End of capture `group`, if set.
    #[inline]
    pub fn group_end(&self, group: usize) -> Option<usize> {
        self.regs.ends[group]
    }

    /// Both bounds of capture `group`, if it has matched.
    pub fn group(&self, group: usize) -> Option<(usize, usize)> {
        match (self.regs.starts[group], self.regs.ends[group]) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    #[inline]
    pub fn set_group(&mut self, group: usize, start: Option<usize>, end: Option<usize>) {
        self.regs.starts[group] = start;
        self.regs.ends[group] = end;
    }

    /// Number of capture slots, group 0 included.
    pub fn groups_len(&self) -> usize {
        self.regs.starts.len()
    }

    /// Copy of the rollback-tracked registers.
    pub fn snapshot(&self) -> Registers {
        self.regs.clone()
    }

    /// Overwrite the registers with an earlier snapshot.
    pub fn restore(&mut self, regs: &Registers) {
        self.regs.clone_from(regs);
    }

    /// Poll the retry/time/abort budget. Returns `false` once the attempt
    /// must stop; composite nodes then fail (and roll back) immediately.
    #[inline]
    pub fn proceed(&mut self) -> bool {
        self.budget.poll()
    }

    /// Open one level of node nesting. Returns `false` once the attempt must
    /// stop, tripping the match-stack limit if this level would exceed it.
    #[inline]
    pub(crate) fn enter(&mut self) -> bool {
        self.budget.enter()
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.budget.depth -= 1;
    }

    /// Whether a limit or cancellation has halted this attempt.
    pub fn is_halted(&self) -> bool {
        self.budget.halt.is_some()
    }

    pub(crate) fn take_halt(&mut self) -> Option<RegexError> {
        self.budget.halt.take()
    }

    pub(crate) fn save_range(&self, captures: Range<usize>, slots: Range<usize>) -> SavedRange {
        SavedRange {
            bounds: captures
                .clone()
                .map(|i| (self.regs.starts[i], self.regs.ends[i]))
                .collect(),
            consumed: self.regs.consumed[slots.clone()].iter().copied().collect(),
            counts: self.regs.counts[slots.clone()].iter().copied().collect(),
            captures,
            slots,
        }
    }

    pub(crate) fn restore_range(&mut self, saved: &SavedRange) {
        for (i, &(s, e)) in saved.captures.clone().zip(saved.bounds.iter()) {
            self.regs.starts[i] = s;
            self.regs.ends[i] = e;
        }
        self.regs.consumed[saved.slots.clone()].copy_from_slice(&saved.consumed);
        self.regs.counts[saved.slots.clone()].copy_from_slice(&saved.counts);
    }
}

impl std::fmt::Debug for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchState")
            .field("regs", &self.regs)
            .field("halted", &self.budget.halt)
            .finish_non_exhaustive()
    }
}
