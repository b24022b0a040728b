// exec.rs - Match driver: limits, anchored run, forward search.
//
// `run` performs one anchored attempt from a start position. `search`
// repeats it at every character boundary until one succeeds, skipping
// ahead with memchr when the pattern must begin with a known byte.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::RegexError;
use crate::graph::Graph;
use crate::leaf::char_at;
use crate::outcome::{Captures, MatchOutcome};
use crate::state::MatchState;

// ============================================================================
// Global Limits
// ============================================================================

pub const DEFAULT_RETRY_LIMIT_IN_MATCH: u64 = 10_000_000;
pub const DEFAULT_RETRY_LIMIT_IN_SEARCH: u64 = 0;
/// Nested node attempts allowed in one match. Each level costs one or two
/// native stack frames; 1,000 levels fit a 2 MiB thread stack.
pub const DEFAULT_MATCH_STACK_LIMIT: u32 = 1_000;
pub const DEFAULT_TIME_LIMIT_MSEC: u64 = 0;

static RETRY_LIMIT_IN_MATCH: AtomicU64 = AtomicU64::new(DEFAULT_RETRY_LIMIT_IN_MATCH);
static RETRY_LIMIT_IN_SEARCH: AtomicU64 = AtomicU64::new(DEFAULT_RETRY_LIMIT_IN_SEARCH);
static MATCH_STACK_LIMIT: AtomicU32 = AtomicU32::new(DEFAULT_MATCH_STACK_LIMIT);
static TIME_LIMIT: AtomicU64 = AtomicU64::new(DEFAULT_TIME_LIMIT_MSEC);

pub fn set_retry_limit_in_match(n: u64) { RETRY_LIMIT_IN_MATCH.store(n, Ordering::Relaxed); }
pub fn get_retry_limit_in_match() -> u64 { RETRY_LIMIT_IN_MATCH.load(Ordering::Relaxed) }
pub fn set_retry_limit_in_search(n: u64) { RETRY_LIMIT_IN_SEARCH.store(n, Ordering::Relaxed); }
pub fn get_retry_limit_in_search() -> u64 { RETRY_LIMIT_IN_SEARCH.load(Ordering::Relaxed) }
pub fn set_match_stack_limit(n: u32) { MATCH_STACK_LIMIT.store(n, Ordering::Relaxed); }
pub fn get_match_stack_limit() -> u32 { MATCH_STACK_LIMIT.load(Ordering::Relaxed) }
pub fn set_time_limit(msec: u64) { TIME_LIMIT.store(msec, Ordering::Relaxed); }
pub fn get_time_limit() -> u64 { TIME_LIMIT.load(Ordering::Relaxed) }

// ============================================================================
// MatchOptions
// ============================================================================

/// Per-call limits. `Default` snapshots the process-wide settings; a limit
/// of 0 means unlimited.
///
/// ```
/// use ferrule::exec::MatchOptions;
///
/// let opts = MatchOptions::default()
///     .retry_limit_in_match(1_000)
///     .time_limit(50);
/// # let _ = opts;
/// ```
#[derive(Debug, Clone)]
pub struct MatchOptions {
    pub(crate) match_stack_limit: u32,
    pub(crate) retry_limit_in_match: u64,
    pub(crate) retry_limit_in_search: u64,
    pub(crate) time_limit: u64,
    pub(crate) abort: Option<Arc<AtomicBool>>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            match_stack_limit: get_match_stack_limit(),
            retry_limit_in_match: get_retry_limit_in_match(),
            retry_limit_in_search: get_retry_limit_in_search(),
            time_limit: get_time_limit(),
            abort: None,
        }
    }
}

impl MatchOptions {
    /// Maximum nesting of node attempts. Raise it only together with the
    /// stack size of the matching thread.
    pub fn match_stack_limit(mut self, n: u32) -> Self {
        self.match_stack_limit = n;
        self
    }

    /// Maximum backtracking steps for one anchored attempt.
    pub fn retry_limit_in_match(mut self, n: u64) -> Self {
        self.retry_limit_in_match = n;
        self
    }

    /// Maximum backtracking steps across a whole search.
    pub fn retry_limit_in_search(mut self, n: u64) -> Self {
        self.retry_limit_in_search = n;
        self
    }

    /// Wall-clock limit in milliseconds.
    pub fn time_limit(mut self, msec: u64) -> Self {
        self.time_limit = msec;
        self
    }

    /// Flag polled while matching; raising it stops the attempt with
    /// [`RegexError::Aborted`].
    pub fn abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }
}

// ============================================================================
// Driver
// ============================================================================

fn check_start(input: &str, start: usize) -> Result<(), RegexError> {
    if start > input.len() || !input.is_char_boundary(start) {
        return Err(RegexError::InvalidStartPosition { position: start });
    }
    Ok(())
}

/// Anchored match of `graph` against `input` at `start`.
///
/// ```
/// use ferrule::prelude::*;
///
/// let g = Graph::compile(&Expr::concat([
///     Expr::capture(Expr::plus(Expr::class(CharClass::digit()))),
///     Expr::literal("px"),
/// ])).unwrap();
///
/// let outcome = run(&g, "width: 120px", 7).unwrap();
/// let caps = outcome.captures().unwrap();
/// assert_eq!(caps.get(0).unwrap().as_str(), "120px");
/// assert_eq!(caps.get(1).unwrap().as_str(), "120");
/// assert!(!run(&g, "width: 120px", 0).unwrap().is_match());
/// ```
pub fn run<'t>(
    graph: &Graph,
    input: &'t str,
    start: usize,
) -> Result<MatchOutcome<'t>, RegexError> {
    run_with(graph, input, start, &MatchOptions::default())
}

pub fn run_with<'t>(
    graph: &Graph,
    input: &'t str,
    start: usize,
    options: &MatchOptions,
) -> Result<MatchOutcome<'t>, RegexError> {
    let mut state = MatchState::with_options(graph, options);
    match_at(graph, input, start, &mut state)
}

/// Anchored match reusing a caller-owned state. The state is fully reset
/// first, limit counters and clock included.
pub fn match_at<'t>(
    graph: &Graph,
    input: &'t str,
    start: usize,
    state: &mut MatchState,
) -> Result<MatchOutcome<'t>, RegexError> {
    check_start(input, start)?;
    state.reset(start);
    attempt_at(graph, input, start, state)
}

/// One attempt at `start` with registers already cleared.
fn attempt_at<'t>(
    graph: &Graph,
    input: &'t str,
    start: usize,
    state: &mut MatchState,
) -> Result<MatchOutcome<'t>, RegexError> {
    let end = graph.attempt(graph.entry(), start, input, state);
    if let Some(err) = state.take_halt() {
        return Err(err);
    }
    let outcome = match end {
        Some(end) => {
            state.set_group(0, Some(start), Some(end));
            MatchOutcome::Matched(Captures::from_state(input, state))
        }
        None => MatchOutcome::NoMatch,
    };
    log::trace!("match at {}: {:?}", start, outcome.captures().map(|c| c.range()));
    Ok(outcome)
}

/// First match of `graph` in `input` starting at or after `start`.
///
/// ```
/// use ferrule::prelude::*;
///
/// let g = Graph::compile(&Expr::literal("needle")).unwrap();
/// let m = search(&g, "haystack with a needle", 0).unwrap();
/// assert_eq!(m.get_match().unwrap().start(), 16);
/// ```
pub fn search<'t>(
    graph: &Graph,
    input: &'t str,
    start: usize,
) -> Result<MatchOutcome<'t>, RegexError> {
    search_with(graph, input, start, &MatchOptions::default())
}

pub fn search_with<'t>(
    graph: &Graph,
    input: &'t str,
    start: usize,
    options: &MatchOptions,
) -> Result<MatchOutcome<'t>, RegexError> {
    check_start(input, start)?;
    let mut state = MatchState::with_options(graph, options);
    let bytes = input.as_bytes();
    let mut at = start;

    loop {
        if let Some(b) = graph.prefix_byte() {
            match memchr::memchr(b, &bytes[at..]) {
                Some(offset) => at += offset,
                None => break,
            }
        }
        state.reset_attempt(start);
        if let MatchOutcome::Matched(caps) = attempt_at(graph, input, at, &mut state)? {
            return Ok(MatchOutcome::Matched(caps));
        }
        match char_at(input, at) {
            Some(c) => at += c.len_utf8(),
            None => break,
        }
    }
    Ok(MatchOutcome::NoMatch)
}

impl Graph {
    /// Shorthand for [`run`] from position 0.
    pub fn run<'t>(&self, input: &'t str) -> Result<MatchOutcome<'t>, RegexError> {
        run(self, input, 0)
    }

    /// Whether the graph matches anywhere in `input`. Limit errors count as
    /// no match.
    pub fn is_match(&self, input: &str) -> bool {
        matches!(search(self, input, 0), Ok(MatchOutcome::Matched(_)))
    }
}
