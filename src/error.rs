// error.rs - Error types for Ferrule.
//
// Node-level failure is not an error (it is the `None` return of
// `Graph::attempt`). Errors come from exactly two places: graph
// construction, and the driver when a start position is bad or a
// limit/abort check halts an attempt.

use std::fmt;

/// Error type for graph construction and matching operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Back reference to a capture group the expression does not define.
    InvalidBackReference { group: usize },
    /// Quantifier whose lower bound exceeds its upper bound.
    InvalidRepeatRange { min: u32, max: u32 },
    /// Alternation with no branches.
    EmptyAlternation,
    /// Start position outside the input or not on a character boundary.
    InvalidStartPosition { position: usize },
    /// Nesting of node attempts exceeded the match-stack limit.
    MatchStackLimitOver,
    /// Retry limit in match exceeded.
    RetryLimitInMatchOver,
    /// Retry limit in search exceeded.
    RetryLimitInSearchOver,
    /// Time limit exceeded.
    TimeLimitOver,
    /// The caller's cancellation flag was raised.
    Aborted,
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexError::InvalidBackReference { group } => {
                write!(f, "invalid backref number/name: group {}", group)
            }
            RegexError::InvalidRepeatRange { min, max } => {
                write!(f, "upper bound {} is smaller than lower bound {} in repeat range", max, min)
            }
            RegexError::EmptyAlternation => write!(f, "alternation without branches"),
            RegexError::InvalidStartPosition { position } => {
                write!(f, "invalid start position {}", position)
            }
            RegexError::MatchStackLimitOver => write!(f, "match-stack limit over"),
            RegexError::RetryLimitInMatchOver => write!(f, "retry-limit-in-match over"),
            RegexError::RetryLimitInSearchOver => write!(f, "retry-limit-in-search over"),
            RegexError::TimeLimitOver => write!(f, "time limit over"),
            RegexError::Aborted => write!(f, "match aborted"),
        }
    }
}

impl std::error::Error for RegexError {}

impl RegexError {
    /// Returns `true` for errors raised while matching rather than while
    /// building a graph.
    pub fn is_match_time(&self) -> bool {
        matches!(
            self,
            RegexError::InvalidStartPosition { .. }
                | RegexError::MatchStackLimitOver
                | RegexError::RetryLimitInMatchOver
                | RegexError::RetryLimitInSearchOver
                | RegexError::TimeLimitOver
                | RegexError::Aborted
        )
    }
}
