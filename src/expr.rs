// expr.rs - Expression tree accepted by the graph builder.
//
// This is the hand-off point from a pattern parser: an already-parsed tree
// with no textual syntax left in it. `Graph::compile` lowers it into the
// node arena.

use crate::leaf::{Anchor, CharClass};

/// Kind of a parenthesised group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `( ... )`, numbered by the position of its opening parenthesis.
    Capture,
    /// `(?: ... )`
    NonCapture,
    /// `(?> ... )`, commits to the first branch that matches.
    Atomic,
    /// `(?= ... )`
    LookAhead,
    /// `(?! ... )`
    NegativeLookAhead,
}

/// Backtracking preference of a quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    /// Most iterations first.
    Greedy,
    /// Fewest iterations first.
    Reluctant,
    /// Most iterations, never given back.
    Possessive,
}

/// A parsed regular expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Matches the empty string.
    Empty,
    Literal {
        text: String,
        ignore_case: bool,
    },
    Class(CharClass),
    Anchor(Anchor),
    /// `\N`: the text last captured by group `group`.
    BackRef {
        group: usize,
        ignore_case: bool,
    },
    Concat(Vec<Expr>),
    Alternation(Vec<Expr>),
    Group {
        kind: GroupKind,
        body: Box<Expr>,
    },
    /// `body{min,max}`; `max: None` is unbounded.
    Repeat {
        body: Box<Expr>,
        min: u32,
        max: Option<u32>,
        kind: RepeatKind,
    },
}

impl Expr {
    pub fn literal(text: &str) -> Expr {
        Expr::Literal {
            text: text.to_string(),
            ignore_case: false,
        }
    }

    pub fn literal_no_case(text: &str) -> Expr {
        Expr::Literal {
            text: text.to_string(),
            ignore_case: true,
        }
    }

    pub fn class(class: CharClass) -> Expr {
        Expr::Class(class)
    }

    /// `.`; `dot_all` also matches `\n`.
    pub fn any(dot_all: bool) -> Expr {
        Expr::Class(CharClass::any(dot_all))
    }

    pub fn anchor(anchor: Anchor) -> Expr {
        Expr::Anchor(anchor)
    }

    pub fn backref(group: usize) -> Expr {
        Expr::BackRef {
            group,
            ignore_case: false,
        }
    }

    pub fn concat(items: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Concat(items.into_iter().collect())
    }

    pub fn alternation(branches: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Alternation(branches.into_iter().collect())
    }

    pub fn group(kind: GroupKind, body: Expr) -> Expr {
        Expr::Group {
            kind,
            body: Box::new(body),
        }
    }

    pub fn capture(body: Expr) -> Expr {
        Self::group(GroupKind::Capture, body)
    }

    pub fn non_capture(body: Expr) -> Expr {
        Self::group(GroupKind::NonCapture, body)
    }

    pub fn atomic(body: Expr) -> Expr {
        Self::group(GroupKind::Atomic, body)
    }

    pub fn repeat(body: Expr, min: u32, max: Option<u32>, kind: RepeatKind) -> Expr {
        Expr::Repeat {
            body: Box::new(body),
            min,
            max,
            kind,
        }
    }

    /// `body*`
    pub fn star(body: Expr) -> Expr {
        Self::repeat(body, 0, None, RepeatKind::Greedy)
    }

    /// `body+`
    pub fn plus(body: Expr) -> Expr {
        Self::repeat(body, 1, None, RepeatKind::Greedy)
    }

    /// `body?`
    pub fn optional(body: Expr) -> Expr {
        Self::repeat(body, 0, Some(1), RepeatKind::Greedy)
    }

    /// Number of capturing groups in this subtree.
    pub fn capture_count(&self) -> usize {
        match self {
            Expr::Empty
            | Expr::Literal { .. }
            | Expr::Class(_)
            | Expr::Anchor(_)
            | Expr::BackRef { .. } => 0,
            Expr::Concat(items) | Expr::Alternation(items) => {
                items.iter().map(Expr::capture_count).sum()
            }
            Expr::Group { kind, body } => {
                body.capture_count() + usize::from(*kind == GroupKind::Capture)
            }
            Expr::Repeat { body, .. } => body.capture_count(),
        }
    }

    /// Whether a quantifier over this expression can iterate locally,
    /// without a body chain: a single non-empty literal or a class.
    pub(crate) fn is_simple_leaf(&self) -> bool {
        match self {
            Expr::Literal { text, .. } => !text.is_empty(),
            Expr::Class(_) => true,
            _ => false,
        }
    }
}
