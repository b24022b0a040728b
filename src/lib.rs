//! # Ferrule
//!
//! Backtracking regex matching engine built as a graph of cooperating match
//! nodes. Each node knows its continuation (the node that runs after it
//! succeeds); choice points (alternation, quantifiers, atomic groups) retry
//! their own children when something downstream fails.
//!
//! Pattern parsing is not part of this crate: a parser hands over an
//! [`Expr`](expr::Expr) tree, [`Graph::compile`](graph::Graph::compile)
//! wires it into an immutable arena, and the driver in [`exec`] runs it
//! with a fresh [`MatchState`](state::MatchState) per attempt.
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrule::prelude::*;
//!
//! // (?>a|ab)c never matches "abc": the atomic group commits to "a".
//! let atomic = Graph::compile(&Expr::concat([
//!     Expr::atomic(Expr::alternation([Expr::literal("a"), Expr::literal("ab")])),
//!     Expr::literal("c"),
//! ])).unwrap();
//! assert!(!run(&atomic, "abc", 0).unwrap().is_match());
//!
//! // (?:a|ab)c backtracks into the second branch.
//! let plain = Graph::compile(&Expr::concat([
//!     Expr::non_capture(Expr::alternation([Expr::literal("a"), Expr::literal("ab")])),
//!     Expr::literal("c"),
//! ])).unwrap();
//! assert_eq!(run(&plain, "abc", 0).unwrap().get_match().unwrap().as_str(), "abc");
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`expr`] | Parsed expression tree handed to the builder |
//! | [`graph`] | Node arena and Expr-to-graph lowering |
//! | [`node`] | Node kinds and the `attempt` dispatcher |
//! | [`leaf`] | Literal, character class, anchor, back reference |
//! | `group` | Alternation, capturing and non-capturing groups |
//! | `quantifier` | Greedy/reluctant repetition, non-progress rule |
//! | `atomic` | Atomic groups and lookahead |
//! | [`state`] | Per-attempt registers and retry/time budget |
//! | [`exec`] | `run`, `search`, process-wide limits |
//! | [`outcome`] | `MatchOutcome`, `Captures`, `Match` |
//! | [`error`] | `RegexError` |

mod atomic;
mod group;
mod quantifier;

pub mod error;
pub mod exec;
pub mod expr;
pub mod graph;
pub mod leaf;
pub mod node;
pub mod outcome;
pub mod prelude;
pub mod state;
