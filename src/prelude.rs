// prelude.rs - Convenient re-exports.
//
//! # Prelude
//!
//! ```
//! use ferrule::prelude::*;
//!
//! let g = Graph::compile(&Expr::plus(Expr::class(CharClass::digit()))).unwrap();
//! let m = search(&g, "answer: 42", 0).unwrap();
//! assert_eq!(m.get_match().unwrap().as_str(), "42");
//! ```

pub use crate::error::RegexError;
pub use crate::exec::{match_at, run, run_with, search, search_with, MatchOptions};
pub use crate::expr::{Expr, GroupKind, RepeatKind};
pub use crate::graph::Graph;
pub use crate::leaf::{Anchor, CharClass, PerlClass};
pub use crate::node::{Node, NodeId};
pub use crate::outcome::{Captures, Match, MatchOutcome};
pub use crate::state::MatchState;
