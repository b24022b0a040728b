// global_limits.rs - Process-wide limit settings.
//
// Kept in its own test binary: the setters change state every other test
// in the same process would observe.

use ferrule::exec::{
    get_match_stack_limit, get_retry_limit_in_match, get_retry_limit_in_search, get_time_limit,
    set_match_stack_limit, set_retry_limit_in_match, set_retry_limit_in_search, set_time_limit,
    DEFAULT_MATCH_STACK_LIMIT, DEFAULT_RETRY_LIMIT_IN_MATCH, DEFAULT_RETRY_LIMIT_IN_SEARCH,
    DEFAULT_TIME_LIMIT_MSEC,
};
use ferrule::prelude::*;

fn runaway() -> Graph {
    // (?:a|a)*b
    Graph::compile(&Expr::concat([
        Expr::star(Expr::non_capture(Expr::alternation([
            Expr::literal("a"),
            Expr::literal("a"),
        ]))),
        Expr::literal("b"),
    ]))
    .unwrap()
}

#[test]
fn defaults_setters_and_snapshot() {
    assert_eq!(get_retry_limit_in_match(), DEFAULT_RETRY_LIMIT_IN_MATCH);
    assert_eq!(get_retry_limit_in_search(), DEFAULT_RETRY_LIMIT_IN_SEARCH);
    assert_eq!(get_time_limit(), DEFAULT_TIME_LIMIT_MSEC);
    assert_eq!(get_match_stack_limit(), DEFAULT_MATCH_STACK_LIMIT);

    let g = runaway();
    let input = "a".repeat(40);

    set_retry_limit_in_match(5_000);
    assert_eq!(get_retry_limit_in_match(), 5_000);
    assert_eq!(run(&g, &input, 0).unwrap_err(), RegexError::RetryLimitInMatchOver);

    // Options built before a change keep the values they captured.
    let captured = MatchOptions::default();
    set_retry_limit_in_match(0);
    set_retry_limit_in_search(5_000);
    assert_eq!(get_retry_limit_in_search(), 5_000);
    assert_eq!(
        run_with(&g, &input, 0, &captured).unwrap_err(),
        RegexError::RetryLimitInMatchOver
    );
    assert_eq!(search(&g, &input, 0).unwrap_err(), RegexError::RetryLimitInSearchOver);

    set_retry_limit_in_search(0);
    set_time_limit(1);
    assert_eq!(get_time_limit(), 1);
    assert_eq!(run(&g, &input, 0).unwrap_err(), RegexError::TimeLimitOver);

    set_time_limit(DEFAULT_TIME_LIMIT_MSEC);
    set_match_stack_limit(16);
    assert_eq!(get_match_stack_limit(), 16);
    assert_eq!(run(&g, &input, 0).unwrap_err(), RegexError::MatchStackLimitOver);

    set_match_stack_limit(DEFAULT_MATCH_STACK_LIMIT);
    set_retry_limit_in_match(DEFAULT_RETRY_LIMIT_IN_MATCH);
    set_retry_limit_in_search(DEFAULT_RETRY_LIMIT_IN_SEARCH);
    set_time_limit(DEFAULT_TIME_LIMIT_MSEC);

    // Ordinary patterns are unaffected by the defaults.
    let g = Graph::compile(&Expr::literal("b")).unwrap();
    assert!(search(&g, "aab", 0).unwrap().is_match());
}
