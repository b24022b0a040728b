// engine_test.rs - Engine-wide properties: rollback on failure, capture
// bounds, repeatability, state reuse and sharing a graph across threads.

use ferrule::prelude::*;

fn lit(s: &str) -> Expr {
    Expr::literal(s)
}

/// Patterns paired with an input they match and one they do not.
fn corpus() -> Vec<(Expr, &'static str, &'static str)> {
    vec![
        // (?>(a)|ab)c
        (
            Expr::concat([
                Expr::atomic(Expr::alternation([Expr::capture(lit("a")), lit("ab")])),
                lit("c"),
            ]),
            "ac",
            "abc",
        ),
        // (a|ab)*c
        (
            Expr::concat([
                Expr::star(Expr::capture(Expr::alternation([lit("a"), lit("ab")]))),
                lit("c"),
            ]),
            "aabc",
            "aab",
        ),
        // (\d+)px
        (
            Expr::concat([Expr::capture(Expr::plus(Expr::class(CharClass::digit()))), lit("px")]),
            "12px",
            "12pt",
        ),
        // (?=(ab))a
        (
            Expr::concat([Expr::group(GroupKind::LookAhead, Expr::capture(lit("ab"))), lit("a")]),
            "ab",
            "ac",
        ),
        // (?!x)(\w)
        (
            Expr::concat([
                Expr::group(GroupKind::NegativeLookAhead, lit("x")),
                Expr::capture(Expr::class(CharClass::word())),
            ]),
            "a",
            "x",
        ),
        // (a|b)++c
        (
            Expr::concat([
                Expr::repeat(
                    Expr::capture(Expr::alternation([lit("a"), lit("b")])),
                    1,
                    None,
                    RepeatKind::Possessive,
                ),
                lit("c"),
            ]),
            "abc",
            "abb",
        ),
        // ((a)|b){2,3}?(\2)
        (
            Expr::concat([
                Expr::repeat(
                    Expr::capture(Expr::alternation([Expr::capture(lit("a")), lit("b")])),
                    2,
                    Some(3),
                    RepeatKind::Reluctant,
                ),
                Expr::capture(Expr::backref(2)),
            ]),
            "baa",
            "bbb",
        ),
    ]
}

fn boundaries(input: &str) -> impl Iterator<Item = usize> + '_ {
    (0..=input.len()).filter(move |&i| input.is_char_boundary(i))
}

#[test]
fn failed_attempt_leaves_state_untouched() {
    for (expr, good, bad) in corpus() {
        let g = Graph::compile(&expr).unwrap();
        let mut st = MatchState::new(&g);

        // Leave non-default values in the registers first.
        assert!(
            g.attempt(g.entry(), 0, good, &mut st).is_some(),
            "{:?} should match {:?}",
            expr,
            good
        );

        for pos in boundaries(bad) {
            let before = st.snapshot();
            let r = g.attempt(g.entry(), pos, bad, &mut st);
            if r.is_none() {
                assert_eq!(
                    st.snapshot(),
                    before,
                    "registers changed by failed attempt of {:?} on {:?} at {}",
                    expr,
                    bad,
                    pos
                );
            } else {
                st.restore(&before);
            }
        }
    }
}

#[test]
fn bad_inputs_do_not_match_anchored() {
    for (expr, good, bad) in corpus() {
        let g = Graph::compile(&expr).unwrap();
        assert!(run(&g, good, 0).unwrap().is_match(), "{:?} on {:?}", expr, good);
        assert!(!run(&g, bad, 0).unwrap().is_match(), "{:?} on {:?}", expr, bad);
    }
}

#[test]
fn group_bounds_lie_within_input() {
    let inputs = ["", "ac", "aabc", "12px", "ab ab", "abcabc", "baa", "x1 y22 z333"];
    for (expr, ..) in corpus() {
        let g = Graph::compile(&expr).unwrap();
        for input in inputs {
            for start in boundaries(input) {
                let out = run(&g, input, start).unwrap();
                let Some(caps) = out.captures() else { continue };
                assert_eq!(caps.len(), g.captures_len() + 1);
                for m in caps.iter().flatten() {
                    assert!(m.start() <= m.end(), "{:?} on {:?}", expr, input);
                    assert!(m.end() <= input.len(), "{:?} on {:?}", expr, input);
                }
            }
        }
    }
}

#[test]
fn runs_are_repeatable() {
    let inputs = ["aabc", "abc", "12px", "xx12px", "ab", "baa", "abb"];
    for (expr, ..) in corpus() {
        let g = Graph::compile(&expr).unwrap();
        for input in inputs {
            let first = search(&g, input, 0).unwrap();
            let second = search(&g, input, 0).unwrap();
            assert_eq!(first, second, "{:?} on {:?}", expr, input);
        }
    }
}

#[test]
fn reused_state_matches_fresh_state() {
    let inputs = ["aabc", "aab", "12px", "ac", "abc", "baa", "bbb", ""];
    for (expr, ..) in corpus() {
        let g = Graph::compile(&expr).unwrap();
        let mut st = MatchState::new(&g);
        for input in inputs {
            let reused = match_at(&g, input, 0, &mut st).unwrap();
            let fresh = run(&g, input, 0).unwrap();
            assert_eq!(reused, fresh, "{:?} on {:?}", expr, input);
        }
    }
}

#[test]
fn reused_state_gets_fresh_budget_per_match() {
    // (?:a|b)*
    let g = Graph::compile(&Expr::star(Expr::non_capture(Expr::alternation([
        lit("a"),
        lit("b"),
    ]))))
    .unwrap();

    let opts = MatchOptions::default().retry_limit_in_search(20);
    let mut st = MatchState::with_options(&g, &opts);
    for i in 0..1_000 {
        let out = match_at(&g, "b", 0, &mut st)
            .unwrap_or_else(|e| panic!("call {} failed: {}", i, e));
        assert_eq!(out.get_match().unwrap().range(), 0..1);
    }

    let opts = MatchOptions::default().time_limit(1);
    let mut st = MatchState::with_options(&g, &opts);
    for i in 0..2_000 {
        if i == 1_000 {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let out = match_at(&g, "b", 0, &mut st)
            .unwrap_or_else(|e| panic!("call {} failed: {}", i, e));
        assert!(out.is_match());
    }
}

#[test]
fn long_input_reports_stack_limit_instead_of_overflowing() {
    // (?:a|b)*c
    let g = Graph::compile(&Expr::concat([
        Expr::star(Expr::non_capture(Expr::alternation([lit("a"), lit("b")]))),
        lit("c"),
    ]))
    .unwrap();
    let input = format!("{}c", "ab".repeat(2_500));
    assert_eq!(run(&g, &input, 0).unwrap_err(), RegexError::MatchStackLimitOver);
    assert!(!g.is_match(&input));

    // Greedy single-leaf loops iterate in place and are not limited.
    let g = Graph::compile(&Expr::concat([
        Expr::star(Expr::class(CharClass::new().with_range('a', 'b'))),
        lit("c"),
    ]))
    .unwrap();
    assert_eq!(run(&g, &input, 0).unwrap().get_match().unwrap().end(), 5_001);
}

#[test]
fn graph_links_stay_in_arena() {
    for (expr, ..) in corpus() {
        let g = Graph::compile(&expr).unwrap();
        assert!(matches!(g.node(NodeId::SUCCEED), Node::Succeed));
        for (id, node) in g.nodes() {
            if let Some(next) = node.next() {
                assert!(next.index() < g.len(), "{:?} at {:?}", node, id);
            }
            if let Node::RepeatTail { owner } = node {
                assert!(matches!(g.node(*owner), Node::Repeat { .. }));
            }
        }
    }
}

#[test]
fn shared_graph_across_threads() {
    // ((\w+)@(\w+))
    let g = Graph::compile(&Expr::capture(Expr::concat([
        Expr::capture(Expr::plus(Expr::class(CharClass::word()))),
        lit("@"),
        Expr::capture(Expr::plus(Expr::class(CharClass::word()))),
    ])))
    .unwrap();
    let inputs: Vec<String> = (0..64).map(|i| format!("mail user{}@host{} now", i, i * 7)).collect();
    let expected: Vec<_> = inputs
        .iter()
        .map(|s| {
            let out = search(&g, s, 0).unwrap();
            let caps = out.captures().unwrap();
            (caps.get(2).unwrap().range(), caps.get(3).unwrap().range())
        })
        .collect();

    std::thread::scope(|scope| {
        for t in 0..4 {
            let (g, inputs, expected) = (&g, &inputs, &expected);
            scope.spawn(move || {
                for (i, input) in inputs.iter().enumerate().skip(t) {
                    let out = search(g, input, 0).unwrap();
                    let caps = out.captures().unwrap();
                    let got = (caps.get(2).unwrap().range(), caps.get(3).unwrap().range());
                    assert_eq!(got, expected[i]);
                }
            });
        }
    });
}

#[test]
fn time_limit_stops_runaway_match() {
    // (?:a|a)*b
    let g = Graph::compile(&Expr::concat([
        Expr::star(Expr::non_capture(Expr::alternation([lit("a"), lit("a")]))),
        lit("b"),
    ]))
    .unwrap();
    let input = "a".repeat(64);
    let opts = MatchOptions::default().retry_limit_in_match(0).time_limit(1);
    let err = run_with(&g, &input, 0, &opts).unwrap_err();
    assert_eq!(err, RegexError::TimeLimitOver);
    assert!(err.is_match_time());
}
