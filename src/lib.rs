extern crate wasm_bindgen;

use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

mod analyzer;
pub mod error;
pub mod grammar;
pub use analyzer::Analyzer;
pub use grammar::Grammar;

use grammar::{
    derivation_tree::DerivationTree,
    pretty_print::{ConflictOutput, GrammarInfo, TraceOutput},
};

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
}

#[derive(Serialize)]
struct GrammarInfoOutput {
    info: GrammarInfo,
    skipped: Vec<String>,
    conflicts: Vec<ConflictOutput>,
}

#[derive(Serialize)]
struct AnalyzeOutput {
    trace: TraceOutput,
    tree: Option<DerivationTree>,
}

#[wasm_bindgen]
pub fn grammar_info_to_json(grammar: &str) -> String {
    let analyzer = Analyzer::load(grammar);
    to_json(&GrammarInfoOutput {
        info: analyzer.grammar_info(),
        skipped: analyzer
            .skipped_lines()
            .iter()
            .map(|line| line.to_string())
            .collect(),
        conflicts: analyzer.conflicts(),
    })
}

#[wasm_bindgen]
pub fn parsing_table_to_json(grammar: &str) -> String {
    to_json(&Analyzer::load(grammar).parsing_table_output())
}

#[wasm_bindgen]
pub fn error_recovery_table_to_json(grammar: &str) -> String {
    to_json(&Analyzer::load(grammar).error_recovery_table_output())
}

#[wasm_bindgen]
pub fn analyze_string_to_json(grammar: &str, input: &str, max_steps: Option<u32>) -> String {
    let analyzer = Analyzer::load(grammar);
    let trace = analyzer.analyze_string_with_limit(input, max_steps.map(|n| n as usize));
    to_json(&AnalyzeOutput {
        trace: trace.to_output(analyzer.grammar()),
        tree: analyzer.derivation_tree(&trace),
    })
}


#[cfg(test)]
mod property_tests {
    use std::collections::BTreeSet;

    use proptest::{collection, prelude::*, sample::select};

    use crate::{
        grammar::{
            first_follow::FirstSets,
            grammar::{SymbolKind, END_MARK_INDEX, EPSILON_INDEX},
        },
        Analyzer,
    };

    const HEADS: [&str; 3] = ["S", "A", "B"];
    const SYMBOLS: [&str; 7] = ["S", "A", "B", "a", "b", "c", "ε"];
    const TOKENS: [&str; 3] = ["a", "b", "c"];

    fn arb_grammar() -> impl Strategy<Value = String> {
        let alternative = collection::vec(select(SYMBOLS.to_vec()), 1..4).prop_map(|s| s.join(" "));
        let line = (
            select(HEADS.to_vec()),
            collection::vec(alternative, 1..4),
        )
            .prop_map(|(head, alternatives)| format!("{} -> {}", head, alternatives.join(" | ")));
        collection::vec(line, 1..6).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        #[test]
        fn first_is_a_fixed_point(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            prop_assert_eq!(&FirstSets::compute(analyzer.grammar()), analyzer.first_sets());
        }

        #[test]
        fn first_of_terminal_is_itself(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            for &t in analyzer.grammar().terminals() {
                prop_assert_eq!(analyzer.first_sets().get(t), &BTreeSet::from([t]));
            }
        }

        #[test]
        fn end_mark_follows_start(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            let start = analyzer.grammar().start_symbol().unwrap();
            prop_assert!(analyzer.follow_sets().get(start).contains(&END_MARK_INDEX));
        }

        #[test]
        fn follow_propagates_through_vanishing_suffix(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            let g = analyzer.grammar();
            let (first, follow) = (analyzer.first_sets(), analyzer.follow_sets());
            for rule in g.rules() {
                for (i, &b) in rule.right.iter().enumerate() {
                    if g.kind(b) != SymbolKind::NonTerminal {
                        continue;
                    }
                    let (suffix_first, vanishes) =
                        first.first_of_production(g, &rule.right[i + 1..]);
                    prop_assert!(suffix_first.is_subset(follow.get(b)));
                    if vanishes {
                        prop_assert!(follow.get(rule.left).is_subset(follow.get(b)));
                    }
                }
            }
        }

        #[test]
        fn sets_hold_only_terminals_and_markers(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            let g = analyzer.grammar();
            for nt in g.non_terminal_iter() {
                for &s in analyzer.first_sets().get(nt) {
                    prop_assert!(s == EPSILON_INDEX || g.kind(s) == SymbolKind::Terminal);
                }
                for &s in analyzer.follow_sets().get(nt) {
                    prop_assert!(s == END_MARK_INDEX || g.kind(s) == SymbolKind::Terminal);
                }
            }
        }

        #[test]
        fn ll1_iff_no_cell_has_two_rules(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            let table = analyzer.parsing_table();
            let crowded = table.non_terminals().iter().any(|&nt| {
                table.terminals().iter().any(|&t| table.get(nt, t).len() > 1)
            });
            prop_assert_eq!(analyzer.is_ll1(), !crowded);
            prop_assert_eq!(analyzer.conflicts().is_empty(), !crowded);
        }

        #[test]
        fn recovery_cells_follow_first_and_follow(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            let g = analyzer.grammar();
            let output = analyzer.error_recovery_table_output();
            for (row, nt) in g.non_terminal_iter().enumerate() {
                let first = analyzer.first_sets().get(nt);
                let follow = analyzer.follow_sets().get(nt);
                for (col, &t) in analyzer.error_recovery_table().terminals().iter().enumerate() {
                    let expected = if follow.contains(&t) {
                        "EXT"
                    } else if !first.contains(&t) {
                        "EP"
                    } else {
                        "-"
                    };
                    prop_assert_eq!(output.rows[row].1[col].as_str(), expected);
                }
            }
        }

        #[test]
        fn headers_are_terminals_then_end_mark(text in arb_grammar()) {
            let analyzer = Analyzer::load(&text);
            let mut expected: Vec<String> =
                analyzer.grammar().terminal_iter().map(str::to_string).collect();
            expected.push("$".to_string());
            prop_assert_eq!(&analyzer.parsing_table_output().header, &expected);
            prop_assert_eq!(&analyzer.error_recovery_table_output().header, &expected);
        }

        #[test]
        fn bounded_parse_always_returns(
            text in arb_grammar(),
            input in collection::vec(select(TOKENS.to_vec()), 0..5),
        ) {
            let analyzer = Analyzer::load(&text);
            let trace = analyzer.analyze_string_with_limit(&input.join(" "), Some(200));
            prop_assert!(trace.steps.len() <= 200);
            if trace.accepted() {
                let tree = analyzer.derivation_tree(&trace);
                prop_assert!(tree.is_some());
            }
        }
    }
}
