use std::collections::BTreeSet;

use log::debug;

use super::{
    grammar::{SymbolKind, END_MARK_INDEX, EPSILON_INDEX},
    Grammar,
};

/// FIRST(X) for every symbol of a [`Grammar`], indexed by symbol.
///
/// Terminal sets hold the terminal itself; non-terminal sets hold terminals
/// and possibly `ε`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    sets: Vec<BTreeSet<usize>>,
}

impl FirstSets {
    pub fn compute(g: &Grammar) -> Self {
        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); g.symbols().len()];
        for symbol in g.symbols() {
            if symbol.kind != SymbolKind::NonTerminal {
                sets[symbol.index].insert(symbol.index);
            }
        }

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for rule in g.rules() {
                let mut first: BTreeSet<usize> = BTreeSet::new();
                if rule.is_epsilon() {
                    first.insert(EPSILON_INDEX);
                } else {
                    let mut vanishes = true;
                    for &symbol in &rule.right {
                        match g.kind(symbol) {
                            SymbolKind::NonTerminal => {
                                first.extend(
                                    sets[symbol].iter().filter(|&&s| s != EPSILON_INDEX),
                                );
                                if !sets[symbol].contains(&EPSILON_INDEX) {
                                    vanishes = false;
                                    break;
                                }
                            }
                            _ => {
                                first.insert(symbol);
                                vanishes = false;
                                break;
                            }
                        }
                    }
                    if vanishes {
                        first.insert(EPSILON_INDEX);
                    }
                }

                let target = &mut sets[rule.left];
                let len = target.len();
                target.extend(first);
                if target.len() != len {
                    changed = true;
                }
            }
        }
        debug!("FIRST sets converged after {} passes", passes);

        Self { sets }
    }

    pub fn get(&self, symbol: usize) -> &BTreeSet<usize> {
        &self.sets[symbol]
    }

    pub fn nullable(&self, symbol: usize) -> bool {
        self.sets[symbol].contains(&EPSILON_INDEX)
    }

    /// FIRST of a symbol sequence without `ε`, and whether the whole
    /// sequence can vanish. An empty sequence vanishes trivially.
    pub fn first_of_production(
        &self,
        g: &Grammar,
        production: &[usize],
    ) -> (BTreeSet<usize>, bool) {
        let mut first: BTreeSet<usize> = BTreeSet::new();
        for &symbol in production {
            match g.kind(symbol) {
                SymbolKind::Epsilon => continue,
                SymbolKind::Terminal | SymbolKind::EndMarker => {
                    first.insert(symbol);
                    return (first, false);
                }
                SymbolKind::NonTerminal => {
                    first.extend(self.sets[symbol].iter().filter(|&&s| s != EPSILON_INDEX));
                    if !self.nullable(symbol) {
                        return (first, false);
                    }
                }
            }
        }
        (first, true)
    }
}

/// FOLLOW(A) for every non-terminal of a [`Grammar`], indexed by symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    sets: Vec<BTreeSet<usize>>,
}

impl FollowSets {
    pub fn compute(g: &Grammar, first: &FirstSets) -> Self {
        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); g.symbols().len()];
        if let Some(start) = g.start_symbol() {
            sets[start].insert(END_MARK_INDEX);
        }

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for rule in g.rules() {
                for (i, &b) in rule.right.iter().enumerate() {
                    if !g.is_non_terminal(b) {
                        continue;
                    }
                    let (mut follow, vanishes) = first.first_of_production(g, &rule.right[i + 1..]);
                    if vanishes {
                        follow.extend(sets[rule.left].iter().cloned());
                    }

                    let len = sets[b].len();
                    sets[b].extend(follow);
                    if sets[b].len() != len {
                        changed = true;
                    }
                }
            }
        }
        debug!("FOLLOW sets converged after {} passes", passes);

        Self { sets }
    }

    pub fn get(&self, non_terminal: usize) -> &BTreeSet<usize> {
        &self.sets[non_terminal]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(g: &Grammar, set: &BTreeSet<usize>) -> Vec<String> {
        let mut names: Vec<String> = set
            .iter()
            .map(|&i| g.get_symbol_name(i).to_string())
            .collect();
        names.sort();
        names
    }

    fn sets(grammar: &str) -> (Grammar, FirstSets, FollowSets) {
        let (g, _) = Grammar::parse(grammar);
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);
        (g, first, follow)
    }

    const EXPR: &str = "E -> T E'\n\
                        E' -> + T E' | ε\n\
                        T -> F T'\n\
                        T' -> * F T' | ε\n\
                        F -> ( E ) | id";

    #[test]
    fn expression_first() {
        let (g, first, _) = sets(EXPR);
        let idx = |name| g.get_symbol_index(name).unwrap();

        assert_eq!(names(&g, first.get(idx("E"))), vec!["(", "id"]);
        assert_eq!(names(&g, first.get(idx("T"))), vec!["(", "id"]);
        assert_eq!(names(&g, first.get(idx("F"))), vec!["(", "id"]);
        assert_eq!(names(&g, first.get(idx("E'"))), vec!["+", "ε"]);
        assert_eq!(names(&g, first.get(idx("T'"))), vec!["*", "ε"]);
        assert_eq!(names(&g, first.get(idx("id"))), vec!["id"]);
    }

    #[test]
    fn expression_follow() {
        let (g, _, follow) = sets(EXPR);
        let idx = |name| g.get_symbol_index(name).unwrap();

        assert_eq!(names(&g, follow.get(idx("E"))), vec!["$", ")"]);
        assert_eq!(names(&g, follow.get(idx("E'"))), vec!["$", ")"]);
        assert_eq!(names(&g, follow.get(idx("T"))), vec!["$", ")", "+"]);
        assert_eq!(names(&g, follow.get(idx("T'"))), vec!["$", ")", "+"]);
        assert_eq!(names(&g, follow.get(idx("F"))), vec!["$", ")", "*", "+"]);
    }

    #[test]
    fn nullable_chain() {
        let (g, first, follow) = sets("S -> A B c\nA -> a | ε\nB -> b | ε");
        let idx = |name| g.get_symbol_index(name).unwrap();

        assert_eq!(names(&g, first.get(idx("S"))), vec!["a", "b", "c"]);
        assert!(!first.nullable(idx("S")));
        assert_eq!(names(&g, follow.get(idx("A"))), vec!["b", "c"]);
        assert_eq!(names(&g, follow.get(idx("B"))), vec!["c"]);
    }

    #[test]
    fn whole_production_vanishes() {
        let (g, first, follow) = sets("S -> A B\nA -> a | ε\nB -> ε");
        let idx = |name| g.get_symbol_index(name).unwrap();

        assert_eq!(names(&g, first.get(idx("S"))), vec!["a", "ε"]);
        assert_eq!(names(&g, follow.get(idx("A"))), vec!["$"]);
        assert_eq!(names(&g, follow.get(idx("B"))), vec!["$"]);
    }

    #[test]
    fn repeated_occurrences_are_all_visited() {
        let (g, _, follow) = sets("S -> A a A b");
        let a = g.get_symbol_index("A").unwrap();
        assert_eq!(names(&g, follow.get(a)), vec!["a", "b"]);
    }

    #[test]
    fn empty_grammar_has_no_sets() {
        let (g, first, follow) = sets("");
        assert_eq!(g.start_symbol(), None);
        assert!(first.get(EPSILON_INDEX).contains(&EPSILON_INDEX));
        assert!(follow.get(END_MARK_INDEX).is_empty());
    }

    #[test]
    fn first_is_idempotent() {
        let (g, first, _) = sets(EXPR);
        assert_eq!(FirstSets::compute(&g), first);
    }
}
