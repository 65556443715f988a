use std::collections::HashSet;

use log::warn;

use super::{
    grammar::{classify, Rule, SymbolKind, EPSILON_INDEX},
    Grammar, END_MARK, EPSILON,
};
use crate::error::{SkipReason, SkippedLine};

const ARROWS: [&str; 2] = ["->", "→"];

fn split_rule_line(line: &str) -> Result<(&str, &str), SkipReason> {
    let (left, right) = ARROWS
        .iter()
        .find_map(|&arrow| line.split_once(arrow))
        .ok_or(SkipReason::MissingArrow)?;

    let left = left.trim();
    if left.is_empty() {
        Err(SkipReason::EmptyLeftSide)
    } else if left.split_whitespace().count() != 1 {
        Err(SkipReason::LeftSideContainsWhitespace)
    } else if left == EPSILON || left == END_MARK {
        Err(SkipReason::ReservedLeftSide(left.to_string()))
    } else {
        Ok((left, right.trim()))
    }
}

impl Grammar {
    /// Loads a grammar, one rule per line: `A -> x B | ε`.
    ///
    /// Blank lines are ignored. Lines that cannot be read as a rule are
    /// reported in the returned list and otherwise left out; loading never
    /// fails, and an empty text yields a grammar without a start symbol.
    pub fn parse(grammar: &str) -> (Self, Vec<SkippedLine>) {
        let mut g = Self::new();
        let mut skipped: Vec<SkippedLine> = Vec::new();

        let mut raw_rules: Vec<(&str, &str)> = Vec::new();
        for (i, line) in grammar.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match split_rule_line(line) {
                Ok(rule) => raw_rules.push(rule),
                Err(reason) => {
                    let line = SkippedLine {
                        line: i + 1,
                        content: line.to_string(),
                        reason,
                    };
                    warn!("skipping {}", line);
                    skipped.push(line);
                }
            }
        }

        // Any symbol defined by a rule is a non-terminal, whatever its case.
        let heads: HashSet<&str> = raw_rules.iter().map(|(left, _)| *left).collect();

        if let Some((start, _)) = raw_rules.first() {
            g.start_symbol = Some(g.add_symbol(start, SymbolKind::NonTerminal));
        }

        for (left, rights) in raw_rules {
            let left = g.intern(left, SymbolKind::NonTerminal);
            for right in rights.split('|') {
                let symbols: Vec<usize> = right
                    .split_whitespace()
                    .filter(|&s| s != EPSILON)
                    .map(|s| {
                        let kind = if heads.contains(s) {
                            SymbolKind::NonTerminal
                        } else {
                            classify(s)
                        };
                        g.intern(s, kind)
                    })
                    .collect();

                let right = if symbols.is_empty() {
                    vec![EPSILON_INDEX]
                } else {
                    symbols
                };
                let index = g.rules.len();
                g.rules.push(Rule { index, left, right });
            }
        }

        (g, skipped)
    }
}
