use std::collections::HashMap;

use log::{debug, warn};

use super::{
    first_follow::{FirstSets, FollowSets},
    grammar::END_MARK_INDEX,
    Grammar,
};

/// A cell of the table that holds more than one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub non_terminal: usize,
    pub terminal: usize,
    /// Rule indices in insertion order; the first one wins when parsing.
    pub rules: Vec<usize>,
}

/// The LL(1) table: one row per non-terminal (start symbol first), one
/// column per terminal followed by `$`. Each cell lists rule indices in
/// the order they were inserted.
#[derive(Debug, Clone)]
pub struct LL1ParsingTable {
    pub(crate) non_terminals: Vec<usize>,
    pub(crate) terminals: Vec<usize>,
    cells: Vec<Vec<Vec<usize>>>,
    row_of: HashMap<usize, usize>,
    col_of: HashMap<usize, usize>,
}

impl LL1ParsingTable {
    pub fn build(g: &Grammar, first: &FirstSets, follow: &FollowSets) -> Self {
        let non_terminals: Vec<usize> = g.non_terminal_iter().collect();
        let terminals: Vec<usize> = g
            .terminals()
            .iter()
            .cloned()
            .chain(std::iter::once(END_MARK_INDEX))
            .collect();
        let row_of = index_map(&non_terminals);
        let col_of = index_map(&terminals);

        let mut cells = vec![vec![Vec::new(); terminals.len()]; non_terminals.len()];
        for rule in g.rules() {
            let row = match row_of.get(&rule.left) {
                Some(&row) => &mut cells[row],
                None => continue,
            };

            let (first_set, vanishes) = first.first_of_production(g, &rule.right);
            let lookaheads = first_set
                .iter()
                .chain(follow.get(rule.left).iter().filter(|_| vanishes));
            for col in lookaheads.filter_map(|t| col_of.get(t)) {
                row[*col].push(rule.index);
            }
        }

        let table = Self {
            non_terminals,
            terminals,
            cells,
            row_of,
            col_of,
        };
        debug!(
            "built LL(1) table with {} rows and {} columns",
            table.non_terminals.len(),
            table.terminals.len()
        );
        for conflict in table.conflicts() {
            warn!(
                "LL(1) conflict in {} for terminal {}: {:?}",
                g.get_symbol_name(conflict.non_terminal),
                g.get_symbol_name(conflict.terminal),
                conflict
                    .rules
                    .iter()
                    .map(|&r| g.rule_to_string(&g.rules()[r]))
                    .collect::<Vec<_>>()
            );
        }
        table
    }

    pub fn non_terminals(&self) -> &[usize] {
        &self.non_terminals
    }

    /// Column symbols: every terminal, then `$`.
    pub fn terminals(&self) -> &[usize] {
        &self.terminals
    }

    /// Rules in cell `(non_terminal, terminal)`; empty when either symbol
    /// has no row or column.
    pub fn get(&self, non_terminal: usize, terminal: usize) -> &[usize] {
        match (self.row_of.get(&non_terminal), self.col_of.get(&terminal)) {
            (Some(&row), Some(&col)) => &self.cells[row][col],
            _ => &[],
        }
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for (row, &non_terminal) in self.non_terminals.iter().enumerate() {
            for (col, &terminal) in self.terminals.iter().enumerate() {
                let rules = &self.cells[row][col];
                if rules.len() > 1 {
                    conflicts.push(Conflict {
                        non_terminal,
                        terminal,
                        rules: rules.clone(),
                    });
                }
            }
        }
        conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.cells.iter().flatten().all(|rules| rules.len() <= 1)
    }
}

pub(crate) fn index_map(symbols: &[usize]) -> HashMap<usize, usize> {
    symbols
        .iter()
        .enumerate()
        .map(|(i, &symbol)| (symbol, i))
        .collect()
}
