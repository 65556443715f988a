use std::{collections::HashMap, fmt};

use serde::Serialize;

use super::{
    first_follow::{FirstSets, FollowSets},
    grammar::END_MARK_INDEX,
    ll1_parsing_table::index_map,
    Grammar,
};

/// Panic-mode action for a `(non-terminal, token)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecoveryAction {
    /// The token is in FOLLOW(A): pop `A` as if it had matched.
    #[serde(rename = "EXT")]
    Extract,
    /// The token is in neither FIRST(A) nor FOLLOW(A): skip the token.
    #[serde(rename = "EP")]
    Explore,
    #[serde(rename = "-")]
    NoAction,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecoveryAction::Extract => "EXT",
            RecoveryAction::Explore => "EP",
            RecoveryAction::NoAction => "-",
        })
    }
}

/// Advisory panic-mode table, same shape as the LL(1) table. The parse
/// engine never consults it.
#[derive(Debug, Clone)]
pub struct ErrorRecoveryTable {
    pub(crate) non_terminals: Vec<usize>,
    pub(crate) terminals: Vec<usize>,
    cells: Vec<Vec<RecoveryAction>>,
    row_of: HashMap<usize, usize>,
    col_of: HashMap<usize, usize>,
}

impl ErrorRecoveryTable {
    pub fn build(g: &Grammar, first: &FirstSets, follow: &FollowSets) -> Self {
        let non_terminals: Vec<usize> = g.non_terminal_iter().collect();
        let mut terminals: Vec<usize> = g.terminals().to_vec();
        terminals.push(END_MARK_INDEX);

        let cells = non_terminals
            .iter()
            .map(|&a| {
                let (first_a, follow_a) = (first.get(a), follow.get(a));
                terminals
                    .iter()
                    .map(|t| {
                        if follow_a.contains(t) {
                            RecoveryAction::Extract
                        } else if !first_a.contains(t) {
                            RecoveryAction::Explore
                        } else {
                            RecoveryAction::NoAction
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            row_of: index_map(&non_terminals),
            col_of: index_map(&terminals),
            non_terminals,
            terminals,
            cells,
        }
    }

    pub fn non_terminals(&self) -> &[usize] {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &[usize] {
        &self.terminals
    }

    pub fn get(&self, non_terminal: usize, terminal: usize) -> Option<RecoveryAction> {
        let row = self.row_of.get(&non_terminal)?;
        let col = self.col_of.get(&terminal)?;
        Some(self.cells[*row][*col])
    }

    pub fn row(&self, non_terminal: usize) -> Option<&[RecoveryAction]> {
        self.row_of
            .get(&non_terminal)
            .map(|&row| self.cells[row].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recovery(grammar: &str) -> (Grammar, ErrorRecoveryTable) {
        let (g, _) = Grammar::parse(grammar);
        let first = FirstSets::compute(&g);
        let follow = FollowSets::compute(&g, &first);
        let table = ErrorRecoveryTable::build(&g, &first, &follow);
        (g, table)
    }

    #[test]
    fn expression_recovery() {
        let (g, table) = recovery("E -> T E'\nE' -> + T E' | ε\nT -> id");
        let row = |name| {
            table
                .row(g.get_symbol_index(name).unwrap())
                .unwrap()
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
        };

        // columns: + id $
        assert_eq!(row("E"), vec!["EP", "-", "EXT"]);
        assert_eq!(row("T"), vec!["EXT", "-", "EXT"]);
        assert_eq!(row("E'"), vec!["-", "EP", "EXT"]);
    }

    #[test]
    fn follow_wins_over_first() {
        let (g, table) = recovery("S -> A a\nA -> a | ε");
        let a = g.get_symbol_index("A").unwrap();
        let t = g.get_symbol_index("a").unwrap();
        assert_eq!(table.get(a, t), Some(RecoveryAction::Extract));
    }

    #[test]
    fn unknown_cell() {
        let (g, table) = recovery("S -> a");
        let a = g.get_symbol_index("a").unwrap();
        assert_eq!(table.get(a, a), None);
    }

    #[test]
    fn serializes_as_labels() {
        assert_eq!(
            serde_json::to_string(&RecoveryAction::Extract).unwrap(),
            "\"EXT\""
        );
        assert_eq!(
            serde_json::to_string(&RecoveryAction::NoAction).unwrap(),
            "\"-\""
        );
    }
}
