use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{END_MARK, EPSILON};

/// Index of the epsilon symbol in every [`Grammar`].
pub const EPSILON_INDEX: usize = 0;
/// Index of the end-of-input marker in every [`Grammar`].
pub const END_MARK_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    Epsilon,
    EndMarker,
}

/// Classifies a token that is not the left side of any rule.
///
/// A token is a non-terminal when it is fully upper-case (`E`, `E'`, `ID2`)
/// or when it starts with an upper-case letter and is longer than one
/// character (`Expr`). Everything else is a terminal.
pub fn classify(token: &str) -> SymbolKind {
    match token {
        EPSILON => SymbolKind::Epsilon,
        END_MARK => SymbolKind::EndMarker,
        _ if looks_like_non_terminal(token) => SymbolKind::NonTerminal,
        _ => SymbolKind::Terminal,
    }
}

fn looks_like_non_terminal(token: &str) -> bool {
    let all_upper =
        token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase);
    let capitalized = token.chars().count() > 1
        && token.chars().next().map_or(false, char::is_uppercase);
    all_upper || capitalized
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub index: usize,
    pub name: String,
    pub kind: SymbolKind,
}

/// A production `left -> right`. `right` is never empty; the empty
/// production is stored as `[EPSILON_INDEX]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Creation order, starting at 0.
    pub index: usize,
    pub left: usize,
    pub right: Vec<usize>,
}

impl Rule {
    pub fn is_epsilon(&self) -> bool {
        self.right == [EPSILON_INDEX]
    }

    pub fn name(&self) -> String {
        format!("rule{}", self.index + 1)
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) symbol_table: HashMap<String, usize>,
    pub(crate) start_symbol: Option<usize>,
    /// Non-terminals in first-seen order, start symbol excluded.
    pub(crate) non_terminals: Vec<usize>,
    pub(crate) terminals: Vec<usize>,
    pub(crate) rules: Vec<Rule>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        let mut g = Self {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            start_symbol: None,
            non_terminals: Vec::new(),
            terminals: Vec::new(),
            rules: Vec::new(),
        };

        g.add_symbol(EPSILON, SymbolKind::Epsilon);
        g.add_symbol(END_MARK, SymbolKind::EndMarker);

        g
    }

    pub(crate) fn add_symbol(&mut self, name: &str, kind: SymbolKind) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol {
            index: idx,
            name: name.to_string(),
            kind,
        });
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    /// Returns the index of `name`, registering it with `kind` on first
    /// sight. Newly seen terminals and non-terminals (other than the start
    /// symbol) are appended to their ordered sequences.
    pub(crate) fn intern(&mut self, name: &str, kind: SymbolKind) -> usize {
        if let Some(idx) = self.get_symbol_index(name) {
            return idx;
        }
        let idx = self.add_symbol(name, kind);
        match kind {
            SymbolKind::Terminal => self.terminals.push(idx),
            SymbolKind::NonTerminal if Some(idx) != self.start_symbol => {
                self.non_terminals.push(idx)
            }
            _ => {}
        }
        idx
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn start_symbol(&self) -> Option<usize> {
        self.start_symbol
    }

    /// Non-terminals other than the start symbol, in first-seen order.
    pub fn non_terminals(&self) -> &[usize] {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &[usize] {
        &self.terminals
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The start symbol followed by every other non-terminal.
    pub fn non_terminal_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.start_symbol
            .into_iter()
            .chain(self.non_terminals.iter().cloned())
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().map(|&idx| self.get_symbol_name(idx))
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        self.symbols[index].name.as_str()
    }

    pub fn kind(&self, index: usize) -> SymbolKind {
        self.symbols[index].kind
    }

    pub fn is_non_terminal(&self, index: usize) -> bool {
        self.kind(index) == SymbolKind::NonTerminal
    }

    /// Non-terminals that are used on a right side but never defined.
    pub fn undefined_non_terminals(&self) -> Vec<usize> {
        let defined: HashSet<usize> = self.rules.iter().map(|rule| rule.left).collect();
        self.non_terminal_iter()
            .filter(|idx| !defined.contains(idx))
            .collect()
    }

    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        production
            .iter()
            .map(|&idx| self.get_symbol_name(idx))
            .collect()
    }

    /// `A -> X Y`, or `A -> ε` for the empty production.
    pub fn rule_to_string(&self, rule: &Rule) -> String {
        format!(
            "{} -> {}",
            self.get_symbol_name(rule.left),
            self.production_to_vec_str(&rule.right).join(" ")
        )
    }
}
