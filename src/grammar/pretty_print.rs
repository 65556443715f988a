use std::collections::BTreeSet;

use serde::Serialize;

use super::{
    error_recovery_table::ErrorRecoveryTable,
    first_follow::{FirstSets, FollowSets},
    grammar::{Rule, END_MARK_INDEX, EPSILON_INDEX},
    ll1_parse::{ParseAction, ParseStatus, ParseTrace, Rejection},
    ll1_parsing_table::{Conflict, LL1ParsingTable},
    Grammar,
};

fn align_columns(output: &[Vec<String>]) -> String {
    let width: Vec<usize> = (0..output.first().map_or(0, |row| row.len()))
        .map(|j| {
            output
                .iter()
                .map(|row| row[j].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A table as strings: a header of terminals followed by `$`, and one row
/// per non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOutput {
    pub header: Vec<String>,
    pub rows: Vec<(String, Vec<String>)>,
}

impl TableOutput {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.header.iter().cloned());
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.clone()];
            line.extend(row.iter().cloned());
            output.push(line);
        }
        align_columns(&output)
    }
}

impl Grammar {
    /// `A→X Y`, the cell form used by the parsing table. Right-side symbols
    /// are space-separated so multi-character names stay readable.
    fn rule_to_cell(&self, rule: &Rule) -> String {
        format!(
            "{}→{}",
            self.get_symbol_name(rule.left),
            self.production_to_vec_str(&rule.right).join(" ")
        )
    }

    fn names(&self, symbols: &[usize]) -> Vec<String> {
        symbols
            .iter()
            .map(|&idx| self.get_symbol_name(idx).to_string())
            .collect()
    }

    /// Terminals in first-seen order, then `$`, then `ε`.
    fn set_names(&self, set: &BTreeSet<usize>) -> Vec<String> {
        let markers = [END_MARK_INDEX, EPSILON_INDEX];
        let ordered: Vec<usize> = set
            .iter()
            .cloned()
            .filter(|s| !markers.contains(s))
            .chain(markers.into_iter().filter(|s| set.contains(s)))
            .collect();
        self.names(&ordered)
    }
}

impl LL1ParsingTable {
    pub fn to_output(&self, g: &Grammar) -> TableOutput {
        let rows = self
            .non_terminals
            .iter()
            .map(|&nt| {
                let cells = self
                    .terminals
                    .iter()
                    .map(|&t| match self.get(nt, t) {
                        [] => "-".to_string(),
                        rules => rules
                            .iter()
                            .map(|&r| g.rule_to_cell(&g.rules()[r]))
                            .collect::<Vec<_>>()
                            .join(" / "),
                    })
                    .collect();
                (g.get_symbol_name(nt).to_string(), cells)
            })
            .collect();

        TableOutput {
            header: g.names(&self.terminals),
            rows,
        }
    }
}

impl ErrorRecoveryTable {
    pub fn to_output(&self, g: &Grammar) -> TableOutput {
        let rows = self
            .non_terminals
            .iter()
            .map(|&nt| {
                let cells = self
                    .row(nt)
                    .unwrap_or_default()
                    .iter()
                    .map(|action| action.to_string())
                    .collect();
                (g.get_symbol_name(nt).to_string(), cells)
            })
            .collect();

        TableOutput {
            header: g.names(&self.terminals),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutput {
    pub name: String,
    pub left: String,
    pub right: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolSetOutput {
    pub symbol: String,
    pub set: Vec<String>,
}

/// Read-only snapshot of a grammar and its FIRST/FOLLOW sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarInfo {
    /// Non-terminals other than the start symbol.
    pub variables: Vec<String>,
    pub terminals: Vec<String>,
    pub start: Option<String>,
    pub rules: Vec<RuleOutput>,
    /// Non-terminals (start first) followed by terminals.
    pub first_sets: Vec<SymbolSetOutput>,
    pub follow_sets: Vec<SymbolSetOutput>,
    /// Non-terminals without any rule.
    pub undefined: Vec<String>,
}

impl GrammarInfo {
    pub fn new(g: &Grammar, first: &FirstSets, follow: &FollowSets) -> Self {
        let set_output = |symbol: usize, set: &BTreeSet<usize>| SymbolSetOutput {
            symbol: g.get_symbol_name(symbol).to_string(),
            set: g.set_names(set),
        };

        GrammarInfo {
            variables: g.names(g.non_terminals()),
            terminals: g.names(g.terminals()),
            start: g.start_symbol().map(|s| g.get_symbol_name(s).to_string()),
            rules: g
                .rules()
                .iter()
                .map(|rule| RuleOutput {
                    name: rule.name(),
                    left: g.get_symbol_name(rule.left).to_string(),
                    right: g.names(&rule.right),
                })
                .collect(),
            first_sets: g
                .non_terminal_iter()
                .chain(g.terminals().iter().cloned())
                .map(|s| set_output(s, first.get(s)))
                .collect(),
            follow_sets: g
                .non_terminal_iter()
                .map(|s| set_output(s, follow.get(s)))
                .collect(),
            undefined: g.names(&g.undefined_non_terminals()),
        }
    }

    pub fn to_plaintext(&self) -> String {
        let mut output = vec![
            format!("Variables: {}", self.variables.join(", ")),
            format!("Terminals: {}", self.terminals.join(", ")),
            format!("Start Symbol: {}", self.start.as_deref().unwrap_or("-")),
            String::new(),
            "Rules:".to_string(),
        ];
        for rule in &self.rules {
            output.push(format!("{}: {} -> {}", rule.name, rule.left, rule.right.join(" ")));
        }

        let sets = [("FIRST", &self.first_sets), ("FOLLOW", &self.follow_sets)];
        for (title, sets) in sets {
            output.push(String::new());
            output.push(format!("{} Sets:", title));
            for s in sets.iter() {
                output.push(format!("{}: {}", s.symbol, s.set.join(", ")));
            }
        }
        if !self.undefined.is_empty() {
            output.push(String::new());
            output.push(format!("Undefined: {}", self.undefined.join(", ")));
        }
        output.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStepOutput {
    pub stack: String,
    pub input: String,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceOutput {
    pub accepted: bool,
    pub status: String,
    pub steps: Vec<TraceStepOutput>,
}

impl ParseTrace {
    pub fn to_output(&self, g: &Grammar) -> TraceOutput {
        let steps = self
            .steps
            .iter()
            .map(|step| TraceStepOutput {
                stack: g.production_to_vec_str(&step.stack).join(" "),
                input: self.remaining_input(step).join(" "),
                rule: match step.action {
                    ParseAction::Expand(rule) => g.rule_to_string(&g.rules()[rule]),
                    ParseAction::Match(t) => format!("match {}", g.get_symbol_name(t)),
                },
            })
            .collect();

        let status = match &self.status {
            ParseStatus::Accepted => "accepted".to_string(),
            ParseStatus::Rejected(Rejection::NoTableEntry {
                non_terminal,
                token,
            }) => format!(
                "no rule for {} on '{}'",
                g.get_symbol_name(*non_terminal),
                token
            ),
            ParseStatus::Rejected(Rejection::Mismatch { expected, token }) => format!(
                "expected '{}' but found '{}'",
                g.get_symbol_name(*expected),
                token
            ),
            ParseStatus::Rejected(Rejection::UnexpectedSymbol(symbol)) => {
                format!("unexpected '{}' on the stack", g.get_symbol_name(*symbol))
            }
            ParseStatus::StepLimitExceeded(limit) => format!("gave up after {} steps", limit),
        };

        TraceOutput {
            accepted: self.accepted(),
            status,
            steps,
        }
    }
}

impl TraceOutput {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> =
            vec![vec!["Stack".to_string(), "Input".to_string(), "Rule".to_string()]];
        output.extend(
            self.steps
                .iter()
                .map(|s| vec![s.stack.clone(), s.input.clone(), s.rule.clone()]),
        );
        format!(
            "{}\n\n{} ({})",
            align_columns(&output),
            if self.accepted { "Accepted" } else { "Rejected" },
            self.status
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictOutput {
    pub non_terminal: String,
    pub terminal: String,
    pub rules: Vec<String>,
}

impl ConflictOutput {
    pub fn new(g: &Grammar, conflict: &Conflict) -> Self {
        Self {
            non_terminal: g.get_symbol_name(conflict.non_terminal).to_string(),
            terminal: g.get_symbol_name(conflict.terminal).to_string(),
            rules: conflict
                .rules
                .iter()
                .map(|&r| g.rule_to_string(&g.rules()[r]))
                .collect(),
        }
    }

    pub fn to_plaintext(&self) -> String {
        format!(
            "Conflict in {} for terminal {}: {}",
            self.non_terminal,
            self.terminal,
            self.rules.join(" / ")
        )
    }
}

pub fn conflicts_to_plaintext(conflicts: &[ConflictOutput]) -> String {
    if conflicts.is_empty() {
        return "Grammar is LL(1)".to_string();
    }
    std::iter::once("Grammar is not LL(1):".to_string())
        .chain(conflicts.iter().map(|c| format!("- {}", c.to_plaintext())))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grammar::EPSILON, Analyzer};

    const EXPR: &str = "E -> T E'\nE' -> + T E' | ε\nT -> id";

    #[test]
    fn parsing_table_output() {
        let analyzer = Analyzer::load(EXPR);
        let table = analyzer.parsing_table_output();

        assert_eq!(table.header, vec!["+", "id", "$"]);
        assert_eq!(
            table.rows,
            vec![
                ("E".to_string(), vec!["-".into(), "E→T E'".into(), "-".into()]),
                ("T".to_string(), vec!["-".into(), "T→id".into(), "-".into()]),
                (
                    "E'".to_string(),
                    vec!["E'→+ T E'".into(), "-".into(), format!("E'→{}", EPSILON)]
                ),
            ]
        );
    }

    #[test]
    fn conflicting_cell_is_joined() {
        let analyzer = Analyzer::load("S -> a | a b");
        let table = analyzer.parsing_table_output();
        assert_eq!(table.rows[0].1[0], "S→a / S→a b");
    }

    #[test]
    fn table_plaintext() {
        let analyzer = Analyzer::load("S -> a");
        assert_eq!(
            analyzer.parsing_table_output().to_plaintext(),
            "  |   a | $\nS | S→a | -"
        );
    }

    #[test]
    fn grammar_info_plaintext() {
        let analyzer = Analyzer::load(EXPR);
        let text = analyzer.grammar_info().to_plaintext();
        assert!(text.starts_with("Variables: T, E'\nTerminals: +, id\nStart Symbol: E\n"));
        assert!(text.contains("rule3: E' -> ε"));
        assert!(text.contains("FIRST Sets:\nE: id\nT: id\nE': +, ε"));
        assert!(text.contains("FOLLOW Sets:\nE: $\nT: +, $\nE': $"));
        assert!(!text.contains("Undefined"));

        let text = Analyzer::load("S -> A b").grammar_info().to_plaintext();
        assert!(text.ends_with("\n\nUndefined: A"));
    }

    #[test]
    fn trace_plaintext() {
        let analyzer = Analyzer::load("S -> a");
        let text = analyzer.analyze_string("a").to_output(analyzer.grammar()).to_plaintext();
        assert_eq!(
            text,
            concat!(
                "Stack | Input |    Rule\n",
                "  $ S |   a $ |  S -> a\n",
                "  $ a |   a $ | match a\n",
                "\n",
                "Accepted (accepted)",
            )
        );
    }

    #[test]
    fn conflicts_plaintext() {
        let analyzer = Analyzer::load("S -> a | a b");
        assert_eq!(
            conflicts_to_plaintext(&analyzer.conflicts()),
            "Grammar is not LL(1):\n- Conflict in S for terminal a: S -> a / S -> a b"
        );
        assert_eq!(
            conflicts_to_plaintext(&Analyzer::load("S -> a").conflicts()),
            "Grammar is LL(1)"
        );
    }
}
