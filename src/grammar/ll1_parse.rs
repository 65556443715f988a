use log::trace;

use super::{
    grammar::{SymbolKind, END_MARK_INDEX},
    ll1_parsing_table::LL1ParsingTable,
    Grammar, END_MARK, EPSILON,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAction {
    /// Expand the non-terminal on top of the stack with this rule.
    Expand(usize),
    /// Pop this terminal and advance the input.
    Match(usize),
}

/// One step of the trace, recorded before the stack or input change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStep {
    /// Bottom first, so the last element is the top.
    pub stack: Vec<usize>,
    /// Position of the current token in [`ParseTrace::tokens`].
    pub position: usize,
    pub action: ParseAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The table has no rule for the non-terminal on top and the token.
    NoTableEntry { non_terminal: usize, token: String },
    /// The terminal on top differs from the token.
    Mismatch { expected: usize, token: String },
    /// The stack top is neither a terminal nor a non-terminal.
    UnexpectedSymbol(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    Accepted,
    Rejected(Rejection),
    /// The caller's step cap was reached before the parse finished.
    StepLimitExceeded(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTrace {
    /// Input tokens with the trailing `$`.
    pub tokens: Vec<String>,
    pub steps: Vec<ParseStep>,
    pub status: ParseStatus,
}

impl ParseTrace {
    pub fn accepted(&self) -> bool {
        self.status == ParseStatus::Accepted
    }

    pub fn remaining_input(&self, step: &ParseStep) -> &[String] {
        &self.tokens[step.position..]
    }
}

/// Splits `input` on whitespace, drops `ε` tokens and appends `$`.
pub fn tokenize(input: &str) -> Vec<String> {
    input
        .split_whitespace()
        .filter(|&t| t != EPSILON)
        .map(str::to_string)
        .chain(std::iter::once(END_MARK.to_string()))
        .collect()
}

impl LL1ParsingTable {
    pub fn parse(&self, g: &Grammar, input: &str) -> ParseTrace {
        self.parse_with_limit(g, input, None)
    }

    /// Runs the predictive parser over `input`. With `max_steps`, the parse
    /// gives up when it would record more than that many steps; without it a
    /// left-recursive grammar may never finish.
    pub fn parse_with_limit(
        &self,
        g: &Grammar,
        input: &str,
        max_steps: Option<usize>,
    ) -> ParseTrace {
        let tokens = tokenize(input);
        let mut stack: Vec<usize> = std::iter::once(END_MARK_INDEX)
            .chain(g.start_symbol())
            .collect();
        let mut position = 0;
        let mut steps: Vec<ParseStep> = Vec::new();

        let status = loop {
            // The stack always holds `$` and the input always ends with `$`
            // until both are consumed together.
            let (top, current) = match (stack.last(), tokens.get(position)) {
                (Some(&top), Some(current)) => (top, current.as_str()),
                _ => break ParseStatus::Rejected(Rejection::UnexpectedSymbol(END_MARK_INDEX)),
            };

            if top == END_MARK_INDEX && current == END_MARK {
                break ParseStatus::Accepted;
            }

            let action = match g.kind(top) {
                SymbolKind::NonTerminal => {
                    let rules = match g.get_symbol_index(current) {
                        Some(t) => self.get(top, t),
                        None => &[],
                    };
                    match rules.first() {
                        Some(&rule) => ParseAction::Expand(rule),
                        None => {
                            break ParseStatus::Rejected(Rejection::NoTableEntry {
                                non_terminal: top,
                                token: current.to_string(),
                            })
                        }
                    }
                }
                SymbolKind::Terminal | SymbolKind::EndMarker => {
                    if g.get_symbol_name(top) == current {
                        ParseAction::Match(top)
                    } else {
                        break ParseStatus::Rejected(Rejection::Mismatch {
                            expected: top,
                            token: current.to_string(),
                        });
                    }
                }
                SymbolKind::Epsilon => {
                    break ParseStatus::Rejected(Rejection::UnexpectedSymbol(top));
                }
            };

            if let Some(limit) = max_steps {
                if steps.len() >= limit {
                    break ParseStatus::StepLimitExceeded(limit);
                }
            }

            let step = ParseStep {
                stack: stack.clone(),
                position,
                action,
            };
            trace!(
                "stack [{}] input [{}] {:?}",
                g.production_to_vec_str(&step.stack).join(" "),
                tokens[position..].join(" "),
                step.action
            );

            stack.pop();
            match step.action {
                ParseAction::Expand(rule) => {
                    let rule = &g.rules()[rule];
                    if !rule.is_epsilon() {
                        stack.extend(rule.right.iter().rev());
                    }
                }
                ParseAction::Match(_) => position += 1,
            }
            steps.push(step);
        };

        ParseTrace {
            tokens,
            steps,
            status,
        }
    }
}
