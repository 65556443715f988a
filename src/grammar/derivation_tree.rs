use serde::Serialize;

use super::{
    ll1_parse::{ParseAction, ParseTrace},
    Grammar,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub symbol: String,
    /// Indices into [`DerivationTree::nodes`], left to right.
    pub children: Vec<usize>,
}

/// Leftmost derivation of an accepted input. Node 0 is the start symbol;
/// an `ε` expansion gets a single `ε` leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivationTree {
    pub nodes: Vec<Node>,
}

impl DerivationTree {
    /// Replays the trace with a stack of node indices that mirrors the
    /// parse stack. Returns `None` for a rejected trace or a grammar
    /// without a start symbol.
    pub fn from_trace(g: &Grammar, trace: &ParseTrace) -> Option<Self> {
        if !trace.accepted() {
            return None;
        }
        let start = g.start_symbol()?;

        let mut tree = Self {
            nodes: vec![Node {
                symbol: g.get_symbol_name(start).to_string(),
                children: Vec::new(),
            }],
        };
        let mut pending: Vec<usize> = vec![0];

        for step in &trace.steps {
            let node = pending.pop()?;
            match step.action {
                ParseAction::Expand(rule) => {
                    let rule = &g.rules()[rule];
                    let children: Vec<usize> = rule
                        .right
                        .iter()
                        .map(|&symbol| tree.push(g.get_symbol_name(symbol)))
                        .collect();
                    if !rule.is_epsilon() {
                        pending.extend(children.iter().rev());
                    }
                    tree.nodes[node].children = children;
                }
                ParseAction::Match(_) => {}
            }
        }

        Some(tree)
    }

    fn push(&mut self, symbol: &str) -> usize {
        self.nodes.push(Node {
            symbol: symbol.to_string(),
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Leaf symbols left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.children.is_empty() {
                leaves.push(node.symbol.as_str());
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }
}
