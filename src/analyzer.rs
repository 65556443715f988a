use log::warn;

use crate::{
    error::SkippedLine,
    grammar::{
        derivation_tree::DerivationTree,
        error_recovery_table::ErrorRecoveryTable,
        first_follow::{FirstSets, FollowSets},
        ll1_parse::ParseTrace,
        ll1_parsing_table::LL1ParsingTable,
        pretty_print::{ConflictOutput, GrammarInfo, TableOutput},
    },
    Grammar,
};

/// A grammar together with everything derived from it.
///
/// Each stage is computed once from the previous one and never changes
/// afterwards, so an `Analyzer` can be shared freely between readers.
#[derive(Debug, Clone)]
pub struct Analyzer {
    grammar: Grammar,
    skipped_lines: Vec<SkippedLine>,
    first: FirstSets,
    follow: FollowSets,
    table: LL1ParsingTable,
    recovery: ErrorRecoveryTable,
}

impl Analyzer {
    pub fn load(grammar: &str) -> Self {
        let (grammar, skipped_lines) = Grammar::parse(grammar);
        Self::with_skipped_lines(grammar, skipped_lines)
    }

    pub fn new(grammar: Grammar) -> Self {
        Self::with_skipped_lines(grammar, Vec::new())
    }

    fn with_skipped_lines(grammar: Grammar, skipped_lines: Vec<SkippedLine>) -> Self {
        for nt in grammar.undefined_non_terminals() {
            warn!("{} is used but has no rule", grammar.get_symbol_name(nt));
        }
        let first = FirstSets::compute(&grammar);
        let follow = FollowSets::compute(&grammar, &first);
        let table = LL1ParsingTable::build(&grammar, &first, &follow);
        let recovery = ErrorRecoveryTable::build(&grammar, &first, &follow);
        Self {
            grammar,
            skipped_lines,
            first,
            follow,
            table,
            recovery,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Lines of the grammar text that were not read as rules.
    pub fn skipped_lines(&self) -> &[SkippedLine] {
        &self.skipped_lines
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first
    }

    pub fn follow_sets(&self) -> &FollowSets {
        &self.follow
    }

    pub fn parsing_table(&self) -> &LL1ParsingTable {
        &self.table
    }

    pub fn error_recovery_table(&self) -> &ErrorRecoveryTable {
        &self.recovery
    }

    pub fn grammar_info(&self) -> GrammarInfo {
        GrammarInfo::new(&self.grammar, &self.first, &self.follow)
    }

    pub fn parsing_table_output(&self) -> TableOutput {
        self.table.to_output(&self.grammar)
    }

    pub fn error_recovery_table_output(&self) -> TableOutput {
        self.recovery.to_output(&self.grammar)
    }

    pub fn conflicts(&self) -> Vec<ConflictOutput> {
        self.table
            .conflicts()
            .iter()
            .map(|c| ConflictOutput::new(&self.grammar, c))
            .collect()
    }

    pub fn is_ll1(&self) -> bool {
        self.table.is_ll1()
    }

    /// Parses space-separated tokens against the LL(1) table.
    pub fn analyze_string(&self, input: &str) -> ParseTrace {
        self.table.parse(&self.grammar, input)
    }

    pub fn analyze_string_with_limit(&self, input: &str, max_steps: Option<usize>) -> ParseTrace {
        self.table.parse_with_limit(&self.grammar, input, max_steps)
    }

    pub fn derivation_tree(&self, trace: &ParseTrace) -> Option<DerivationTree> {
        DerivationTree::from_trace(&self.grammar, trace)
    }
}
