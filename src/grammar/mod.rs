pub mod derivation_tree;
pub mod error_recovery_table;
pub mod first_follow;
pub mod grammar;
pub mod ll1_parse;
pub mod ll1_parsing_table;
pub mod parse;
pub mod pretty_print;
pub use grammar::Grammar;

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
